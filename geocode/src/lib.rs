//! Reverse geocoding.
//!
//! A [`Geocoder`] resolves a [`Location`] into zero or more [`Placemark`]s;
//! [`Placemark::formatted_address`] turns the first one into the single line
//! shown under the map.

#![warn(missing_docs)]

mod nominatim;

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use kenethon_location::Location;
pub use nominatim::{NominatimConfig, NominatimGeocoder};

/// Separator between address components.
pub const ADDRESS_SEPARATOR: &str = ", ";

/// A geocoding record. Every component is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placemark {
    /// Name of the place, e.g. a building or point of interest.
    pub name: Option<String>,
    /// Street name.
    pub street: Option<String>,
    /// City or locality.
    pub city: Option<String>,
    /// State, province or other administrative area.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl Placemark {
    /// Joins the present components in display order.
    ///
    /// Components that are absent or blank are skipped. Returns `None` rather
    /// than an empty string when nothing is left.
    #[must_use]
    pub fn formatted_address(&self) -> Option<String> {
        let components: Vec<&str> = [
            &self.name,
            &self.street,
            &self.city,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .filter(|component| !component.trim().is_empty())
        .collect();

        if components.is_empty() {
            None
        } else {
            Some(components.join(ADDRESS_SEPARATOR))
        }
    }
}

/// Errors that can occur while resolving an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The geocoding service could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with something that is not a placemark.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The lookup was dropped before it completed.
    #[error("geocoding lookup canceled")]
    Canceled,
}

/// The platform geocoding API.
pub trait Geocoder: Send + Sync + fmt::Debug {
    /// Resolves `location` into placemarks, best match first.
    fn reverse_geocode<'a>(
        &'a self,
        location: &'a Location,
    ) -> BoxFuture<'a, Result<Vec<Placemark>, GeocodeError>>;
}
