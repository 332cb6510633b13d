//! Observable device location.
//!
//! A [`LocationProvider`] owns a platform [`LocationBackend`] and republishes
//! what it reports on two independent channels: the authorization status and
//! the most recent location fix. Both channels replay their current value to
//! new subscribers and forward every backend report, duplicates included.

#![warn(missing_docs)]

mod provider;
mod subject;

/// Platform-specific implementations.
pub mod sys;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use kenethon_permission::AuthorizationStatus;
pub use provider::LocationProvider;
pub use subject::Subject;

/// Mean earth radius in meters (IUGG).
const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A geographic location with coordinates and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Altitude in meters above sea level, if available.
    pub altitude: Option<f64>,
    /// Horizontal accuracy in meters, if available.
    pub horizontal_accuracy: Option<f64>,
    /// Timestamp as Unix epoch milliseconds.
    pub timestamp: u64,
}

impl Location {
    /// Creates a location without altitude or accuracy information.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, timestamp: u64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            horizontal_accuracy: None,
            timestamp,
        }
    }

    /// Whether both coordinates are finite and within their degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters.
    ///
    /// Only meaningful for [valid](Self::is_valid) locations; the result is
    /// NaN when either coordinate pair is NaN.
    ///
    /// Uses the special case of the Vincenty formula for a sphere, which stays
    /// accurate for both tiny and antipodal separations.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (lat1, lng1) = (self.latitude.to_radians(), self.longitude.to_radians());
        let (lat2, lng2) = (other.latitude.to_radians(), other.longitude.to_radians());

        let (lat1_sin, lat1_cos) = lat1.sin_cos();
        let (lat2_sin, lat2_cos) = lat2.sin_cos();
        let (dlng_sin, dlng_cos) = (lng1 - lng2).abs().sin_cos();

        let nom1 = lat2_cos * dlng_sin;
        let nom2 = lat1_cos.mul_add(lat2_sin, -(lat1_sin * lat2_cos * dlng_cos));
        let nom = nom1.hypot(nom2);
        let denom = lat1_sin.mul_add(lat2_sin, lat1_cos * lat2_cos * dlng_cos);

        MEAN_EARTH_RADIUS_METERS * nom.atan2(denom)
    }
}

/// Errors that can occur inside a location backend.
///
/// These never reach the provider's subscribers; backends log them and simply
/// stop emitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// Location permission was not granted.
    #[error("location permission denied")]
    PermissionDenied,
    /// Location services are disabled on the device.
    #[error("location services disabled")]
    ServiceDisabled,
    /// Location is not available.
    #[error("location not available")]
    NotAvailable,
    /// Updates were started before a delegate was registered.
    #[error("no location delegate registered")]
    DelegateMissing,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Result alias used by location backends.
pub type LocationResult<T> = Result<T, LocationError>;

/// Events a backend reports to its delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationEvent {
    /// The platform authorization changed, or was re-reported unchanged.
    AuthorizationChanged {
        /// The new status.
        status: AuthorizationStatus,
    },
    /// One or more fixes arrived, oldest first.
    LocationsUpdated {
        /// The delivered fixes.
        locations: Vec<Location>,
    },
}

/// Receiver of backend events. Callbacks may arrive on any thread.
pub trait LocationDelegate: Send + Sync {
    /// Handles one backend event.
    fn on_event(&self, event: LocationEvent);
}

/// The platform location and permission API.
///
/// Implementations wrap one platform manager instance; they are injected into
/// [`LocationProvider`] so tests can substitute a fake.
pub trait LocationBackend: Send + Sync + fmt::Debug {
    /// The authorization status as currently known to the platform.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompts for location permission when it is still undetermined.
    ///
    /// The answer is reported through [`LocationEvent::AuthorizationChanged`].
    fn request_authorization(&self);

    /// Starts delivering fixes to the delegate.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot start updates.
    fn start_updating_location(&self) -> LocationResult<()>;

    /// Stops delivering fixes.
    fn stop_updating_location(&self);

    /// Registers the delegate receiving all events.
    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>);
}
