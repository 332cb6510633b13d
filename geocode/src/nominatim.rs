//! OpenStreetMap Nominatim reverse geocoding.

use std::time::Duration;

use futures::channel::oneshot;
use futures::future::BoxFuture;
use log::debug;
use serde::Deserialize;

use crate::{GeocodeError, Geocoder, Location, Placemark};

/// Settings for [`NominatimGeocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance.
    pub endpoint: String,
    /// `User-Agent` header; the public instance rejects anonymous clients.
    pub user_agent: String,
    /// Preferred response language, e.g. `"de"`.
    pub language: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_owned(),
            user_agent: "KenetHon/0.1 (location-address)".to_owned(),
            language: None,
            timeout_secs: 10,
        }
    }
}

/// Reverse geocoder backed by a Nominatim instance.
///
/// Requests are blocking `ureq` calls made on a helper thread, so the
/// returned futures do not depend on any particular async runtime.
#[derive(Debug, Clone, Default)]
pub struct NominatimGeocoder {
    config: NominatimConfig,
}

impl NominatimGeocoder {
    /// Creates a geocoder with the given settings.
    #[must_use]
    pub const fn new(config: NominatimConfig) -> Self {
        Self { config }
    }

    fn reverse_url(&self, location: &Location) -> String {
        let mut url = format!(
            "{}/reverse?format=jsonv2&addressdetails=1&lat={}&lon={}",
            self.config.endpoint.trim_end_matches('/'),
            location.latitude,
            location.longitude,
        );
        if let Some(language) = &self.config.language {
            url.push_str("&accept-language=");
            url.push_str(&urlencode(language));
        }
        url
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse_geocode<'a>(
        &'a self,
        location: &'a Location,
    ) -> BoxFuture<'a, Result<Vec<Placemark>, GeocodeError>> {
        let url = self.reverse_url(location);
        let user_agent = self.config.user_agent.clone();
        let timeout = Duration::from_secs(self.config.timeout_secs);

        Box::pin(async move {
            let (sender, receiver) = oneshot::channel();
            std::thread::Builder::new()
                .name("nominatim".into())
                .spawn(move || {
                    let _ = sender.send(fetch(&url, &user_agent, timeout));
                })
                .map_err(|e| GeocodeError::Network(e.to_string()))?;

            receiver.await.map_err(|_| GeocodeError::Canceled)?
        })
    }
}

fn fetch(url: &str, user_agent: &str, timeout: Duration) -> Result<Vec<Placemark>, GeocodeError> {
    debug!("nominatim reverse lookup: {url}");
    let response: ReverseResponse = ureq::get(url)
        .set("User-Agent", user_agent)
        .timeout(timeout)
        .call()
        .map_err(|e| GeocodeError::Network(e.to_string()))?
        .into_json()
        .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    Ok(response.into_placemarks())
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    name: Option<String>,
    address: Option<ReverseAddress>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl ReverseResponse {
    fn into_placemarks(self) -> Vec<Placemark> {
        // Nominatim answers 200 with an error field when nothing is nearby
        if let Some(error) = self.error {
            debug!("nominatim found no placemark: {error}");
            return Vec::new();
        }

        let address = self.address.unwrap_or_default();
        vec![Placemark {
            name: self.name,
            street: address.road,
            city: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.hamlet),
            region: address.state,
            postal_code: address.postcode,
            country: address.country,
        }]
    }
}

fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            _ if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') => c.to_string(),
            _ => {
                let mut buf = [0; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{b:02X}"))
                    .collect()
            }
        })
        .collect()
}
