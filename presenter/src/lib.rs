//! Map view-model.
//!
//! [`LocationPresenter`] subscribes to a [`LocationProvider`]'s authorization
//! and location channels and derives the single [`UiState`] a renderer needs:
//!
//! - each distinct authorization status starts or stops location monitoring
//!   and is copied into the UI state;
//! - each location that moved at least the configured distance from the last
//!   accepted one is reverse geocoded, and the formatted address (or `None`
//!   on failure) becomes the UI state's address.
//!
//! The pipeline is a plain future returned by [`LocationPresenter::run`];
//! drive it on the executor that owns the UI.

#![warn(missing_docs)]

pub mod filter;
mod presenter;

use serde::{Deserialize, Serialize};

pub use kenethon_geocode::{Geocoder, Placemark};
pub use kenethon_location::{AuthorizationStatus, Location, LocationProvider};
pub use presenter::LocationPresenter;

/// Distance a fix must move before its address is looked up again.
pub const DEFAULT_DISTANCE_THRESHOLD_METERS: f64 = 50.0;

/// Presenter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Fixes closer than this to the last accepted fix are suppressed.
    pub distance_threshold_meters: f64,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            distance_threshold_meters: DEFAULT_DISTANCE_THRESHOLD_METERS,
        }
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// The last distinct authorization status.
    pub authorization_status: AuthorizationStatus,
    /// The formatted address of the last accepted fix; `None` while unresolved
    /// or after a failed lookup.
    pub address_info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{PresenterConfig, UiState};
    use crate::AuthorizationStatus;

    #[test]
    fn ui_state_starts_undetermined_without_address() {
        let state = UiState::default();
        assert_eq!(state.authorization_status, AuthorizationStatus::Undetermined);
        assert_eq!(state.address_info, None);
    }

    #[test]
    fn config_defaults_to_fifty_meters() {
        let config: PresenterConfig = serde_json::from_str("{}").unwrap();
        assert!((config.distance_threshold_meters - 50.0).abs() < f64::EPSILON);

        let config: PresenterConfig =
            serde_json::from_str(r#"{"distance_threshold_meters": 10.0}"#).unwrap();
        assert!((config.distance_threshold_meters - 10.0).abs() < f64::EPSILON);
    }
}
