//! Location authorization status.
//!
//! This crate defines the permission vocabulary shared by the location
//! provider and the presenter, and exposes the host platform's current
//! location authorization where the platform can answer synchronously.

#![warn(missing_docs)]

/// Platform-specific implementations.
pub mod sys;

use serde::{Deserialize, Serialize};

/// The platform-reported permission level for location access.
///
/// Transitions are driven by the user through the operating system; this
/// system only observes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// Permission has not been requested yet.
    #[default]
    Undetermined,
    /// Permission is restricted (e.g., parental controls).
    Restricted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission granted while the app is in use.
    AuthorizedLimited,
    /// Permission granted at all times.
    AuthorizedFull,
}

impl AuthorizationStatus {
    /// Whether location access is granted, either limited or full.
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedLimited | Self::AuthorizedFull)
    }

    /// Whether the user has already answered the permission prompt.
    #[must_use]
    pub const fn is_determined(self) -> bool {
        !matches!(self, Self::Undetermined)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Location permission is not supported on this platform.
    #[error("permission not supported on this platform")]
    NotSupported,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Check the current location authorization without prompting.
#[must_use]
pub fn check() -> AuthorizationStatus {
    sys::check()
}

/// Request location authorization from the user.
///
/// If the user has already answered, this returns the current status
/// without showing a prompt.
///
/// # Errors
/// Returns a `PermissionError` if the platform cannot prompt for location.
pub fn request() -> Result<AuthorizationStatus, PermissionError> {
    let status = sys::request()?;
    log::debug!("location authorization request answered: {status:?}");
    Ok(status)
}
