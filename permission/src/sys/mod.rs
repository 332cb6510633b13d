//! Platform-specific authorization lookups.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub(crate) use linux::{check, request};

// Other platforms report through their injected location backend
#[cfg(not(target_os = "linux"))]
pub(crate) const fn check() -> crate::AuthorizationStatus {
    crate::AuthorizationStatus::Undetermined
}

#[cfg(not(target_os = "linux"))]
pub(crate) const fn request() -> Result<crate::AuthorizationStatus, crate::PermissionError> {
    Err(crate::PermissionError::NotSupported)
}
