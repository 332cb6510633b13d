//! Linux location authorization.
//!
//! GeoClue2 decides access when a client connects over D-Bus; there is no
//! runtime prompt an application can trigger. Sandboxed apps (Flatpak/Snap)
//! go through the location portal instead.

use crate::{AuthorizationStatus, PermissionError};

pub(crate) const fn check() -> AuthorizationStatus {
    AuthorizationStatus::AuthorizedFull
}

pub(crate) const fn request() -> Result<AuthorizationStatus, PermissionError> {
    Ok(AuthorizationStatus::AuthorizedFull)
}
