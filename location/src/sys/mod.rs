//! Platform location backends.
//!
//! Only Linux ships a backend in this crate. Mobile hosts bridge their
//! platform manager into a [`LocationBackend`](crate::LocationBackend) and
//! inject it into the provider.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::GeoClueBackend;
