//! # KenetHon
//!
//! The location-to-address pipeline behind the KenetHon map app.
//!
//! A [`location`] provider publishes raw authorization and location updates from a
//! platform backend, and a [`presenter`] turns them into a single UI state: the
//! current authorization status plus a reverse-geocoded address string.
//!
//! ## Features
//!
//! - `permission`: the authorization status vocabulary.
//! - `location`: the location provider and its platform backend seam.
//! - `geocode`: reverse geocoding and address formatting.
//! - `presenter`: the view-model deriving UI state (enabled by default).
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! kenethon = { version = "0.1", features = ["full"] }
//! ```
//!
//! ```rust,ignore
//! use kenethon::presenter::LocationPresenter;
//!
//! let presenter = LocationPresenter::new(provider, geocoder);
//! let pipeline = presenter.clone().run();
//! // drive `pipeline` on the UI executor, render `presenter.subscribe()`
//! ```

#[cfg(feature = "geocode")]
pub use kenethon_geocode as geocode;

#[cfg(feature = "location")]
pub use kenethon_location as location;

#[cfg(feature = "permission")]
pub use kenethon_permission as permission;

#[cfg(feature = "presenter")]
pub use kenethon_presenter as presenter;
