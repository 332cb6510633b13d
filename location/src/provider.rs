use std::fmt;
use std::sync::Arc;

use async_channel::Receiver;
use log::{debug, error, warn};

use crate::{
    AuthorizationStatus, Location, LocationBackend, LocationDelegate, LocationEvent, Subject,
};

struct SubjectDelegate {
    authorization: Subject<AuthorizationStatus>,
    location: Subject<Option<Location>>,
}

impl fmt::Debug for SubjectDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectDelegate").finish()
    }
}

impl LocationDelegate for SubjectDelegate {
    fn on_event(&self, event: LocationEvent) {
        match event {
            LocationEvent::AuthorizationChanged { status } => {
                debug!("location authorization reported: {status:?}");
                self.authorization.set(status);
            }
            LocationEvent::LocationsUpdated { locations } => {
                for location in locations {
                    if !location.is_valid() {
                        warn!("dropping invalid location fix {location:?}");
                        continue;
                    }
                    self.location.set(Some(location));
                }
            }
        }
    }
}

/// The sole owner of platform location and permission access.
///
/// Exposes the backend's reports as two independent current-value channels
/// and forwards monitoring commands to it. Cloning yields another handle to
/// the same backend and channels.
#[derive(Debug, Clone)]
pub struct LocationProvider {
    backend: Arc<dyn LocationBackend>,
    authorization: Subject<AuthorizationStatus>,
    location: Subject<Option<Location>>,
}

impl LocationProvider {
    /// Creates a provider and registers itself as the backend's delegate.
    pub fn new(backend: Arc<dyn LocationBackend>) -> Self {
        let authorization = Subject::new(backend.authorization_status());
        let location = Subject::new(None);

        backend.set_delegate(Arc::new(SubjectDelegate {
            authorization: authorization.clone(),
            location: location.clone(),
        }));

        Self {
            backend,
            authorization,
            location,
        }
    }

    /// Subscribes to authorization status updates.
    ///
    /// The current status is delivered first.
    #[must_use]
    pub fn authorization(&self) -> Receiver<AuthorizationStatus> {
        self.authorization.subscribe()
    }

    /// Subscribes to location updates.
    ///
    /// Yields `None` until the first fix arrives.
    #[must_use]
    pub fn location(&self) -> Receiver<Option<Location>> {
        self.location.subscribe()
    }

    /// The most recently reported authorization status.
    #[must_use]
    pub fn current_authorization(&self) -> AuthorizationStatus {
        self.authorization.get()
    }

    /// The most recently reported fix, if any.
    #[must_use]
    pub fn current_location(&self) -> Option<Location> {
        self.location.get()
    }

    /// Asks the platform for location permission.
    pub fn request_authorization(&self) {
        self.backend.request_authorization();
    }

    /// Starts location updates.
    pub fn start_monitoring_location(&self) {
        if let Err(err) = self.backend.start_updating_location() {
            error!("failed to start location updates: {err}");
        }
    }

    /// Stops location updates.
    pub fn stop_monitoring_location(&self) {
        self.backend.stop_updating_location();
    }

    /// Ends both channels for every subscriber.
    ///
    /// Values published before the call are still delivered. The backend is
    /// left untouched; stop monitoring first if updates should cease.
    pub fn shutdown(&self) {
        self.authorization.close();
        self.location.close();
    }
}
