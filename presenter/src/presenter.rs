use std::sync::Arc;

use async_channel::{Receiver, Sender};
use kenethon_location::Subject;
use log::{debug, trace, warn};

use crate::filter::{RemoveDuplicates, locations_equivalent};
use crate::{
    AuthorizationStatus, Geocoder, Location, LocationProvider, Placemark, PresenterConfig, UiState,
};

/// A change produced by one of the upstream loops, applied in arrival order.
#[derive(Debug)]
enum StateUpdate {
    Authorization(AuthorizationStatus),
    Address(Option<String>),
}

/// View-model for the map screen.
///
/// Owns the [`UiState`]; only the pipeline returned by [`run`](Self::run)
/// writes it. Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct LocationPresenter {
    provider: LocationProvider,
    geocoder: Arc<dyn Geocoder>,
    config: PresenterConfig,
    state: Subject<UiState>,
}

impl LocationPresenter {
    /// Creates a presenter with the default configuration.
    pub fn new(provider: LocationProvider, geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_config(provider, geocoder, PresenterConfig::default())
    }

    /// Creates a presenter with an explicit configuration.
    pub fn with_config(
        provider: LocationProvider,
        geocoder: Arc<dyn Geocoder>,
        config: PresenterConfig,
    ) -> Self {
        Self {
            provider,
            geocoder,
            config,
            state: Subject::default(),
        }
    }

    /// A snapshot of the current UI state.
    #[must_use]
    pub fn state(&self) -> UiState {
        self.state.get()
    }

    /// Subscribes to UI state changes, starting with the current state.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<UiState> {
        self.state.subscribe()
    }

    /// Forwards the user's request to enable location services.
    pub fn request_location_authorization(&self) {
        self.provider.request_authorization();
    }

    /// Builds the pipeline binding the provider's channels to the UI state.
    ///
    /// Both channels are subscribed when this is called, so nothing published
    /// afterwards is missed even if the future is polled later. The future
    /// completes once the provider is shut down and every pending update has
    /// been applied.
    pub fn run(&self) -> impl Future<Output = ()> + Send + use<> {
        let statuses = self.provider.authorization();
        let locations = self.provider.location();
        let presenter = self.clone();

        async move {
            let (updates, queue) = async_channel::unbounded();
            futures::join!(
                presenter.drive_authorization(statuses, updates.clone()),
                presenter.drive_location(locations, updates),
                presenter.apply_updates(queue),
            );
            debug!("location pipeline finished");
        }
    }

    async fn drive_authorization(
        &self,
        statuses: Receiver<AuthorizationStatus>,
        updates: Sender<StateUpdate>,
    ) {
        let mut distinct =
            RemoveDuplicates::new(|a: &AuthorizationStatus, b: &AuthorizationStatus| a == b);
        let mut monitoring = false;

        while let Ok(status) = statuses.recv().await {
            if !distinct.admit(&status) {
                continue;
            }
            debug!("authorization changed to {status:?}");

            if status.is_authorized() {
                self.provider.start_monitoring_location();
                monitoring = true;
            } else if status.is_determined() || monitoring {
                // Undetermined only needs a stop when monitoring was started
                self.provider.stop_monitoring_location();
                monitoring = false;
            }

            if updates.send(StateUpdate::Authorization(status)).await.is_err() {
                break;
            }
        }
    }

    async fn drive_location(
        &self,
        locations: Receiver<Option<Location>>,
        updates: Sender<StateUpdate>,
    ) {
        let threshold = self.config.distance_threshold_meters;
        let mut distinct = RemoveDuplicates::new(|a: &Option<Location>, b: &Option<Location>| {
            locations_equivalent(a.as_ref(), b.as_ref(), threshold)
        });

        while let Ok(location) = locations.recv().await {
            if !distinct.admit(&location) {
                trace!("location within {threshold} m of the last accepted fix");
                continue;
            }

            let address = match &location {
                Some(_) if !self.provider.current_authorization().is_authorized() => {
                    debug!("skipping address lookup without location authorization");
                    // Never looked up, so the next fix must not be measured against it
                    distinct.reset();
                    None
                }
                // Suspends this loop only; authorization keeps flowing meanwhile
                Some(location) => self.resolve_address(location).await,
                None => None,
            };

            if updates.send(StateUpdate::Address(address)).await.is_err() {
                break;
            }
        }
    }

    async fn resolve_address(&self, location: &Location) -> Option<String> {
        match self.geocoder.reverse_geocode(location).await {
            Ok(placemarks) => placemarks.first().and_then(Placemark::formatted_address),
            Err(err) => {
                warn!("reverse geocoding failed: {err}");
                None
            }
        }
    }

    async fn apply_updates(&self, queue: Receiver<StateUpdate>) {
        while let Ok(update) = queue.recv().await {
            let mut next = self.state.get();
            match update {
                StateUpdate::Authorization(status) => next.authorization_status = status,
                StateUpdate::Address(address) => next.address_info = address,
            }
            if next != self.state.get() {
                self.state.set(next);
            }
        }
    }
}
