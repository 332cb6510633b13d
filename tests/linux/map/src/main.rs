//! Console renderer for the location pipeline, backed by GeoClue2 and Nominatim.
//!
//! Run with: cargo run -p kenethon-map-demo [config.json]
//!
//! The optional config file may set `presenter` and `nominatim` sections:
//!
//! ```json
//! { "presenter": { "distance_threshold_meters": 25.0 }, "nominatim": { "language": "en" } }
//! ```

use kenethon_geocode::NominatimConfig;
use kenethon_location::LocationProvider;
use kenethon_presenter::{AuthorizationStatus, PresenterConfig, UiState};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoConfig {
    presenter: PresenterConfig,
    nominatim: NominatimConfig,
}

fn load_config() -> DemoConfig {
    let Some(path) = std::env::args().nth(1) else {
        return DemoConfig::default();
    };
    match std::fs::read_to_string(&path).map(|text| serde_json::from_str(&text)) {
        Ok(Ok(config)) => config,
        Ok(Err(e)) => {
            log::error!("invalid config {path}: {e}");
            DemoConfig::default()
        }
        Err(e) => {
            log::error!("cannot read config {path}: {e}");
            DemoConfig::default()
        }
    }
}

/// The text shown in the panel under the map.
fn render(state: &UiState) -> String {
    match state.authorization_status {
        AuthorizationStatus::Undetermined => "[Enable Location Services]".to_owned(),
        AuthorizationStatus::Restricted => "Location services are restricted".to_owned(),
        AuthorizationStatus::Denied => "Please enable location services in settings".to_owned(),
        AuthorizationStatus::AuthorizedLimited | AuthorizationStatus::AuthorizedFull => state
            .address_info
            .clone()
            .unwrap_or_else(|| "Unknown".to_owned()),
    }
}

/// Presses "Enable Location Services" when the platform has not decided yet.
///
/// Asks the provider rather than the presenter, whose state lags until the
/// pipeline has run.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn prompt_if_undetermined(provider: &LocationProvider) -> bool {
    let undetermined = provider.current_authorization() == AuthorizationStatus::Undetermined;
    if undetermined {
        provider.request_authorization();
    }
    undetermined
}

#[cfg(target_os = "linux")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use kenethon_geocode::NominatimGeocoder;
    use kenethon_location::sys::GeoClueBackend;
    use kenethon_presenter::LocationPresenter;

    env_logger::init();
    let config = load_config();

    println!("=== KenetHon Map Demo (Linux) ===\n");

    let provider = LocationProvider::new(Arc::new(GeoClueBackend::new("kenethon")));
    let geocoder = Arc::new(NominatimGeocoder::new(config.nominatim));
    let presenter = LocationPresenter::with_config(provider.clone(), geocoder, config.presenter);

    let states = presenter.subscribe();
    let renderer = tokio::spawn(async move {
        while let Ok(state) = states.recv().await {
            println!("{}", render(&state));
        }
    });
    let pipeline = tokio::spawn(presenter.run());

    // The console has no button; press it for the user
    prompt_if_undetermined(&provider);

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("cannot listen for Ctrl-C: {e}");
    }

    provider.stop_monitoring_location();
    provider.shutdown();
    if let Err(e) = pipeline.await {
        log::error!("location pipeline panicked: {e}");
    }
    renderer.abort();
}

#[cfg(not(target_os = "linux"))]
fn main() {
    let _ = load_config();
    println!("{}", render(&UiState::default()));
    println!("The map demo needs GeoClue2 and only runs on Linux.");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use kenethon_location::{
        LocationBackend, LocationDelegate, LocationProvider, LocationResult,
    };
    use kenethon_presenter::LocationPresenter;

    use super::{AuthorizationStatus, DemoConfig, UiState, prompt_if_undetermined, render};

    #[derive(Debug, Default)]
    struct FixedBackend {
        status: AuthorizationStatus,
        requests: Mutex<usize>,
    }

    impl LocationBackend for FixedBackend {
        fn authorization_status(&self) -> AuthorizationStatus {
            self.status
        }

        fn request_authorization(&self) {
            *self.requests.lock().unwrap() += 1;
        }

        fn start_updating_location(&self) -> LocationResult<()> {
            Ok(())
        }

        fn stop_updating_location(&self) {}

        fn set_delegate(&self, _delegate: Arc<dyn LocationDelegate>) {}
    }

    #[derive(Debug)]
    struct NoGeocoder;

    impl kenethon_geocode::Geocoder for NoGeocoder {
        fn reverse_geocode<'a>(
            &'a self,
            _location: &'a kenethon_location::Location,
        ) -> futures::future::BoxFuture<
            'a,
            Result<Vec<kenethon_geocode::Placemark>, kenethon_geocode::GeocodeError>,
        > {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn state(authorization_status: AuthorizationStatus, address: Option<&str>) -> UiState {
        UiState {
            authorization_status,
            address_info: address.map(str::to_owned),
        }
    }

    #[test]
    fn renders_one_view_per_status() {
        assert_eq!(
            render(&state(AuthorizationStatus::Undetermined, None)),
            "[Enable Location Services]"
        );
        assert_eq!(
            render(&state(AuthorizationStatus::Restricted, Some("ignored"))),
            "Location services are restricted"
        );
        assert_eq!(
            render(&state(AuthorizationStatus::Denied, None)),
            "Please enable location services in settings"
        );
        assert_eq!(
            render(&state(AuthorizationStatus::AuthorizedFull, Some("Main St, Springfield"))),
            "Main St, Springfield"
        );
    }

    #[test]
    fn missing_address_renders_unknown() {
        assert_eq!(
            render(&state(AuthorizationStatus::AuthorizedLimited, None)),
            "Unknown"
        );
    }

    #[test]
    fn prompts_only_while_the_platform_is_undetermined() {
        let denied = Arc::new(FixedBackend {
            status: AuthorizationStatus::Denied,
            ..FixedBackend::default()
        });
        let provider = LocationProvider::new(denied.clone());
        let presenter = LocationPresenter::new(provider.clone(), Arc::new(NoGeocoder));

        // The presenter has not run yet and still shows its default
        assert_eq!(
            presenter.state().authorization_status,
            AuthorizationStatus::Undetermined
        );
        assert!(!prompt_if_undetermined(&provider));
        assert_eq!(*denied.requests.lock().unwrap(), 0);

        let undetermined = Arc::new(FixedBackend::default());
        let provider = LocationProvider::new(undetermined.clone());
        assert!(prompt_if_undetermined(&provider));
        assert_eq!(*undetermined.requests.lock().unwrap(), 1);
    }

    #[test]
    fn config_sections_are_optional() {
        let config: DemoConfig =
            serde_json::from_str(r#"{"nominatim": {"language": "fr"}}"#).unwrap();
        assert_eq!(config.nominatim.language.as_deref(), Some("fr"));
        assert!((config.presenter.distance_threshold_meters - 50.0).abs() < f64::EPSILON);
    }
}
