//! Linux location backend using the GeoClue2 D-Bus service.

mod shutdown;

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, error, warn};
use zbus::blocking::Connection;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use self::shutdown::{ShutdownHandle, ShutdownReceiver};
use crate::{
    AuthorizationStatus, Location, LocationBackend, LocationDelegate, LocationError,
    LocationEvent, LocationResult,
};

const GEOCLUE_BUS: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";
const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";

const DEFAULT_DESKTOP_ID: &str = "kenethon";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Backend polling GeoClue2 on a background thread while updates are active.
///
/// Linux has no runtime location prompt, so authorization comes straight from
/// [`kenethon_permission::check`].
pub struct GeoClueBackend {
    desktop_id: String,
    poll_interval: Duration,
    delegate: Mutex<Option<Arc<dyn LocationDelegate>>>,
    worker: Mutex<Option<ShutdownHandle>>,
}

impl fmt::Debug for GeoClueBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoClueBackend")
            .field("desktop_id", &self.desktop_id)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Default for GeoClueBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DESKTOP_ID)
    }
}

impl GeoClueBackend {
    /// Creates a backend identifying itself to GeoClue as `desktop_id`.
    #[must_use]
    pub fn new(desktop_id: impl Into<String>) -> Self {
        Self {
            desktop_id: desktop_id.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            delegate: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    /// Sets how often the GeoClue client is read while updates are active.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn delegate(&self) -> Option<Arc<dyn LocationDelegate>> {
        self.delegate
            .lock()
            .expect("delegate mutex poisoned")
            .clone()
    }
}

impl LocationBackend for GeoClueBackend {
    fn authorization_status(&self) -> AuthorizationStatus {
        kenethon_permission::check()
    }

    fn request_authorization(&self) {
        match kenethon_permission::request() {
            Ok(status) => {
                if let Some(delegate) = self.delegate() {
                    delegate.on_event(LocationEvent::AuthorizationChanged { status });
                }
            }
            Err(err) => error!("failed to request location authorization: {err}"),
        }
    }

    fn start_updating_location(&self) -> LocationResult<()> {
        let mut worker = self.worker.lock().expect("worker mutex poisoned");
        if worker.is_some() {
            return Ok(());
        }

        let delegate = self.delegate().ok_or(LocationError::DelegateMissing)?;
        let client = GeoClueClient::connect(&self.desktop_id)?;
        let (handle, receiver) = ShutdownHandle::new();
        let interval = self.poll_interval;

        std::thread::Builder::new()
            .name("geoclue-poll".into())
            .spawn(move || poll(&client, delegate.as_ref(), &receiver, interval))
            .map_err(|e| LocationError::Unknown(format!("failed to spawn GeoClue worker: {e}")))?;

        debug!("GeoClue updates started for {}", self.desktop_id);
        *worker = Some(handle);
        Ok(())
    }

    fn stop_updating_location(&self) {
        let handle = self.worker.lock().expect("worker mutex poisoned").take();
        if let Some(handle) = handle {
            handle.shutdown();
            debug!("GeoClue updates stopped for {}", self.desktop_id);
        }
    }

    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>) {
        let mut guard = self.delegate.lock().expect("delegate mutex poisoned");
        *guard = Some(delegate);
    }
}

fn poll(
    client: &GeoClueClient,
    delegate: &dyn LocationDelegate,
    shutdown: &ShutdownReceiver,
    interval: Duration,
) {
    while !shutdown.is_shutdown() {
        match client.read_fix() {
            // A read racing a stop must not deliver
            Ok(location) if !shutdown.is_shutdown() => {
                delegate.on_event(LocationEvent::LocationsUpdated {
                    locations: vec![location],
                });
            }
            Ok(_) => break,
            // No fix yet or signal lost: nothing is emitted
            Err(err) => warn!("no GeoClue fix: {err}"),
        }
        std::thread::sleep(interval);
    }
    client.stop();
}

struct GeoClueClient {
    connection: Connection,
    path: OwnedObjectPath,
}

impl GeoClueClient {
    fn connect(desktop_id: &str) -> LocationResult<Self> {
        let connection = Connection::system()
            .map_err(|e| LocationError::Unknown(format!("D-Bus connection failed: {e}")))?;

        let (path,): (OwnedObjectPath,) = connection
            .call_method(
                Some(GEOCLUE_BUS),
                MANAGER_PATH,
                Some(MANAGER_IFACE),
                "GetClient",
                &(),
            )
            .map_err(|_| LocationError::ServiceDisabled)?
            .body()
            .deserialize()
            .map_err(|e| LocationError::Unknown(format!("failed to parse client path: {e}")))?;

        // GeoClue refuses to start clients without a desktop ID
        connection
            .call_method(
                Some(GEOCLUE_BUS),
                path.as_str(),
                Some(PROPERTIES_IFACE),
                "Set",
                &(CLIENT_IFACE, "DesktopId", Value::from(desktop_id)),
            )
            .map_err(|e| LocationError::Unknown(format!("failed to set desktop ID: {e}")))?;

        connection
            .call_method(Some(GEOCLUE_BUS), path.as_str(), Some(CLIENT_IFACE), "Start", &())
            .map_err(|_| LocationError::PermissionDenied)?;

        Ok(Self { connection, path })
    }

    fn property(&self, path: &str, interface: &str, name: &str) -> LocationResult<OwnedValue> {
        self.connection
            .call_method(
                Some(GEOCLUE_BUS),
                path,
                Some(PROPERTIES_IFACE),
                "Get",
                &(interface, name),
            )
            .map_err(|e| LocationError::Unknown(format!("failed to read {name}: {e}")))?
            .body()
            .deserialize()
            .map_err(|e| LocationError::Unknown(format!("failed to parse {name}: {e}")))
    }

    fn number(&self, path: &str, name: &str) -> LocationResult<f64> {
        let value = self.property(path, LOCATION_IFACE, name)?;
        f64::try_from(value).map_err(|e| LocationError::Unknown(format!("{name} is not a number: {e}")))
    }

    fn read_fix(&self) -> LocationResult<Location> {
        let location_path = OwnedObjectPath::try_from(self.property(
            self.path.as_str(),
            CLIENT_IFACE,
            "Location",
        )?)
        .map_err(|_| LocationError::NotAvailable)?;

        // GeoClue reports "/" until the first fix
        if location_path.as_str() == "/" {
            return Err(LocationError::NotAvailable);
        }

        let path = location_path.as_str();
        Ok(Location {
            latitude: self.number(path, "Latitude")?,
            longitude: self.number(path, "Longitude")?,
            altitude: self
                .number(path, "Altitude")
                .ok()
                .filter(|altitude| *altitude > f64::MIN),
            horizontal_accuracy: self.number(path, "Accuracy").ok(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0),
        })
    }

    fn stop(&self) {
        if let Err(err) = self.connection.call_method(
            Some(GEOCLUE_BUS),
            self.path.as_str(),
            Some(CLIENT_IFACE),
            "Stop",
            &(),
        ) {
            warn!("failed to stop GeoClue client: {err}");
        }
    }
}
