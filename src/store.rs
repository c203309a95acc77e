use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{AirClientFactory, DeviceConfig, DeviceEvent, DeviceSession, PlatformSettings, SessionError};

pub enum SessionUpdate {
    Added(String),
    Reconfigured(String),
    NoChange,
}

pub enum SessionRemove {
    Removed(DeviceSession),
    NotFound,
}

/// Registry of device sessions keyed by device address. Owns the sender
/// half of the event channel; the receiver is handed to the caller at
/// construction.
pub struct SessionStore {
    factory: Arc<dyn AirClientFactory>,
    events: mpsc::Sender<DeviceEvent>,
    timeout: Duration,
    sessions: HashMap<String, DeviceSession>,
}

impl SessionStore {
    pub fn new(
        factory: Arc<dyn AirClientFactory>,
        timeout: Duration,
        channel_size: usize,
    ) -> (Self, mpsc::Receiver<DeviceEvent>) {
        let (events, receiver) = mpsc::channel(channel_size);
        (
            Self {
                factory,
                events,
                timeout,
                sessions: HashMap::new(),
            },
            receiver,
        )
    }

    /// Creates a session for the device or reconfigures the existing one in
    /// place. Either way the first client is constructed eagerly so a
    /// broken transport surfaces at setup time.
    pub async fn add(&mut self, config: DeviceConfig) -> Result<SessionUpdate, SessionError> {
        let address = config.address.clone();
        let update = match self.sessions.entry(address.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get_mut().reconfigure(config) {
                    SessionUpdate::Reconfigured(address.clone())
                } else {
                    SessionUpdate::NoChange
                }
            }
            Entry::Vacant(entry) => {
                log::info!("Initializing device session for {}...", config.name);
                entry.insert(DeviceSession::new(
                    config,
                    self.factory.clone(),
                    self.events.clone(),
                    self.timeout,
                ));
                SessionUpdate::Added(address.clone())
            }
        };
        if let Some(session) = self.sessions.get_mut(&address) {
            session.connect().await?;
        }
        Ok(update)
    }

    /// Drops a device session, aborting any pending settled-speed
    /// confirmation so no timer outlives its device.
    pub fn remove(&mut self, address: &str) -> SessionRemove {
        match self.sessions.remove(address) {
            Some(mut session) => {
                session.cancel_pending();
                SessionRemove::Removed(session)
            }
            None => SessionRemove::NotFound,
        }
    }

    /// Brings the store in line with the configured device list: adds every
    /// configured device and removes sessions that are no longer
    /// configured. Per-device setup failures are logged, not propagated, so
    /// one unreachable device does not take the rest down.
    pub async fn sync(&mut self, settings: &PlatformSettings) {
        for device in &settings.devices {
            if let Err(err) = self.add(device.clone()).await {
                log::warn!("Error setting up {}: {}", device.address, err);
            }
        }

        let configured: HashSet<&str> = settings
            .devices
            .iter()
            .map(|device| device.address.as_str())
            .collect();
        let stale: Vec<String> = self
            .sessions
            .keys()
            .filter(|address| !configured.contains(address.as_str()))
            .cloned()
            .collect();
        for address in stale {
            if let SessionRemove::Removed(session) = self.remove(&address) {
                log::info!("{} removed from configuration.", session.config().name);
            }
        }
    }

    /// Warms the firmware/status/filter snapshots of every device. Failures
    /// are logged; devices stay usable and retry on the next read.
    pub async fn prefetch(&mut self) {
        for session in self.sessions.values_mut() {
            if let Err(err) = session.firmware().await {
                log::warn!("Unable to load firmware info: {}", err);
            }
            if let Err(err) = session.status().await {
                log::warn!("Unable to load status info: {}", err);
            }
            if let Err(err) = session.filters().await {
                log::warn!("Unable to load filter info: {}", err);
            }
        }
    }

    pub fn get(&self, address: &str) -> Option<&DeviceSession> {
        self.sessions.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut DeviceSession> {
        self.sessions.get_mut(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.sessions.contains_key(address)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        log::debug!("Clearing all device sessions!");
        for session in self.sessions.values_mut() {
            session.cancel_pending();
        }
        self.sessions.clear();
    }
}
