use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    encode_fan_speed, normalize_filters, normalize_firmware, normalize_status, AirClient,
    AirClientError, AirClientFactory, ClientSlot, DeviceConfig, DeviceEvent, Filters, Firmware,
    SettleTimer, SnapshotEntry, SnapshotSet, SpeedEncoding, Status, ValuePatch, FILTERS_TTL,
    FIRMWARE_TTL, SETTLE_DELAY, STATUS_TTL,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("error getting client for {address}: {source}")]
    ClientAcquisition {
        address: String,
        #[source]
        source: AirClientError,
    },
    #[error("unable to load {kind} info from {address}: {source}")]
    RemoteFetch {
        address: String,
        kind: &'static str,
        #[source]
        source: AirClientError,
    },
    #[error("error writing values to {address}: {source}")]
    RemoteWrite {
        address: String,
        #[source]
        source: AirClientError,
    },
}

/// One device's session: client handle, snapshot cache and settle timer.
/// Operations on the same device serialize through `&mut self`; sessions of
/// different devices are independent.
pub struct DeviceSession {
    config: DeviceConfig,
    timeout: Duration,
    factory: Arc<dyn AirClientFactory>,
    client: Option<ClientSlot>,
    snapshots: SnapshotSet,
    settle: SettleTimer,
    events: mpsc::Sender<DeviceEvent>,
}

impl DeviceSession {
    pub fn new(
        config: DeviceConfig,
        factory: Arc<dyn AirClientFactory>,
        events: mpsc::Sender<DeviceEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            config,
            timeout,
            factory,
            client: None,
            snapshots: SnapshotSet::new(),
            settle: SettleTimer::new(),
            events,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Replaces the configuration and drops the client handle so the next
    /// acquire constructs against the new protocol. Cached snapshots stay.
    /// Returns true when the configuration actually changed.
    pub fn reconfigure(&mut self, config: DeviceConfig) -> bool {
        let changed = self.config != config;
        self.config = config;
        self.client = None;
        changed
    }

    /// Eagerly acquires the first client so a broken transport surfaces at
    /// setup time instead of on the first read.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        self.acquire().await.map(|_| ())
    }

    /// Aborts a pending settled-speed confirmation, if any.
    pub fn cancel_pending(&mut self) -> bool {
        self.settle.cancel()
    }

    pub fn cached_status(&self) -> Option<&Status> {
        self.snapshots.status.as_ref().map(|entry| &entry.value)
    }

    async fn acquire(&mut self) -> Result<Arc<dyn AirClient>, SessionError> {
        match &self.client {
            Some(slot) if !slot.expired() => Ok(slot.client.clone()),
            _ => {
                // an expired handle is never reused, even when replacing it fails
                self.client = None;
                let slot = ClientSlot::create(self.factory.as_ref(), &self.config, self.timeout)
                    .await
                    .map_err(|source| SessionError::ClientAcquisition {
                        address: self.config.address.clone(),
                        source,
                    })?;
                let client = slot.client.clone();
                self.client = Some(slot);
                Ok(client)
            }
        }
    }

    fn mark_fetched(&mut self) {
        if let Some(slot) = self.client.as_mut() {
            slot.fetched = true;
        }
    }

    /// Current status, refreshed when the cached snapshot is older than its
    /// TTL. A failed refresh falls back to the stale snapshot when one
    /// exists; without one the error surfaces.
    pub async fn status(&mut self) -> Result<Status, SessionError> {
        if let Some(entry) = self.snapshots.status.as_ref().filter(|e| e.fresh(STATUS_TTL)) {
            return Ok(entry.value.clone());
        }
        match self.fetch_status().await {
            Ok(status) => Ok(status),
            Err(err) => match &self.snapshots.status {
                Some(entry) => {
                    log::warn!(
                        "Unable to refresh status for {}, keeping data from {}: {}",
                        self.config.address,
                        entry.last_refreshed,
                        err
                    );
                    Ok(entry.value.clone())
                }
                None => Err(err),
            },
        }
    }

    pub async fn firmware(&mut self) -> Result<Firmware, SessionError> {
        if let Some(entry) = self
            .snapshots
            .firmware
            .as_ref()
            .filter(|e| e.fresh(FIRMWARE_TTL))
        {
            return Ok(entry.value.clone());
        }
        match self.fetch_firmware().await {
            Ok(firmware) => Ok(firmware),
            Err(err) => match &self.snapshots.firmware {
                Some(entry) => {
                    log::warn!(
                        "Unable to refresh firmware info for {}, keeping data from {}: {}",
                        self.config.address,
                        entry.last_refreshed,
                        err
                    );
                    Ok(entry.value.clone())
                }
                None => Err(err),
            },
        }
    }

    pub async fn filters(&mut self) -> Result<Filters, SessionError> {
        if let Some(entry) = self
            .snapshots
            .filters
            .as_ref()
            .filter(|e| e.fresh(FILTERS_TTL))
        {
            return Ok(entry.value);
        }
        match self.fetch_filters().await {
            Ok(filters) => Ok(filters),
            Err(err) => match &self.snapshots.filters {
                Some(entry) => {
                    log::warn!(
                        "Unable to refresh filter info for {}, keeping data from {}: {}",
                        self.config.address,
                        entry.last_refreshed,
                        err
                    );
                    Ok(entry.value)
                }
                None => Err(err),
            },
        }
    }

    async fn fetch_status(&mut self) -> Result<Status, SessionError> {
        let client = self.acquire().await?;
        let raw = client
            .get_status()
            .await
            .map_err(|source| SessionError::RemoteFetch {
                address: self.config.address.clone(),
                kind: "status",
                source,
            })?;
        self.mark_fetched();
        let status = normalize_status(
            &raw,
            SpeedEncoding::for_device(self.config.sleep_speed),
            self.config.light_control,
        );
        self.snapshots.status = Some(SnapshotEntry::new(status.clone()));
        Ok(status)
    }

    async fn fetch_firmware(&mut self) -> Result<Firmware, SessionError> {
        let client = self.acquire().await?;
        let raw = client
            .get_firmware()
            .await
            .map_err(|source| SessionError::RemoteFetch {
                address: self.config.address.clone(),
                kind: "firmware",
                source,
            })?;
        self.mark_fetched();
        let firmware = normalize_firmware(&raw);
        self.snapshots.firmware = Some(SnapshotEntry::new(firmware.clone()));
        Ok(firmware)
    }

    async fn fetch_filters(&mut self) -> Result<Filters, SessionError> {
        let client = self.acquire().await?;
        let raw = client
            .get_filters()
            .await
            .map_err(|source| SessionError::RemoteFetch {
                address: self.config.address.clone(),
                kind: "filters",
                source,
            })?;
        self.mark_fetched();
        let filters = normalize_filters(&raw);
        self.snapshots.filters = Some(SnapshotEntry::new(filters));
        Ok(filters)
    }

    /// Applies a partial raw update. A handle that has never served a fetch
    /// first forces a status refresh so the patch merges against a known
    /// baseline; that refresh failing is logged but does not block the
    /// write. Write failures always surface.
    async fn apply(&mut self, values: ValuePatch) -> Result<(), SessionError> {
        let client = self.acquire().await?;
        if self.client.as_ref().is_some_and(|slot| !slot.fetched) {
            self.snapshots.status = None;
            if let Err(err) = self.status().await {
                log::warn!(
                    "Baseline status refresh failed for {}: {}",
                    self.config.address,
                    err
                );
            }
        }
        client
            .set_values(&values)
            .await
            .map_err(|source| SessionError::RemoteWrite {
                address: self.config.address.clone(),
                source,
            })
    }

    pub async fn set_power(&mut self, on: bool) -> Result<(), SessionError> {
        self.apply(ValuePatch::new().power(on)).await?;

        let address = self.config.address.clone();
        self.emit(DeviceEvent::PurifierStateChanged {
            address: address.clone(),
            state: if on { 2 } else { 0 },
        })
        .await;

        if self.config.light_control {
            if on {
                // the panel restores from the last seen status record
                let cached = self.cached_status().cloned();
                if let Some(status) = cached {
                    if let Some(lights) = status.lights {
                        self.emit(DeviceEvent::LightsOnChanged {
                            address: address.clone(),
                            on: lights.on,
                        })
                        .await;
                        self.emit(DeviceEvent::LightsBrightnessChanged {
                            address: address.clone(),
                            brightness: status.air_quality,
                        })
                        .await;
                        self.emit(DeviceEvent::ButtonsOnChanged {
                            address,
                            on: lights.buttons_on,
                        })
                        .await;
                    }
                }
            } else {
                self.emit(DeviceEvent::LightsOnChanged {
                    address: address.clone(),
                    on: false,
                })
                .await;
                self.emit(DeviceEvent::ButtonsOnChanged { address, on: false })
                    .await;
            }
        }
        Ok(())
    }

    /// Switches between automatic ('P') and manual ('M') mode. Entering
    /// auto mode zeroes the displayed speed ahead of the write.
    pub async fn set_mode(&mut self, auto: bool) -> Result<(), SessionError> {
        if auto {
            self.emit(DeviceEvent::FanSpeedChanged {
                address: self.config.address.clone(),
                speed: 0,
            })
            .await;
        }
        self.apply(ValuePatch::new().work_mode(if auto { "P" } else { "M" }))
            .await
    }

    pub async fn set_lock(&mut self, locked: bool) -> Result<(), SessionError> {
        self.apply(ValuePatch::new().lock(locked)).await
    }

    /// Turns the display lights on (restoring the last known level) or off.
    pub async fn set_lights(&mut self, on: bool) -> Result<(), SessionError> {
        let level = if on { self.last_brightness() } else { 0 };
        self.apply(ValuePatch::new().light_level(level)).await
    }

    pub async fn set_brightness(&mut self, level: u32) -> Result<(), SessionError> {
        self.apply(ValuePatch::new().light_level(level)).await
    }

    pub async fn set_buttons(&mut self, on: bool) -> Result<(), SessionError> {
        self.apply(ValuePatch::new().buttons(on)).await
    }

    /// Writes a fan speed target. The raw write goes out immediately; the
    /// settled domain value (speed * divisor, not the raw target) is
    /// confirmed through the settle timer so a burst of writes produces a
    /// single confirmation carrying the last value.
    pub async fn set_fan_speed(&mut self, target: u32) -> Result<(), SessionError> {
        let encoding = SpeedEncoding::for_device(self.config.sleep_speed);
        let Some(write) = encode_fan_speed(target, encoding) else {
            return Ok(());
        };

        self.apply(ValuePatch::new().work_mode("M").fan_code(write.om))
            .await?;

        self.emit(DeviceEvent::TargetModeChanged {
            address: self.config.address.clone(),
            auto: false,
        })
        .await;

        self.settle.schedule(
            self.events.clone(),
            DeviceEvent::FanSpeedChanged {
                address: self.config.address.clone(),
                speed: write.settled,
            },
            SETTLE_DELAY,
        );
        Ok(())
    }

    fn last_brightness(&self) -> u32 {
        self.cached_status()
            .and_then(|status| status.lights.map(|lights| lights.brightness))
            .unwrap_or(0)
    }

    async fn emit(&self, event: DeviceEvent) {
        if let Err(err) = self.events.send(event).await {
            log::warn!("Device event channel closed: {}", err)
        }
    }
}
