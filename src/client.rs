use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use crate::{AirProtocol, DeviceConfig, RawFilters, RawFirmware, RawStatus, ValuePatch};

/// Maximum age of a client handle. The next acquire after this replaces it.
pub const CLIENT_MAX_AGE: Duration = Duration::from_millis(60_000);

#[derive(Debug, Error)]
pub enum AirClientError {
    #[error("transport request failed: {0}")]
    Transport(String),
    #[error("no client could be constructed for {0}")]
    Unavailable(String),
}

/// Capability a protocol-specific device client has to provide. Implemented
/// by the transport layer, consumed by the session. The core treats every
/// failure as opaque; retry and backoff are the transport's business.
#[async_trait]
pub trait AirClient: Send + Sync {
    async fn get_status(&self) -> Result<RawStatus, AirClientError>;
    async fn get_firmware(&self) -> Result<RawFirmware, AirClientError>;
    async fn get_filters(&self) -> Result<RawFilters, AirClientError>;
    async fn set_values(&self, values: &ValuePatch) -> Result<(), AirClientError>;
}

/// Constructs protocol clients, one method per supported protocol so the
/// dispatch over [`AirProtocol`] stays closed.
#[async_trait]
pub trait AirClientFactory: Send + Sync {
    async fn create_http(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn AirClient>, AirClientError>;

    async fn create_coap(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn AirClient>, AirClientError>;

    async fn create_plain_coap(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn AirClient>, AirClientError>;
}

/// The per-device client handle record. At most one lives per device at a
/// time; `fetched` tracks whether the handle has served a fetch yet (writes
/// force a baseline status refresh on a handle that has not).
pub struct ClientSlot {
    pub client: Arc<dyn AirClient>,
    created: Instant,
    pub fetched: bool,
}

impl ClientSlot {
    pub async fn create(
        factory: &dyn AirClientFactory,
        config: &DeviceConfig,
        timeout: Duration,
    ) -> Result<Self, AirClientError> {
        let client = match config.protocol {
            AirProtocol::Http => factory.create_http(&config.address, timeout).await?,
            AirProtocol::Coap => factory.create_coap(&config.address, timeout).await?,
            AirProtocol::PlainCoap => factory.create_plain_coap(&config.address, timeout).await?,
        };
        Ok(Self {
            client,
            created: Instant::now(),
            fetched: false,
        })
    }

    pub fn expired(&self) -> bool {
        self.created.elapsed() > CLIENT_MAX_AGE
    }
}
