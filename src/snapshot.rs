use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use crate::{Filters, Firmware, Status};

pub const STATUS_TTL: Duration = Duration::from_millis(1000);
pub const FIRMWARE_TTL: Duration = Duration::from_millis(1000);
pub const FILTERS_TTL: Duration = Duration::from_millis(1000);

/// One cached, already-normalized fetch result. Only the fetch path creates
/// entries; reads within the TTL return the value unchanged.
#[derive(Debug, Clone)]
pub struct SnapshotEntry<T> {
    pub value: T,
    refreshed: Instant,
    /// Wall-clock refresh time, for logging and display.
    pub last_refreshed: DateTime<Utc>,
}

impl<T> SnapshotEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            refreshed: Instant::now(),
            last_refreshed: Utc::now(),
        }
    }

    pub fn fresh(&self, ttl: Duration) -> bool {
        self.refreshed.elapsed() <= ttl
    }

    pub fn age(&self) -> Duration {
        self.refreshed.elapsed()
    }
}

/// The per-device snapshot cache, one slot per fetch kind.
#[derive(Debug, Default, Clone)]
pub struct SnapshotSet {
    pub status: Option<SnapshotEntry<Status>>,
    pub firmware: Option<SnapshotEntry<Firmware>>,
    pub filters: Option<SnapshotEntry<Filters>>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }
}
