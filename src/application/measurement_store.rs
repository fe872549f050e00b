// Store trait for health record persistence
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// External health-record store. Values handed to `write` are always in the
/// store's native unit (mg/dL); conversion happens before this boundary.
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Persist one glucose value at the given instant.
    async fn write(&self, value: f64, timestamp: DateTime<Utc>) -> anyhow::Result<()>;

    /// Delete every record inside [start, end], returning how many were removed.
    async fn delete(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<u64>;

    /// Ask the store for read/write access. `Ok(false)` means denied.
    async fn request_access(&self) -> anyhow::Result<bool>;
}
