use async_trait::async_trait;
use library_kernel::Migration;

use crate::error::StoreResult;
use crate::query::{Filter, Query, Record, RecordId};

/// Persistence boundary for record collections.
///
/// Every method is a single store round trip. Callers that read and then
/// write the same record get no atomicity across the two calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs
    fn backend(&self) -> &'static str;

    /// Cheap liveness check
    async fn ping(&self) -> StoreResult<()>;

    /// Insert a record and return it as stored, including the assigned id.
    /// Any `id` present in `record` is ignored.
    async fn insert(&self, collection: &str, record: Record) -> StoreResult<Record>;

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>>;

    /// Overwrite every field present in `record` on the row with `id`.
    /// Returns `None` when no such row exists.
    async fn replace(
        &self,
        collection: &str,
        id: RecordId,
        record: Record,
    ) -> StoreResult<Option<Record>>;

    /// Delete the row with `id`, returning it if it existed.
    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>>;

    /// Filtered, ordered, windowed read. Without an order, rows come back
    /// by ascending id.
    async fn select(&self, collection: &str, query: &Query) -> StoreResult<Vec<Record>>;

    /// Number of rows passing `filters`, ignoring any window.
    async fn count(&self, collection: &str, filters: &[Filter]) -> StoreResult<u64>;

    /// Apply migrations not yet recorded as applied; returns how many ran.
    async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> StoreResult<usize>;

    /// Release connections. The store is unusable afterwards.
    async fn close(&self);
}
