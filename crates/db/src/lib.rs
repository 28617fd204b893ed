//! Record store adapters for the library service.
//!
//! [`RecordStore`] is the persistence boundary: filter, order, window and
//! count over collections of raw [`Record`]s. [`MemoryStore`] keeps rows in
//! process; [`SqliteStore`] persists them through `sqlx`.

pub mod error;
pub mod memory;
pub mod module;
pub mod query;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use library_kernel::settings::{DatabaseSettings, StoreBackend};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use module::StoreModule;
pub use query::{Direction, Filter, Order, Query, Range, Record, RecordId, ID_FIELD};
pub use sqlite::SqliteStore;
pub use store::RecordStore;

/// Build the store selected by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(
            SqliteStore::connect(&settings.url, settings.max_connections)
                .await
                .with_context(|| format!("failed to open sqlite database '{}'", settings.url))?,
        ),
    };

    tracing::info!(backend = store.backend(), "record store connected");
    Ok(store)
}
