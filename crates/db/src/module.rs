use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use library_kernel::{InitCtx, Module};

use crate::store::RecordStore;

/// Core module owning the record store's lifecycle: verifies the store is
/// reachable on init and releases it on stop.
pub struct StoreModule {
    store: Arc<dyn RecordStore>,
}

impl StoreModule {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for StoreModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.store
            .ping()
            .await
            .with_context(|| format!("{} store is unreachable", self.store.backend()))?;

        tracing::info!(
            module = self.name(),
            backend = self.store.backend(),
            url = %ctx.settings.database.url,
            "record store ready"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.close().await;
        tracing::info!(module = self.name(), "record store closed");
        Ok(())
    }
}
