//! Service assembly: store, module registry, migrations and the serve loop.

use std::sync::Arc;

use anyhow::Context;
use library_db::RecordStore;
use library_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A fully registered service, ready to migrate or serve.
pub struct App {
    pub registry: ModuleRegistry,
    pub store: Arc<dyn RecordStore>,
}

impl App {
    /// Apply every pending module migration; returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = self
            .store
            .apply_migrations(&migrations)
            .await
            .context("failed to apply migrations")?;

        tracing::info!(
            applied,
            known = migrations.len(),
            backend = self.store.backend(),
            "migrations complete"
        );
        Ok(applied)
    }
}

/// Connect the configured store and register every module over it.
pub async fn assemble(settings: &Settings) -> anyhow::Result<App> {
    let store = library_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store.clone(), settings);

    tracing::debug!(
        core = registry.core_module_count(),
        custom = registry.custom_module_count(),
        "modules registered"
    );
    Ok(App { registry, store })
}

/// Boot the service and serve HTTP until shutdown, then stop every module.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let app = assemble(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    app.registry.init_all(&ctx).await?;
    app.migrate().await?;
    app.registry.start_all(&ctx).await?;

    let served = library_http::start_server(&app.registry, &settings).await;
    app.registry.stop_all().await?;
    served
}
