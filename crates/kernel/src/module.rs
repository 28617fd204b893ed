use async_trait::async_trait;
use axum::Router;

/// Context handed to modules while the service boots.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A schema migration contributed by a module.
///
/// `up` is backend-specific DDL; stores that have no schema record the id
/// and skip the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Lifecycle contract every service module implements.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name, also used as the mount point `/api/{name}`
    fn name(&self) -> &'static str;

    /// Called once during startup, before migrations run
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes served by this module, already bound to their state
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` + `components.schemas`) merged into the
    /// service document. Paths are relative to the module mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Migrations in the order they must be applied
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called after migrations have been applied
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called during shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
