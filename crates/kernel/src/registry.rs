use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core modules are brought up in this order and torn down in reverse.
/// The HTTP server is started separately once every module is running.
const CORE_MODULE_ORDER: &[&str] = &[
    "db", // Record store
];

/// Holds every module of the service and drives their lifecycle.
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register an infrastructure module. Only names listed in the core
    /// order take part in the lifecycle.
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        if !CORE_MODULE_ORDER.contains(&module.name()) {
            tracing::warn!(
                module = module.name(),
                "core module is not part of the lifecycle order and will be ignored"
            );
        }
        self.core_modules.push(module);
    }

    /// Register a feature module
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All registered modules, core first
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    /// Look a module up by name across both groups
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    fn ordered_core(&self) -> impl DoubleEndedIterator<Item = &Arc<dyn Module>> {
        CORE_MODULE_ORDER.iter().filter_map(|&name| {
            self.core_modules
                .iter()
                .find(|module| module.name() == name)
        })
    }

    /// Initialize core modules in order, then custom modules in
    /// registration order.
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.ordered_core().chain(self.custom_modules.iter()) {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start core modules in order, then custom modules.
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.ordered_core().chain(self.custom_modules.iter()) {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop custom modules in reverse registration order, then core
    /// modules in reverse core order.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        tracing::info!(
            custom = self.custom_modules.len(),
            core = self.core_modules.len(),
            "stopping modules"
        );

        for module in self
            .custom_modules
            .iter()
            .rev()
            .chain(self.ordered_core().rev())
        {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Every migration contributed by every module, sorted by module name
    /// then migration id.
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules()
            .into_iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();

        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl TestModule {
        fn record(&self, event: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{event}:{}", self.name));
        }
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("start");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            Ok(())
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX idx ON test (name);",
                },
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE test (name TEXT);",
                },
            ]
        }
    }

    fn module(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Module> {
        Arc::new(TestModule {
            name,
            journal: Arc::clone(journal),
        })
    }

    #[test]
    fn empty_registry_has_no_migrations() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_sorted_by_module_then_id() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_custom(module("books", &journal));
        registry.register_core(module("db", &journal));

        let ids: Vec<(String, &str)> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| (module, migration.id))
            .collect();

        assert_eq!(
            ids,
            vec![
                ("books".to_string(), "001_init"),
                ("books".to_string(), "002_index"),
                ("db".to_string(), "001_init"),
                ("db".to_string(), "002_index"),
            ]
        );
    }

    #[test]
    fn get_module_searches_both_groups() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_core(module("db", &journal));
        registry.register_custom(module("books", &journal));

        assert!(registry.get_module("db").is_some());
        assert!(registry.get_module("books").is_some());
        assert!(registry.get_module("users").is_none());
        assert_eq!(registry.core_module_count(), 1);
        assert_eq!(registry.custom_module_count(), 1);
    }

    #[tokio::test]
    async fn lifecycle_runs_core_first_and_stops_in_reverse() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.register_custom(module("books", &journal));
        registry.register_custom(module("reviews", &journal));
        registry.register_core(module("db", &journal));
        registry.register_core(module("cache", &journal));

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        let events = journal.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "init:db",
                "init:books",
                "init:reviews",
                "start:db",
                "start:books",
                "start:reviews",
                "stop:reviews",
                "stop:books",
                "stop:db",
            ]
        );
    }
}
