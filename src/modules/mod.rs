pub mod books;

use std::sync::Arc;

use library_db::{RecordStore, StoreModule};
use library_kernel::{settings::Settings, ModuleRegistry};

/// Register the store as a core module and every project module on top of it.
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: Arc<dyn RecordStore>,
    settings: &Settings,
) {
    registry.register_core(Arc::new(StoreModule::new(store.clone())));

    let service = books::BookService::new(store, settings.pagination.clone());
    registry.register_custom(books::create_module(service));
}
