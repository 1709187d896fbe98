// Adapters layer: concrete implementations of the domain ports.

pub mod file_store;
pub mod local_storage;
pub mod memory_store;

pub use file_store::JsonFileCatalogStore;
pub use local_storage::{FileLock, LocalStorage};
pub use memory_store::InMemoryCatalogStore;
