pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{InMemoryCatalogStore, JsonFileCatalogStore, LocalStorage};
pub use crate::core::catalog::CatalogService;
pub use crate::core::report::{ReportGenerator, ReportLocale, ReportSettings};
pub use domain::model::{ExportedDocument, Movie, MovieForm, MovieId, Price};
pub use utils::error::{CatalogError, Result, StoreError};
