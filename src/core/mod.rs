pub mod catalog;
pub mod pdf;
pub mod report;

pub use crate::domain::model::{ExportedDocument, Movie, MovieForm, MovieId, NewMovie, Price};
pub use crate::domain::ports::{CatalogStore, Storage};
pub use crate::utils::error::Result;
