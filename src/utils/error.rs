use crate::domain::model::{MovieForm, MovieId};
use thiserror::Error;

/// Failures reported by a [`CatalogStore`](crate::domain::ports::CatalogStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Movie {id} was modified or removed since it was read")]
    Conflict { id: MovieId },

    #[error("Movie {id} does not exist")]
    NotFound { id: MovieId },

    #[error("Entity set is unavailable: {message}")]
    Unavailable { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Validation failed: {}", join_field_errors(.errors))]
    Validation {
        form: Box<MovieForm>,
        errors: Vec<FieldError>,
    },

    #[error("Movie {id} not found")]
    NotFound { id: MovieId },

    #[error("Movie {id} was changed by another writer")]
    Conflict { id: MovieId },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Report rendering failed: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Concurrency,
    Storage,
    Rendering,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::Validation { .. } | CatalogError::NotFound { .. } => ErrorCategory::Input,
            CatalogError::Conflict { .. } => ErrorCategory::Concurrency,
            CatalogError::Store(_) | CatalogError::Io(_) => ErrorCategory::Storage,
            CatalogError::Render { .. } => ErrorCategory::Rendering,
            CatalogError::Config { .. }
            | CatalogError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CatalogError::Validation { .. } | CatalogError::NotFound { .. } => ErrorSeverity::High,
            CatalogError::Conflict { .. } => ErrorSeverity::Medium,
            CatalogError::Render { .. }
            | CatalogError::Config { .. }
            | CatalogError::InvalidConfigValue { .. } => ErrorSeverity::High,
            CatalogError::Store(_) | CatalogError::Io(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CatalogError::Validation { errors, .. } => {
                format!("The movie was not saved: {}", join_field_errors(errors))
            }
            CatalogError::NotFound { id } => format!("Movie {} was not found", id),
            CatalogError::Conflict { id } => {
                format!("Movie {} was changed by someone else; your update was discarded", id)
            }
            CatalogError::Store(e) => format!("The catalog could not be accessed: {}", e),
            CatalogError::Render { .. } => "The catalog report could not be generated".to_string(),
            CatalogError::Config { .. }
            | CatalogError::InvalidConfigValue { .. } => format!("Configuration problem: {}", self),
            CatalogError::Io(e) => format!("File access failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the movie id and field values, then try again",
            ErrorCategory::Concurrency => "Reload the movie to get its current version and re-apply your changes",
            ErrorCategory::Storage => "Check that the catalog file exists, is readable and is valid JSON",
            ErrorCategory::Rendering => "Run again with --verbose and inspect the log output",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
        }
    }
}
