use crate::domain::model::{MovieForm, NewMovie, Price};
use crate::utils::error::{CatalogError, FieldError, Result};
use chrono::NaiveDate;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Checks every field of a movie form and collects all failures.
pub fn validate_movie_form(form: &MovieForm) -> std::result::Result<NewMovie, Vec<FieldError>> {
    let mut errors = Vec::new();

    if form.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }

    let release_date = match NaiveDate::parse_from_str(form.release_date.trim(), DATE_INPUT_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(
                "release_date",
                format!("'{}' is not a valid date (expected YYYY-MM-DD)", form.release_date),
            ));
            None
        }
    };

    let price = match Price::parse(&form.price) {
        Ok(price) => Some(price),
        Err(reason) => {
            errors.push(FieldError::new("price", reason));
            None
        }
    };

    match (release_date, price) {
        (Some(release_date), Some(price)) if errors.is_empty() => Ok(NewMovie {
            title: form.title.clone(),
            release_date,
            genre: form.genre.clone(),
            price,
        }),
        _ => Err(errors),
    }
}

/// Form validation for an update, which must also carry the version it was read at.
pub fn validate_movie_update(form: &MovieForm) -> std::result::Result<(NewMovie, u64), Vec<FieldError>> {
    match (validate_movie_form(form), form.version) {
        (Ok(movie), Some(version)) => Ok((movie, version)),
        (result, version) => {
            let mut errors = result.err().unwrap_or_default();
            if version.is_none() {
                errors.push(FieldError::new(
                    "version",
                    "Version is required; read the movie first and send back its version",
                ));
            }
            Err(errors)
        }
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CatalogError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CatalogError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str());

    match extension {
        Some(ext) if allowed_extensions.contains(&ext) => Ok(()),
        Some(ext) => Err(CatalogError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(CatalogError::InvalidConfigValue {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
