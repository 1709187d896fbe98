use crate::core::report::ReportGenerator;
use crate::domain::model::{ExportedDocument, Movie, MovieForm, MovieId};
use crate::domain::ports::CatalogStore;
use crate::utils::error::{CatalogError, Result, StoreError};
use crate::utils::validation::{validate_movie_form, validate_movie_update};

/// Validates caller input and mediates every catalog operation against a store.
///
/// The store is injected at construction; there is no shared global handle.
pub struct CatalogService<S: CatalogStore> {
    store: S,
    reports: ReportGenerator,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self::with_report_generator(store, ReportGenerator::default())
    }

    pub fn with_report_generator(store: S, reports: ReportGenerator) -> Self {
        Self { store, reports }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list(&self) -> Result<Vec<Movie>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn read(&self, id: MovieId) -> Result<Movie> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound { id })
    }

    pub async fn exists(&self, id: MovieId) -> Result<bool> {
        Ok(self.store.exists(id).await?)
    }

    /// On validation failure the form comes back untouched and nothing is written.
    pub async fn create(&self, form: MovieForm) -> Result<Movie> {
        let movie = match validate_movie_form(&form) {
            Ok(movie) => movie,
            Err(errors) => {
                tracing::debug!(?errors, "rejected new movie");
                return Err(CatalogError::Validation {
                    form: Box::new(form),
                    errors,
                });
            }
        };

        let stored = self.store.insert(movie).await?;
        tracing::info!(id = %stored.id, title = %stored.title, "movie created");
        Ok(stored)
    }

    /// Replaces every field of movie `id` with the form's values.
    ///
    /// The form must carry the same id and the `version` it was read at; a
    /// missing version is a validation error. A lost race is never retried:
    /// if the record is gone the result is `NotFound`, otherwise `Conflict`.
    pub async fn update(&self, id: MovieId, form: MovieForm) -> Result<Movie> {
        if form.id != Some(id) {
            tracing::debug!(%id, form_id = ?form.id, "update id mismatch");
            return Err(CatalogError::NotFound { id });
        }

        let (movie, version) = match validate_movie_update(&form) {
            Ok(validated) => validated,
            Err(errors) => {
                tracing::debug!(%id, ?errors, "rejected movie update");
                return Err(CatalogError::Validation {
                    form: Box::new(form),
                    errors,
                });
            }
        };

        let replacement = Movie {
            id,
            title: movie.title,
            release_date: movie.release_date,
            genre: movie.genre,
            price: movie.price,
            version,
        };

        match self.store.replace(replacement).await {
            Ok(updated) => {
                tracing::info!(%id, version = updated.version, "movie updated");
                Ok(updated)
            }
            Err(StoreError::Conflict { .. }) => {
                if self.exists(id).await? {
                    tracing::warn!(%id, "update lost a concurrent write");
                    Err(CatalogError::Conflict { id })
                } else {
                    tracing::warn!(%id, "movie removed while updating");
                    Err(CatalogError::NotFound { id })
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deleting a missing id is `NotFound`, not a silent success.
    pub async fn delete(&self, id: MovieId) -> Result<()> {
        if !self.exists(id).await? {
            return Err(CatalogError::NotFound { id });
        }

        match self.store.remove(id).await {
            Ok(()) => {
                tracing::info!(%id, "movie deleted");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(CatalogError::NotFound { id }),
            Err(e) => Err(e.into()),
        }
    }

    /// Renders one snapshot of the whole catalog.
    pub async fn export(&self) -> Result<ExportedDocument> {
        let snapshot = self.store.list_all().await?;
        let document = self.reports.generate(&snapshot)?;

        tracing::info!(
            movies = snapshot.len(),
            file_name = %document.file_name,
            "catalog exported"
        );
        Ok(document)
    }
}
