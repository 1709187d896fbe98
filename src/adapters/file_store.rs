//! JSON-file [`CatalogStore`] written through a [`Storage`] port.
//!
//! The whole catalog is one document, `{ "next_id": n, "movies": [...] }`,
//! with movies in creation order. Every call reloads the document so edits
//! made by another process are picked up. Writers hold the storage's
//! exclusive lock across the whole read-modify-write cycle, which makes the
//! version check and the save one step for every handle on the same file.
//! Readers take no lock; the storage swaps the file contents in one go.

use std::collections::HashSet;
use std::io::ErrorKind;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::{Movie, MovieId, NewMovie};
use crate::domain::ports::{CatalogStore, Storage};
use crate::utils::error::{StoreError, StoreResult};

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    next_id: i64,
    movies: Vec<Movie>,
}

impl CatalogFile {
    fn empty() -> Self {
        Self {
            next_id: 1,
            movies: Vec::new(),
        }
    }

    fn check(&self) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(self.movies.len());
        for movie in &self.movies {
            if !seen.insert(movie.id) {
                return Err(StoreError::Unavailable {
                    message: format!("catalog file contains movie id {} twice", movie.id),
                });
            }
            if movie.id.0 >= self.next_id {
                return Err(StoreError::Unavailable {
                    message: format!(
                        "catalog file next_id {} is not above movie id {}",
                        self.next_id, movie.id
                    ),
                });
            }
        }
        Ok(())
    }

    fn position(&self, id: MovieId) -> Option<usize> {
        self.movies.iter().position(|m| m.id == id)
    }
}

pub struct JsonFileCatalogStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> JsonFileCatalogStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    async fn load(&self) -> StoreResult<CatalogFile> {
        let file = match self.storage.read_file(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => CatalogFile::empty(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path, "catalog file missing, starting empty");
                CatalogFile::empty()
            }
            Err(e) => return Err(e),
        };
        file.check()?;
        Ok(file)
    }

    async fn save(&self, file: &CatalogFile) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(file)?;
        self.storage.write_file(&self.path, &bytes).await
    }
}

#[async_trait]
impl<S: Storage> CatalogStore for JsonFileCatalogStore<S> {
    async fn list_all(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.load().await?.movies)
    }

    async fn get_by_id(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let file = self.load().await?;
        Ok(file.movies.into_iter().find(|m| m.id == id))
    }

    async fn exists(&self, id: MovieId) -> StoreResult<bool> {
        Ok(self.load().await?.position(id).is_some())
    }

    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie> {
        let _lock = self.storage.lock_exclusive(&self.path).await?;
        let mut file = self.load().await?;

        let id = MovieId(file.next_id);
        file.next_id += 1;
        let stored = Movie::from_new(id, movie);
        file.movies.push(stored.clone());
        self.save(&file).await?;

        tracing::debug!(%id, path = %self.path, "inserted movie");
        Ok(stored)
    }

    async fn replace(&self, movie: Movie) -> StoreResult<Movie> {
        let _lock = self.storage.lock_exclusive(&self.path).await?;
        let mut file = self.load().await?;

        let id = movie.id;
        let index = match file.position(id) {
            Some(index) if file.movies[index].version == movie.version => index,
            _ => return Err(StoreError::Conflict { id }),
        };

        let updated = Movie {
            version: movie.version + 1,
            ..movie
        };
        file.movies[index] = updated.clone();
        self.save(&file).await?;

        tracing::debug!(%id, version = updated.version, "replaced movie");
        Ok(updated)
    }

    async fn remove(&self, id: MovieId) -> StoreResult<()> {
        let _lock = self.storage.lock_exclusive(&self.path).await?;
        let mut file = self.load().await?;

        let index = file.position(id).ok_or(StoreError::NotFound { id })?;
        file.movies.remove(index);
        self.save(&file).await?;

        tracing::debug!(%id, "removed movie");
        Ok(())
    }
}
