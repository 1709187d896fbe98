//! In-memory [`CatalogStore`] for tests and throwaway sessions.
//!
//! Movies live in a `BTreeMap` keyed by id. Ids are handed out from a
//! monotonically increasing counter, so key order is creation order.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::model::{Movie, MovieId, NewMovie};
use crate::domain::ports::CatalogStore;
use crate::utils::error::{StoreError, StoreResult};

#[derive(Debug)]
struct Inner {
    next_id: i64,
    movies: BTreeMap<MovieId, Movie>,
}

#[derive(Debug)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poison_err<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable {
        message: "lock poisoned".to_string(),
    }
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                movies: BTreeMap::new(),
            }),
        }
    }

    /// Number of movies currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        let count = {
            let inner = self.inner.read().map_err(poison_err)?;
            inner.movies.len()
        };
        Ok(count)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_all(&self) -> StoreResult<Vec<Movie>> {
        let movies = {
            let inner = self.inner.read().map_err(poison_err)?;
            inner.movies.values().cloned().collect()
        };
        Ok(movies)
    }

    async fn get_by_id(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let movie = {
            let inner = self.inner.read().map_err(poison_err)?;
            inner.movies.get(&id).cloned()
        };
        Ok(movie)
    }

    async fn exists(&self, id: MovieId) -> StoreResult<bool> {
        let found = {
            let inner = self.inner.read().map_err(poison_err)?;
            inner.movies.contains_key(&id)
        };
        Ok(found)
    }

    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie> {
        let stored = {
            let mut inner = self.inner.write().map_err(poison_err)?;
            let id = MovieId(inner.next_id);
            inner.next_id += 1;
            let stored = Movie::from_new(id, movie);
            inner.movies.insert(id, stored.clone());
            stored
        };
        tracing::debug!(id = %stored.id, "inserted movie");
        Ok(stored)
    }

    async fn replace(&self, movie: Movie) -> StoreResult<Movie> {
        let id = movie.id;
        let updated = {
            let mut inner = self.inner.write().map_err(poison_err)?;
            match inner.movies.get_mut(&id) {
                Some(current) if current.version == movie.version => {
                    let updated = Movie {
                        version: movie.version + 1,
                        ..movie
                    };
                    *current = updated.clone();
                    updated
                }
                _ => return Err(StoreError::Conflict { id }),
            }
        };

        tracing::debug!(id = %updated.id, version = updated.version, "replaced movie");
        Ok(updated)
    }

    async fn remove(&self, id: MovieId) -> StoreResult<()> {
        let removed = {
            let mut inner = self.inner.write().map_err(poison_err)?;
            inner.movies.remove(&id)
        };
        match removed {
            Some(_) => {
                tracing::debug!(%id, "removed movie");
                Ok(())
            }
            None => Err(StoreError::NotFound { id }),
        }
    }
}
