use crate::domain::model::{Movie, MovieId, NewMovie};
use crate::utils::error::StoreResult;
use async_trait::async_trait;

/// Byte-level file access used by the file-backed store and by report export.
pub trait Storage: Send + Sync {
    /// Exclusive hold on a path; dropping it releases the lock.
    type Lock: Send;

    fn read_file(&self, path: &str)
        -> impl std::future::Future<Output = StoreResult<Vec<u8>>> + Send;

    /// Replaces the whole file. Readers see either the old or the new content.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;

    /// Waits until no other holder, in this process or another one, has `path` locked.
    fn lock_exclusive(&self, path: &str)
        -> impl std::future::Future<Output = StoreResult<Self::Lock>> + Send;
}

/// Keyed movie persistence with lost-update detection.
///
/// `list_all` returns movies in creation order. `replace` compares the
/// incoming `version` with the stored one and fails with
/// [`StoreError::Conflict`](crate::utils::error::StoreError::Conflict) when
/// they differ or the record is gone.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<Movie>>;

    async fn get_by_id(&self, id: MovieId) -> StoreResult<Option<Movie>>;

    async fn exists(&self, id: MovieId) -> StoreResult<bool>;

    /// Assigns the next id and version 1.
    async fn insert(&self, movie: NewMovie) -> StoreResult<Movie>;

    /// Returns the stored movie with its bumped version.
    async fn replace(&self, movie: Movie) -> StoreResult<Movie>;

    async fn remove(&self, id: MovieId) -> StoreResult<()>;
}
