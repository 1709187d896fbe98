use crate::domain::ports::Storage;
use crate::utils::error::{StoreError, StoreResult};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Filesystem-backed [`Storage`]. Relative paths resolve against `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

/// Advisory lock on `<file>.lock`, released when the handle is closed.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }

    fn lock_path(&self, path: &str) -> PathBuf {
        let mut name = self.resolve(path).into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}

fn join_err(e: tokio::task::JoinError) -> StoreError {
    StoreError::Unavailable {
        message: format!("file task failed: {}", e),
    }
}

async fn ensure_parent(path: &Path) -> StoreResult<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;
    Ok(parent)
}

impl Storage for LocalStorage {
    type Lock = FileLock;

    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full_path = self.resolve(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let full_path = self.resolve(path);
        let parent = ensure_parent(&full_path).await?;
        let data = data.to_vec();

        // Write a sibling temp file and rename it over the target, so a crash
        // never leaves a half-written file behind.
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(parent)?;
            temp.write_all(&data)?;
            temp.as_file().sync_all()?;
            temp.persist(&full_path)?;
            Ok(())
        })
        .await
        .map_err(join_err)??;
        Ok(())
    }

    async fn lock_exclusive(&self, path: &str) -> StoreResult<FileLock> {
        let lock_path = self.lock_path(path);
        ensure_parent(&lock_path).await?;

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(join_err)??;

        tracing::trace!(path, "acquired file lock");
        Ok(FileLock { _file: file })
    }
}
