//! JSON file store for region data, character profiles and icon images
//!
//! All writes go through a sibling `.tmp` file that is renamed over the
//! target, so readers only ever see a complete previous or complete new file.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Errors raised by file store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// File or directory the operation targeted
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents could not be encoded or decoded as JSON
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        /// File the document belongs to
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Ensure a directory exists, creating it and its parents if necessary
pub async fn ensure_dir(path: impl AsRef<Path>) -> StoreResult<()> {
    let path = path.as_ref();
    if tokio::fs::metadata(path).await.is_err() {
        trace!("Creating directory {}", path.display());
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
    }
    Ok(())
}

/// Check whether a file exists
pub async fn exists(path: impl AsRef<Path>) -> bool {
    tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false)
}

/// Read and decode a JSON document, returning `None` if the file does not exist
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> StoreResult<Option<T>> {
    let path = path.as_ref();
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    trace!("Read {} bytes from {}", data.len(), path.display());
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|e| StoreError::json(path, e))
}

/// Encode a value as pretty-printed JSON and write it atomically
pub async fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> StoreResult<()> {
    let path = path.as_ref();
    let data = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    write_bytes(path, &data).await
}

/// Write raw bytes atomically, creating the parent directory if needed
pub async fn write_bytes(path: impl AsRef<Path>, data: &[u8]) -> StoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let tmp = temp_path(path);
    trace!("Writing {} bytes to {}", data.len(), path.display());
    tokio::fs::write(&tmp, data)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::io(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
