//! Temporary storage for uploaded documents.
//!
//! Each upload is written under a dedicated scratch directory with a generated
//! name and lives for exactly one request. [`StoredUpload`] removes its backing
//! file on drop, so every pipeline exit path releases the bytes.

use crate::config::get_config;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes request uploads into the configured scratch directory.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Store rooted at the directory named in the environment configuration.
    pub fn from_config() -> Self {
        Self::new(&get_config().upload_dir)
    }

    /// Store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist one upload under a generated name and hand back its handle.
    pub async fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, std::io::Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Uuid::new_v4().to_string());
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(
            filename = original_name,
            path = %path.display(),
            size = bytes.len(),
            "Stored upload"
        );
        Ok(StoredUpload {
            original_name: original_name.to_string(),
            path,
            size_bytes: bytes.len() as u64,
        })
    }
}

/// Handle to one stored upload; the backing file is removed when dropped.
#[derive(Debug)]
pub struct StoredUpload {
    original_name: String,
    path: PathBuf,
    size_bytes: u64,
}

impl StoredUpload {
    /// Filename supplied by the uploader.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Location of the stored bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the stored bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Failed to remove stored upload"
            );
        }
    }
}
