//! Owned handle to an uploaded media file.
//!
//! Clips are never retained: whoever holds the handle last deletes the
//! file, either explicitly through [`StagedMedia::release`] or implicitly
//! when the handle is dropped.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MediaResult;

/// Uploaded media file that is deleted exactly once.
#[derive(Debug)]
pub struct StagedMedia {
    path: PathBuf,
    released: bool,
}

impl StagedMedia {
    /// Reserve a fresh `clip-<uuid>.<extension>` path inside `dir`.
    ///
    /// No file is created; the caller writes the upload to [`Self::path`].
    pub fn allocate(dir: impl AsRef<Path>, extension: &str) -> Self {
        let name = format!("clip-{}.{}", Uuid::new_v4().simple(), extension);
        Self::adopt(dir.as_ref().join(name))
    }

    /// Take ownership of an existing file.
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the underlying file.
    ///
    /// A file that is already gone counts as released.
    pub async fn release(mut self) -> MediaResult<()> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Released media file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for StagedMedia {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Released media file on drop"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                "Failed to remove media file on drop: {}", e
            ),
        }
    }
}
