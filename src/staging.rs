//! Scoped temporary files for request audio.
//!
//! Every file a request writes goes through a [`StagedFile`] guard. The
//! file is deleted when the guard is dropped, whichever path the pipeline
//! takes out of a request. Deletion failures are logged and
//! never returned to the caller of the pipeline.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::audio::AudioFormat;
use crate::config::StagingConfig;

const FILE_PREFIX: &str = "voice-agent-";

/// Directory in which request-scoped files are created.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &StagingConfig) -> Self {
        match &config.dir {
            Some(dir) => Self::new(dir),
            None => Self::new(std::env::temp_dir()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty, uniquely named file with the format's extension.
    pub async fn reserve(&self, format: AudioFormat) -> io::Result<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let suffix = format!(".{}", format.extension());
        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(FILE_PREFIX)
                .suffix(&suffix)
                .tempfile_in(dir)
        })
        .await
        .map_err(io::Error::other)??;

        let guard = temp.into_temp_path();
        log::debug!("staging: reserved {}", guard.display());
        Ok(StagedFile {
            path: guard.to_path_buf(),
            guard: Some(guard),
        })
    }

    /// Reserve a file and write `bytes` into it.
    pub async fn stage(&self, bytes: &[u8], format: AudioFormat) -> io::Result<StagedFile> {
        let file = self.reserve(format).await?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(file)
    }
}

/// Guard over one staged file; removes it on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file back into memory.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        match guard.close() {
            Ok(()) => log::debug!("staging: removed {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("staging: {} already gone", self.path.display())
            }
            Err(e) => log::warn!("staging: failed to remove {}: {e}", self.path.display()),
        }
    }
}
