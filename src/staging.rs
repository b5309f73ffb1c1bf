//! Media staging.
//!
//! Some upstream APIs only accept a filesystem path, so uploaded blobs are copied
//! to a temporary file first. The file is removed when the [`StagedFile`] is dropped.

use crate::error::{HubError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// A blob written to a temporary file. Deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Stages blobs into a fixed directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `blob` to a new temporary file whose name ends with `.{extension}`.
    #[instrument(skip(self, blob), fields(bytes = blob.len()))]
    pub fn stage(&self, blob: &[u8], extension: &str) -> Result<StagedFile> {
        std::fs::create_dir_all(&self.dir).map_err(HubError::Staging)?;

        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(HubError::Staging)?;

        file.write_all(blob).map_err(HubError::Staging)?;
        file.flush().map_err(HubError::Staging)?;

        debug!("Staged upload at {}", file.path().display());
        Ok(StagedFile { file })
    }
}

impl Default for Stager {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

/// Stage a blob in the system temp directory.
pub fn stage(blob: &[u8], extension: &str) -> Result<StagedFile> {
    Stager::default().stage(blob, extension)
}

/// Extension of an uploaded file name: everything after the last `.`.
pub fn extension_of(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}
