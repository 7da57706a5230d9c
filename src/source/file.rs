//! Filesystem-backed source.
//!
//! Stats the watched file on every observation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{MtimeSource, SourceError};

/// A source that reads the modification time straight from the filesystem.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_modified(&self) -> Result<SystemTime, SourceError> {
        let metadata = fs::metadata(&self.path).map_err(|source| SourceError::Metadata {
            path: self.path.clone(),
            source,
        })?;
        metadata.modified().map_err(|source| SourceError::Unsupported {
            path: self.path.clone(),
            source,
        })
    }
}

impl MtimeSource for FileSource {
    fn observe(&mut self) -> Result<SystemTime, SourceError> {
        self.read_modified()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
