//! Modification-time source abstraction.
//!
//! This module provides a trait-based abstraction for observing the last
//! modification time of the watched file, either straight from the filesystem
//! or pushed in from elsewhere (tests, editors, other watchers).

mod channel;
mod file;

pub use channel::{ChannelSource, Published};
pub use file::FileSource;

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use thiserror::Error;

/// Errors produced while observing a modification time.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file's metadata could not be read (missing, unreadable, ...).
    #[error("failed to read metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The platform does not report modification times for this file.
    #[error("modification time unavailable for {}: {source}", path.display())]
    Unsupported {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No timestamp has been published yet, or the publisher reported a failure.
    #[error("no modification time available: {0}")]
    Unavailable(String),
}

/// Trait for observing the watched file's modification time.
///
/// Implementations must not block for long; the watcher calls
/// [`observe`](MtimeSource::observe) once per tick.
///
/// # Example
///
/// ```
/// use docwatch::{FileSource, MtimeSource};
///
/// let mut source = FileSource::new("CLAUDE.md");
/// match source.observe() {
///     Ok(modified) => println!("last modified at {:?}", modified),
///     Err(e) => println!("not readable yet: {}", e),
/// }
/// ```
pub trait MtimeSource: Send + Debug {
    /// Read the current modification time.
    fn observe(&mut self) -> Result<SystemTime, SourceError>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}
