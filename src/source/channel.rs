//! Channel-based source.
//!
//! Receives modification times via a tokio watch channel. Useful when
//! something else already tracks the file (an editor plugin, another
//! watcher) and pushes timestamps rather than having them polled, and for
//! driving the watcher deterministically in tests.

use std::time::SystemTime;

use tokio::sync::watch;

use super::{MtimeSource, SourceError};

/// What a publisher last reported about the file.
pub type Published = Result<SystemTime, String>;

/// A source that returns whatever modification time was last published.
///
/// # Example
///
/// ```
/// use std::time::SystemTime;
/// use docwatch::{ChannelSource, MtimeSource};
///
/// let (tx, mut source) = ChannelSource::create("editor");
/// assert!(source.observe().is_err());
///
/// let now = SystemTime::now();
/// tx.send(Ok(now)).unwrap();
/// assert_eq!(source.observe().unwrap(), now);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Published>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where timestamps come from (e.g. "editor", "test")
    pub fn new(receiver: watch::Receiver<Published>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a channel pair. Nothing is published initially, so the first
    /// observations fail until the sender publishes a timestamp.
    pub fn create(source_description: &str) -> (watch::Sender<Published>, Self) {
        let (tx, rx) = watch::channel(Err("nothing published yet".to_string()));
        (tx, Self::new(rx, source_description))
    }
}

impl MtimeSource for ChannelSource {
    fn observe(&mut self) -> Result<SystemTime, SourceError> {
        let published = (*self.receiver.borrow_and_update()).clone();
        published.map_err(SourceError::Unavailable)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
