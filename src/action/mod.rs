//! The stage-and-commit action run on every detected change.
//!
//! The action talks to version control through the [`VersionControl`] trait,
//! so the loop can be exercised without a real git binary. [`GitCli`] is the
//! production implementation.

mod git;
mod message;

pub use git::GitCli;
pub use message::{commit_timestamp, MessageTemplate, DEFAULT_BODY, DEFAULT_TRAILER};

use std::fmt::Debug;
use std::io;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from running a version-control command.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The command could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("`{command}` exited with {}: {detail}", exit_status(.code))]
    Exit {
        command: String,
        code: Option<i32>,
        detail: String,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

/// Version-control operations needed by the action, scoped to the watched file.
#[async_trait]
pub trait VersionControl: Send + Sync + Debug {
    /// Stage the watched file.
    async fn stage(&self) -> Result<(), VcsError>;

    /// Returns true if the index holds a change to the watched file.
    async fn has_staged_changes(&self) -> Result<bool, VcsError>;

    /// Commit the watched file with `message`. Returns the tool's summary line.
    async fn commit(&self, message: &str) -> Result<String, VcsError>;

    /// Returns a human-readable description (program, repository, file).
    fn description(&self) -> &str;
}

/// How an action ended. Every outcome is terminal for its tick.
#[derive(Debug)]
pub enum ActionOutcome {
    /// A commit was created.
    Committed { summary: String },
    /// Staging succeeded but the file had no content change to commit.
    NothingToDo,
    /// Staging failed; the commit was not attempted.
    StageFailed(VcsError),
    /// The commit failed.
    CommitFailed(VcsError),
}

/// Stage the file and commit it with `message`.
///
/// If staging fails the commit is never attempted. If the staged-changes
/// check itself fails, the commit is attempted anyway and its own result
/// decides the outcome.
pub async fn perform(vcs: &dyn VersionControl, message: &str) -> ActionOutcome {
    if let Err(e) = vcs.stage().await {
        return ActionOutcome::StageFailed(e);
    }

    match vcs.has_staged_changes().await {
        Ok(false) => return ActionOutcome::NothingToDo,
        Ok(true) => {}
        Err(e) => tracing::debug!("Could not inspect the index, committing anyway: {}", e),
    }

    match vcs.commit(message).await {
        Ok(summary) => ActionOutcome::Committed { summary },
        Err(e) => ActionOutcome::CommitFailed(e),
    }
}
