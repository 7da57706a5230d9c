//! Counters kept over a watcher run.

use std::fmt;

use crate::action::ActionOutcome;

use super::TickOutcome;

/// Tallies of what the watcher saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Ticks fired by the timer, including skipped ones.
    pub ticks: u64,
    /// Ticks skipped because an action was still in flight.
    pub skipped: u64,
    /// Observations that failed.
    pub read_failures: u64,
    /// Detected changes (each one dispatches an action).
    pub changes: u64,
    /// Actions that produced a commit.
    pub commits: u64,
    /// Actions that found nothing staged.
    pub nothing_to_do: u64,
    /// Actions that failed while staging or committing.
    pub failed_actions: u64,
}

impl WatchStats {
    /// Count a tick's outcome.
    pub fn record_tick(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::ReadFailed(_) => self.read_failures += 1,
            TickOutcome::Changed { .. } => self.changes += 1,
            TickOutcome::BaselineRecorded(_) | TickOutcome::Unchanged => {}
        }
    }

    /// Count a finished action.
    pub fn record_action(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Committed { .. } => self.commits += 1,
            ActionOutcome::NothingToDo => self.nothing_to_do += 1,
            ActionOutcome::StageFailed(_) | ActionOutcome::CommitFailed(_) => {
                self.failed_actions += 1
            }
        }
    }

    /// Total number of actions that ran to an outcome.
    pub fn actions(&self) -> u64 {
        self.commits + self.nothing_to_do + self.failed_actions
    }
}

impl fmt::Display for WatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks ({} skipped, {} read failures), {} changes, {} commits, {} unchanged, {} failed",
            self.ticks,
            self.skipped,
            self.read_failures,
            self.changes,
            self.commits,
            self.nothing_to_do,
            self.failed_actions
        )
    }
}
