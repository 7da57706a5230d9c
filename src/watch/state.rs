//! Baseline tracking for a single watched file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::source::SourceError;

/// The watched file and the last modification time recorded as already seen.
///
/// The state is owned by whoever drives the loop and is passed into (and
/// returned from) [`tick`], so the transition can be exercised without a
/// timer, a filesystem, or git.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    path: PathBuf,
    baseline: Option<SystemTime>,
}

impl WatchState {
    /// Fresh state with an unknown baseline.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            baseline: None,
        }
    }

    /// Returns the watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the recorded baseline, or `None` before the first successful read.
    pub fn baseline(&self) -> Option<SystemTime> {
        self.baseline
    }
}

/// What a single tick decided.
#[derive(Debug)]
pub enum TickOutcome {
    /// First successful read; the timestamp became the baseline.
    BaselineRecorded(SystemTime),
    /// The timestamp matches the baseline.
    Unchanged,
    /// The timestamp differs from the baseline. The action should run once.
    Changed {
        previous: SystemTime,
        current: SystemTime,
    },
    /// The timestamp could not be read. The baseline is untouched.
    ReadFailed(SourceError),
}

impl TickOutcome {
    /// Returns true if this outcome should trigger the action.
    pub fn is_change(&self) -> bool {
        matches!(self, TickOutcome::Changed { .. })
    }
}

/// Advance `state` with one observation.
///
/// Any difference from the baseline counts as a change, including a
/// timestamp that moved backwards (restored from a backup, `git checkout` of
/// an older revision, clock adjustments).
pub fn tick(
    mut state: WatchState,
    observation: Result<SystemTime, SourceError>,
) -> (WatchState, TickOutcome) {
    let current = match observation {
        Ok(current) => current,
        Err(e) => return (state, TickOutcome::ReadFailed(e)),
    };

    let outcome = match state.baseline {
        None => TickOutcome::BaselineRecorded(current),
        Some(previous) if previous == current => return (state, TickOutcome::Unchanged),
        Some(previous) => TickOutcome::Changed { previous, current },
    };

    state.baseline = Some(current);
    (state, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn missing() -> Result<SystemTime, SourceError> {
        Err(SourceError::Unavailable("gone".to_string()))
    }

    #[test]
    fn test_first_read_records_baseline_without_change() {
        let (state, outcome) = tick(WatchState::new("CLAUDE.md"), Ok(at(100)));

        assert!(matches!(outcome, TickOutcome::BaselineRecorded(t) if t == at(100)));
        assert!(!outcome.is_change());
        assert_eq!(state.baseline(), Some(at(100)));
        assert_eq!(state.path(), Path::new("CLAUDE.md"));
    }

    #[test]
    fn test_first_read_never_changes_even_for_epoch() {
        let (_, outcome) = tick(WatchState::new("f"), Ok(SystemTime::UNIX_EPOCH));
        assert!(!outcome.is_change());
    }

    #[test]
    fn test_unchanged_timestamp_never_fires() {
        let mut state = WatchState::new("f");
        let mut changes = 0;
        for _ in 0..50 {
            let (next, outcome) = tick(state, Ok(at(100)));
            state = next;
            if outcome.is_change() {
                changes += 1;
            }
        }
        assert_eq!(changes, 0);
        assert_eq!(state.baseline(), Some(at(100)));
    }

    #[test]
    fn test_single_change_fires_once_and_advances_baseline() {
        let (state, _) = tick(WatchState::new("f"), Ok(at(100)));
        let (state, outcome) = tick(state, Ok(at(103)));

        match outcome {
            TickOutcome::Changed { previous, current } => {
                assert_eq!(previous, at(100));
                assert_eq!(current, at(103));
            }
            other => panic!("expected change, got {:?}", other),
        }
        assert_eq!(state.baseline(), Some(at(103)));

        let (state, outcome) = tick(state, Ok(at(103)));
        assert!(matches!(outcome, TickOutcome::Unchanged));
        assert_eq!(state.baseline(), Some(at(103)));
    }

    #[test]
    fn test_backwards_timestamp_is_a_change() {
        let (state, _) = tick(WatchState::new("f"), Ok(at(200)));
        let (state, outcome) = tick(state, Ok(at(150)));
        assert!(outcome.is_change());
        assert_eq!(state.baseline(), Some(at(150)));
    }

    #[test]
    fn test_read_failure_leaves_baseline_untouched() {
        let (state, _) = tick(WatchState::new("f"), Ok(at(100)));
        let (state, outcome) = tick(state, missing());

        assert!(matches!(outcome, TickOutcome::ReadFailed(_)));
        assert_eq!(state.baseline(), Some(at(100)));

        // Recovery with the same timestamp is not a change.
        let (state, outcome) = tick(state, Ok(at(100)));
        assert!(matches!(outcome, TickOutcome::Unchanged));
        assert_eq!(state.baseline(), Some(at(100)));
    }

    #[test]
    fn test_read_failure_before_baseline_keeps_it_unknown() {
        let (state, outcome) = tick(WatchState::new("f"), missing());
        assert!(matches!(outcome, TickOutcome::ReadFailed(_)));
        assert_eq!(state.baseline(), None);

        // The first successful read after failures is still only a baseline.
        let (state, outcome) = tick(state, Ok(at(5)));
        assert!(matches!(outcome, TickOutcome::BaselineRecorded(_)));
        assert_eq!(state.baseline(), Some(at(5)));
    }
}
