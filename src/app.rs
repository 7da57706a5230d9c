//! The watcher loop.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::action::{perform, ActionOutcome, MessageTemplate, VersionControl};
use crate::source::MtimeSource;
use crate::watch::interval::format_interval;
use crate::watch::{tick, TickOutcome, WatchState, WatchStats};

/// Push command suggested after each commit unless configured otherwise.
pub const DEFAULT_PUSH_HINT: &str = "git push origin main";

/// Tunables for a [`Watcher`].
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Time between ticks.
    pub interval: Duration,
    /// Commit message shape.
    pub template: MessageTemplate,
    /// Command to suggest after a successful commit; `None` to stay quiet.
    pub push_hint: Option<String>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            template: MessageTemplate::default(),
            push_hint: Some(DEFAULT_PUSH_HINT.to_string()),
        }
    }
}

/// Polls one file and commits it whenever its modification time changes.
///
/// At most one action runs at a time. While an action is in flight, ticks
/// are skipped without observing the file; the first tick after it finishes
/// compares against the baseline again, so a change made during a commit is
/// picked up once the commit is done.
pub struct Watcher {
    source: Box<dyn MtimeSource>,
    vcs: Arc<dyn VersionControl>,
    state: WatchState,
    file_name: String,
    options: WatchOptions,
    in_flight: bool,
    failures_in_row: u64,
    stats: WatchStats,
}

impl Watcher {
    /// Create a watcher for `path`, observed through `source` and committed through `vcs`.
    pub fn new<P: AsRef<Path>>(
        path: P,
        source: Box<dyn MtimeSource>,
        vcs: Arc<dyn VersionControl>,
        options: WatchOptions,
    ) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            source,
            vcs,
            state: WatchState::new(path),
            file_name,
            options,
            in_flight: false,
            failures_in_row: 0,
            stats: WatchStats::default(),
        }
    }

    /// Returns the current baseline state.
    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Returns the counters so far.
    pub fn stats(&self) -> &WatchStats {
        &self.stats
    }

    /// Returns how many reads in a row have failed; zero once the file is
    /// readable again.
    pub fn consecutive_read_failures(&self) -> u64 {
        self.failures_in_row
    }

    /// Returns true while an action is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Run until `shutdown` completes. The first tick happens immediately.
    pub async fn run<F>(&mut self, shutdown: F) -> WatchStats
    where
        F: Future<Output = ()>,
    {
        info!("Watching {} for changes", self.file_name);
        info!("Target file: {}", self.state.path().display());
        debug!(
            "Polling every {} via {}, committing via {}",
            format_interval(self.options.interval),
            self.source.description(),
            self.vcs.description()
        );

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut ticker = interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                Some(outcome) = done_rx.recv() => self.finish(outcome),
                _ = ticker.tick() => self.on_tick(&done_tx),
            }
        }

        if self.in_flight {
            warn!("Stopping while a commit is still running; it will complete on its own");
        }
        info!("Stopped watching {} ({})", self.file_name, self.stats);
        self.stats.clone()
    }

    fn on_tick(&mut self, done: &mpsc::UnboundedSender<ActionOutcome>) {
        self.stats.ticks += 1;
        if self.in_flight {
            self.stats.skipped += 1;
            debug!("Commit still running, skipping tick");
            return;
        }

        let observation = self.source.observe();
        let (state, outcome) = tick(std::mem::take(&mut self.state), observation);
        self.state = state;
        self.stats.record_tick(&outcome);

        if !matches!(outcome, TickOutcome::ReadFailed(_)) && self.failures_in_row > 0 {
            info!(
                "{} is readable again after {} failed checks",
                self.file_name, self.failures_in_row
            );
            self.failures_in_row = 0;
        }

        match outcome {
            TickOutcome::BaselineRecorded(_) => {
                info!("Initial state of {} recorded", self.file_name);
            }
            TickOutcome::Unchanged => {}
            TickOutcome::Changed { previous, current } => {
                info!("{} changed", self.file_name);
                debug!("Modification time moved from {:?} to {:?}", previous, current);
                self.dispatch(done.clone());
            }
            TickOutcome::ReadFailed(e) => {
                self.failures_in_row += 1;
                if self.failures_in_row == 1 {
                    error!("Error while checking {}: {}", self.file_name, e);
                } else {
                    warn!(
                        "Still unable to check {} ({} failures in a row): {}",
                        self.file_name, self.failures_in_row, e
                    );
                }
            }
        }
    }

    fn dispatch(&mut self, done: mpsc::UnboundedSender<ActionOutcome>) {
        let message = self.options.template.render(&self.file_name, Utc::now());
        let vcs = Arc::clone(&self.vcs);
        self.in_flight = true;

        tokio::spawn(async move {
            let outcome = perform(vcs.as_ref(), &message).await;
            // The receiver only goes away when the loop has stopped.
            let _ = done.send(outcome);
        });
    }

    fn finish(&mut self, outcome: ActionOutcome) {
        self.in_flight = false;
        self.stats.record_action(&outcome);

        match outcome {
            ActionOutcome::Committed { summary } => {
                info!("Auto-commit complete: {}", summary);
                if let Some(hint) = &self.options.push_hint {
                    info!("To publish it, run: {}", hint);
                }
            }
            ActionOutcome::NothingToDo => {
                info!("{} has no content changes, nothing to commit", self.file_name);
            }
            ActionOutcome::StageFailed(e) => {
                error!("Staging {} failed: {}", self.file_name, e);
            }
            ActionOutcome::CommitFailed(e) => {
                error!("Committing {} failed: {}", self.file_name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::{Call, ScriptedVcs};
    use crate::source::{ChannelSource, FileSource};
    use std::fs::File;
    use std::time::SystemTime;
    use tokio::time::sleep;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn watcher(source: Box<dyn MtimeSource>, vcs: &Arc<ScriptedVcs>) -> Watcher {
        let vcs: Arc<dyn VersionControl> = vcs.clone();
        Watcher::new("docs/CLAUDE.md", source, vcs, WatchOptions::default())
    }

    /// Publish `value` on the channel after `delay`.
    fn publish_later(
        tx: &Arc<tokio::sync::watch::Sender<crate::source::Published>>,
        delay: Duration,
        value: crate::source::Published,
    ) {
        let tx = Arc::clone(tx);
        tokio::spawn(async move {
            sleep(delay).await;
            tx.send(value).unwrap();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_change_never_commits() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let vcs = Arc::new(ScriptedVcs::default());
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(10_500))).await;

        assert_eq!(stats.ticks, 11);
        assert_eq!(stats.changes, 0);
        assert!(vcs.calls().is_empty());
        assert_eq!(watcher.state().baseline(), Some(at(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_change_commits_once() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let tx = Arc::new(tx);
        publish_later(&tx, Duration::from_millis(3_500), Ok(at(103)));
        let vcs = Arc::new(ScriptedVcs::default());
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(10_500))).await;

        assert_eq!(stats.changes, 1);
        assert_eq!(stats.commits, 1);
        assert_eq!(vcs.calls(), vec![Call::Stage, Call::Check, Call::Commit]);
        assert!(vcs.messages.lock().unwrap()[0].starts_with("Update CLAUDE.md - "));
        assert_eq!(watcher.state().baseline(), Some(at(103)));
        assert!(!watcher.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_failure_still_advances_baseline() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let tx = Arc::new(tx);
        publish_later(&tx, Duration::from_millis(1_500), Ok(at(101)));
        publish_later(&tx, Duration::from_millis(4_500), Ok(at(104)));
        let vcs = Arc::new(ScriptedVcs {
            fail_stage: true,
            ..Default::default()
        });
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(7_500))).await;

        // Each distinct change is attempted exactly once and never retried.
        assert_eq!(stats.changes, 2);
        assert_eq!(stats.failed_actions, 2);
        assert_eq!(vcs.count(Call::Stage), 2);
        assert_eq!(vcs.count(Call::Commit), 0);
        assert_eq!(watcher.state().baseline(), Some(at(104)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failures_keep_baseline() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let tx = Arc::new(tx);
        publish_later(&tx, Duration::from_millis(1_500), Err("removed".to_string()));
        publish_later(&tx, Duration::from_millis(4_500), Ok(at(100)));
        let vcs = Arc::new(ScriptedVcs::default());
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(6_500))).await;

        // Ticks at 2s, 3s and 4s fail; recovery with the old value is no change.
        assert_eq!(stats.read_failures, 3);
        assert_eq!(stats.changes, 0);
        assert!(vcs.calls().is_empty());
        assert_eq!(watcher.state().baseline(), Some(at(100)));
        assert_eq!(watcher.consecutive_read_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_read_failures_are_counted() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let tx = Arc::new(tx);
        publish_later(&tx, Duration::from_millis(1_500), Err("permission denied".to_string()));
        let vcs = Arc::new(ScriptedVcs::default());
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(8_500))).await;

        // Ticks at 2s through 8s all fail and the streak is never broken.
        assert_eq!(stats.read_failures, 7);
        assert_eq!(watcher.consecutive_read_failures(), 7);
        assert!(vcs.calls().is_empty());
        assert_eq!(watcher.state().baseline(), Some(at(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_never_overlap() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Ok(at(100))).unwrap();
        let tx = Arc::new(tx);
        publish_later(&tx, Duration::from_millis(1_500), Ok(at(101)));
        // Lands while the first commit (2s..4.5s) is still running.
        publish_later(&tx, Duration::from_millis(2_500), Ok(at(102)));
        let vcs = Arc::new(ScriptedVcs {
            commit_delay: Duration::from_millis(2_500),
            ..Default::default()
        });
        let mut watcher = watcher(Box::new(source), &vcs);

        let stats = watcher.run(sleep(Duration::from_millis(10_500))).await;

        // Commits run 2s..4.5s and 5s..7.5s; ticks 3, 4, 6 and 7 are skipped.
        assert_eq!(stats.changes, 2);
        assert_eq!(stats.commits, 2);
        assert_eq!(stats.skipped, 4);
        assert_eq!(
            vcs.calls(),
            vec![Call::Stage, Call::Check, Call::Commit, Call::Stage, Call::Check, Call::Commit]
        );
        assert_eq!(watcher.state().baseline(), Some(at(102)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewritten_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CLAUDE.md");
        std::fs::write(&path, "# Notes\n").unwrap();
        let m0 = std::fs::metadata(&path).unwrap().modified().unwrap();
        let m1 = m0 + Duration::from_secs(3);

        let rewrite = path.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(3_500)).await;
            std::fs::write(&rewrite, "# Notes\n\nMore.\n").unwrap();
            File::options().write(true).open(&rewrite).unwrap().set_modified(m1).unwrap();
        });

        let vcs = Arc::new(ScriptedVcs::default());
        let vcs_dyn: Arc<dyn VersionControl> = vcs.clone();
        let mut watcher =
            Watcher::new(&path, Box::new(FileSource::new(&path)), vcs_dyn, WatchOptions::default());

        let stats = watcher.run(sleep(Duration::from_millis(10_500))).await;

        assert_eq!(stats.changes, 1);
        assert_eq!(vcs.count(Call::Commit), 1);
        assert_eq!(watcher.state().baseline(), Some(m1));
    }
}
