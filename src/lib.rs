//! # docwatch
//!
//! Watch a single documentation file and commit it to git every time it
//! changes.
//!
//! The watcher polls the file's modification time on a fixed interval. The
//! first reading becomes the baseline; every later reading that differs from
//! the baseline advances it and triggers one stage-and-commit action.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Watcher (app)                       │
//! │  ┌─────────┐    ┌──────────────┐    ┌──────────────────────┐ │
//! │  │ source  │───▶│    watch     │───▶│        action        │ │
//! │  │ (mtime) │    │ (tick/state) │    │ (stage, commit, msg) │ │
//! │  └─────────┘    └──────────────┘    └──────────┬───────────┘ │
//! │       ▲                                        │             │
//! │  FileSource | ChannelSource             GitCli ▼             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Where modification times come from ([`MtimeSource`] trait)
//! - **[`watch`]**: The owned baseline and the pure [`tick`](watch::tick) transition
//! - **[`action`]**: The [`VersionControl`] seam, [`GitCli`], and [`ActionOutcome`]
//! - **[`app`]**: The timer loop that serializes actions ([`Watcher`])
//! - **[`config`]**: Layered settings for the CLI
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch ./CLAUDE.md, committing from its directory
//! docwatch
//!
//! # Watch another file every two seconds
//! docwatch --file docs/NOTES.md --interval 2s
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use docwatch::{FileSource, GitCli, WatchOptions, Watcher};
//!
//! # tokio_test::block_on(async {
//! let path = "docs/CLAUDE.md";
//! let mut watcher = Watcher::new(
//!     path,
//!     Box::new(FileSource::new(path)),
//!     Arc::new(GitCli::for_file("git", path)),
//!     WatchOptions::default(),
//! );
//! let stats = watcher.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! println!("{}", stats);
//! # });
//! ```

pub mod action;
pub mod app;
pub mod config;
pub mod logging;
pub mod source;
pub mod watch;

// Re-export main types for convenience
pub use action::{perform, ActionOutcome, GitCli, MessageTemplate, VcsError, VersionControl};
pub use app::{WatchOptions, Watcher};
pub use config::{Overrides, Settings};
pub use source::{ChannelSource, FileSource, MtimeSource, SourceError};
pub use watch::{tick, TickOutcome, WatchState, WatchStats};
