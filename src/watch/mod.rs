//! Change detection for the watched file.
//!
//! ## Submodules
//!
//! - [`interval`]: Parsing and formatting of polling intervals (e.g. "1s", "500ms")
//! - [`state`]: The owned baseline ([`WatchState`]) and the pure [`tick`] transition
//! - [`stats`]: Run counters ([`WatchStats`]) reported on shutdown
//!
//! ## Tick flow
//!
//! ```text
//! MtimeSource::observe()
//!        │
//!        ▼
//! tick(state, observation) ──▶ (next state, TickOutcome)
//!        │
//!        └──▶ TickOutcome::Changed ──▶ action::perform()
//! ```

pub mod interval;
pub mod state;
pub mod stats;

pub use state::{tick, TickOutcome, WatchState};
pub use stats::WatchStats;
