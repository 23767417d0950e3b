//! dugout - Follow any MLB game as live play-by-play in your terminal.
//!
//! The crate polls the MLB Stats API live feed, diffs each snapshot against
//! the remembered stream state, and renders only what changed: new at-bats,
//! corrections to already-shown plays, new pitches, and inning transitions.

// Core modules
pub mod config;
pub mod error;
pub mod feed;

// Network access
pub mod client;
pub mod schedule;

// Diff + presentation
pub mod diff;
pub mod render;
pub mod stream;

// CLI surface
pub mod cli;
pub mod ui;

// Re-export main types for convenience
pub use client::{Backoff, FeedSource, GameFeed, PollOutcome, StatsApiClient};
pub use diff::{diff, Diff, DiffOptions, PitchRange, StreamState};
pub use error::{DugoutError, Result};
pub use feed::{Bases, Phase, PlayRecord, Snapshot};
pub use render::{Style, Zone};
pub use stream::{dump_game, stream, StreamOptions};
