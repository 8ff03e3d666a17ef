//! Core engine for reconstructing a player's game activity.
//!
//! This crate turns pre-fetched history for one (player, game) pair into an
//! ordered timeline of play sessions and derives metrics from it:
//! - Timeline: recorded sessions from telemetry, unlocks and markers attached
//!   to them, and reconstructed sessions synthesized where telemetry is missing
//! - Summary: totals and the per-session adjustment for reconstructed play
//! - Playtime: bounded play time per unlock mode, time to beat and complete
//!   achievement sets
//! - Clients: play time per decoded emulator client
//!
//! The engine performs no I/O. Collaborators that would (publish-time
//! resolution, client decoding) are passed in as traits.

mod attach;
pub mod client;
pub mod error;
pub mod event;
pub mod metrics;
mod ordering;
mod playtime;
pub mod records;
pub mod report;
pub mod session;
pub mod summary;
pub mod timeline;
pub mod types;

pub use client::{ClientDecoder, ClientLabel, ClientUsage, UserAgentDecoder};
pub use error::{ActivityError, BoxError, Result};
pub use event::{AchievementDisplay, Event, EventKind, Unlock};
pub use metrics::{AchievementSetMetrics, BeatProgressMetrics, OncePerSet, PublishedAtResolver};
pub use ordering::{compare_events, order_events};
pub use records::{
    AchievementSet, ActivityHistory, CustomMarker, LastPlayedMarker, PlayerProgress, SessionRecord,
    UnlockRecord,
};
pub use report::{ActivityReport, build_report, build_reports};
pub use session::{GeneratedKind, Session, SessionKind};
pub use summary::ActivitySummary;
pub use timeline::{Timeline, TimelineBuilder, TimelineConfig};
pub use types::{
    AchievementId, AchievementSetId, ClientIdentity, GameId, SetScope, UnlockMode, UnlockerName,
    ValidationError,
};
