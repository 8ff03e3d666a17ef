//! Session timeline construction.
//!
//! Builds the ordered list of play sessions for one player on one game (or
//! game plus subsets) from heterogeneous signals.
//!
//! # Algorithm Summary
//!
//! 1. Turn session telemetry rows into recorded sessions, widening each to
//!    cover its rich presence snapshot and snapping its end to a nearby
//!    "last played" marker
//! 2. Attach unlocks and custom markers, synthesizing sessions where no
//!    recorded session covers them (see [`crate::attach`])
//! 3. Order each session's events deterministically (see [`crate::ordering`])
//!
//! The builder owns a mutable session list while attaching; [`TimelineBuilder::build`]
//! freezes it into an immutable [`Timeline`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::ordering::order_events;
use crate::records::{ActivityHistory, LastPlayedMarker, SessionRecord};
use crate::session::{GeneratedKind, Session, SessionKind};
use crate::types::{GameId, SetScope};

/// Configuration for timeline construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// How far outside a reconstructed session an unlock may fall and still
    /// be merged into it. Default: 14400 (4 hours).
    pub reconstructed_merge_window_secs: i64,

    /// Same as above for sessions grouping delegated unlocks.
    /// Default: 3600 (1 hour).
    pub manual_unlock_merge_window_secs: i64,

    /// A recorded session whose end lies within this distance of a
    /// "last played" marker has its end snapped to the marker.
    /// Default: 300 (5 minutes).
    pub last_played_tolerance_secs: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            reconstructed_merge_window_secs: 4 * 60 * 60,
            manual_unlock_merge_window_secs: 60 * 60,
            last_played_tolerance_secs: 5 * 60,
        }
    }
}

impl TimelineConfig {
    /// Merge tolerance for a synthesized session kind.
    pub fn merge_window(&self, kind: GeneratedKind) -> Duration {
        let secs = match kind {
            GeneratedKind::Reconstructed => self.reconstructed_merge_window_secs,
            GeneratedKind::ManualUnlock => self.manual_unlock_merge_window_secs,
        };
        Duration::seconds(secs)
    }
}

/// Mutable session arena used while the timeline is assembled.
///
/// Sessions are kept sorted ascending by start time after every operation.
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    pub(crate) config: TimelineConfig,
    pub(crate) sessions: Vec<Session>,
}

impl TimelineBuilder {
    pub const fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            sessions: Vec::new(),
        }
    }

    /// Current sessions, sorted by start time.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Adds recorded sessions built from telemetry rows.
    ///
    /// `markers` refine session ends only; a marker matching no session is
    /// ignored rather than turned into a session.
    pub fn add_recorded_sessions(&mut self, records: &[SessionRecord], markers: &[LastPlayedMarker]) {
        let mut built: Vec<(Option<GameId>, Session)> = records
            .iter()
            .map(|record| (record.game_id, recorded_session(record)))
            .collect();

        let tolerance = Duration::seconds(self.config.last_played_tolerance_secs);
        for marker in markers {
            snap_to_marker(&mut built, marker, tolerance);
        }

        self.sessions.extend(built.into_iter().map(|(_, session)| session));
        self.sessions.sort_by_key(|s| s.start_time);
    }

    /// Freezes the builder, ordering every session's events.
    pub fn build(mut self) -> Timeline {
        for session in &mut self.sessions {
            order_events(&mut session.events);
        }
        debug_assert!(
            self.sessions
                .windows(2)
                .all(|pair| pair[0].start_time <= pair[1].start_time),
            "sessions must stay sorted by start time"
        );
        Timeline {
            sessions: self.sessions,
        }
    }
}

/// Builds one recorded session from a telemetry row.
fn recorded_session(record: &SessionRecord) -> Session {
    let start_time = record.started_at;
    let end_time = match record.ended_at() {
        _ if record.duration_minutes < 0 => {
            tracing::warn!(
                started_at = %record.started_at,
                duration_minutes = record.duration_minutes,
                "clamping negative session duration"
            );
            start_time
        }
        Some(end_time) => end_time,
        None => {
            tracing::warn!(
                started_at = %record.started_at,
                duration_minutes = record.duration_minutes,
                "session duration out of range, treating as zero-length"
            );
            start_time
        }
    };

    let mut session = Session {
        kind: SessionKind::Recorded {
            client: record.client.clone(),
        },
        start_time,
        end_time,
        duration_secs: (end_time - start_time).num_seconds(),
        scope: SetScope::Any,
        events: Vec::new(),
    };

    if let Some(message) = &record.rich_presence {
        let at = record.rich_presence_at.unwrap_or(session.end_time);
        // Durations are floored to whole minutes, so the snapshot can land
        // slightly past the computed end.
        if at > session.end_time {
            session.end_time = at;
            session.duration_secs = (session.end_time - session.start_time).num_seconds();
        }
        session.events.push(Event::rich_presence(at, message.clone()));
    }

    session
}

/// Snaps the end of the first session near `marker` onto the marker.
fn snap_to_marker(
    sessions: &mut [(Option<GameId>, Session)],
    marker: &LastPlayedMarker,
    tolerance: Duration,
) {
    let candidate = sessions.iter_mut().find(|(game_id, session)| {
        game_id.is_none_or(|id| id == marker.game_id)
            && marker.at >= session.start_time
            && (session.end_time - marker.at).abs() <= tolerance
    });

    if let Some((_, session)) = candidate {
        tracing::trace!(
            game_id = %marker.game_id,
            from = %session.end_time,
            to = %marker.at,
            "snapping session end to last played marker"
        );
        session.end_time = marker.at;
    }
}

/// An immutable, ordered timeline of play sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    sessions: Vec<Session>,
}

impl Timeline {
    /// Reconstructs the timeline for a single pre-fetched history.
    pub fn from_history(history: &ActivityHistory, config: &TimelineConfig) -> Self {
        let mut builder = TimelineBuilder::new(config.clone());
        builder.add_recorded_sessions(&history.sessions, &history.last_played);
        builder.attach_unlocks(&history.unlocks);
        for marker in &history.markers {
            builder.add_custom_event(
                marker.at,
                marker.header.clone(),
                marker.description.clone(),
                marker.kind,
            );
        }

        let timeline = builder.build();
        tracing::debug!(
            user = %history.user,
            sessions = timeline.sessions.len(),
            "reconstructed activity timeline"
        );
        timeline
    }

    /// Wraps already-built sessions, e.g. a previously cached timeline.
    ///
    /// Sessions are re-sorted and their events re-ordered.
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        let mut sessions = sessions;
        sessions.sort_by_key(|s| s.start_time);
        for session in &mut sessions {
            order_events(&mut session.events);
        }
        Self { sessions }
    }

    /// All sessions, sorted ascending by start time.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Latest end among sessions that reflect the player's own activity.
    pub fn last_played_at(&self) -> Option<DateTime<Utc>> {
        self.sessions
            .iter()
            .filter(|s| !s.kind.is_manual_unlock())
            .map(|s| s.end_time)
            .max()
    }
}
