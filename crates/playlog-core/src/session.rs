//! Play sessions: contiguous windows of activity on the timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::types::{ClientIdentity, SetScope};

/// How a session came to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionKind {
    /// Built from session telemetry. Never split or widened by attachment.
    Recorded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client: Option<ClientIdentity>,
    },
    /// Synthesized from unlock evidence when no telemetry covered it.
    Reconstructed,
    /// Groups unlocks recorded by someone other than the player.
    ManualUnlock,
}

impl SessionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded { .. } => "recorded",
            Self::Reconstructed => "reconstructed",
            Self::ManualUnlock => "manual_unlock",
        }
    }

    pub const fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    pub const fn is_reconstructed(&self) -> bool {
        matches!(self, Self::Reconstructed)
    }

    pub const fn is_manual_unlock(&self) -> bool {
        matches!(self, Self::ManualUnlock)
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of session that attachment may synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedKind {
    #[default]
    Reconstructed,
    ManualUnlock,
}

impl GeneratedKind {
    #[must_use]
    pub const fn session_kind(self) -> SessionKind {
        match self {
            Self::Reconstructed => SessionKind::Reconstructed,
            Self::ManualUnlock => SessionKind::ManualUnlock,
        }
    }

    pub fn matches(self, kind: &SessionKind) -> bool {
        match self {
            Self::Reconstructed => kind.is_reconstructed(),
            Self::ManualUnlock => kind.is_manual_unlock(),
        }
    }
}

/// A contiguous window of play activity.
///
/// `duration_secs` is tracked separately from `end_time - start_time`: recorded
/// sessions report whole minutes, so the two can disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub kind: SessionKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_secs: i64,
    /// Set only on synthesized sessions for subset games.
    #[serde(default)]
    pub scope: SetScope,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Session {
    /// Creates a zero-length synthesized session at `at`.
    pub fn generated(kind: GeneratedKind, at: DateTime<Utc>, scope: SetScope) -> Self {
        Self {
            kind: kind.session_kind(),
            start_time: at,
            end_time: at,
            duration_secs: 0,
            scope,
            events: Vec::new(),
        }
    }

    /// Returns the raw client identity of a recorded session.
    pub const fn client(&self) -> Option<&ClientIdentity> {
        match &self.kind {
            SessionKind::Recorded { client } => client.as_ref(),
            _ => None,
        }
    }

    /// Whether `at` falls inside `[start_time, end_time]`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at <= self.end_time
    }

    /// Widens the window to include `at` and recomputes the duration.
    ///
    /// Returns true if the start moved, which may break list ordering.
    pub fn widen_to(&mut self, at: DateTime<Utc>) -> bool {
        let mut start_moved = false;
        if at < self.start_time {
            self.start_time = at;
            start_moved = true;
        } else if at > self.end_time {
            self.end_time = at;
        }
        self.duration_secs = (self.end_time - self.start_time).num_seconds();
        start_moved
    }

    pub fn has_unlocks(&self) -> bool {
        self.events.iter().any(|e| e.as_unlock().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    #[test]
    fn test_generated_session_is_zero_length() {
        let session = Session::generated(GeneratedKind::ManualUnlock, ts(0), SetScope::Any);

        assert_eq!(session.kind, SessionKind::ManualUnlock);
        assert_eq!(session.start_time, session.end_time);
        assert_eq!(session.duration_secs, 0);
        assert!(session.contains(ts(0)));
        assert!(!session.contains(ts(1)));
    }

    #[test]
    fn test_widen_forward_and_backward() {
        let mut session = Session::generated(GeneratedKind::Reconstructed, ts(10), SetScope::Any);

        assert!(!session.widen_to(ts(25)));
        assert_eq!(session.end_time, ts(25));
        assert_eq!(session.duration_secs, 15 * 60);

        assert!(session.widen_to(ts(5)));
        assert_eq!(session.start_time, ts(5));
        assert_eq!(session.duration_secs, 20 * 60);
    }

    #[test]
    fn test_widen_inside_window_is_noop() {
        let mut session = Session::generated(GeneratedKind::Reconstructed, ts(0), SetScope::Any);
        session.widen_to(ts(30));

        assert!(!session.widen_to(ts(12)));
        assert_eq!(session.start_time, ts(0));
        assert_eq!(session.end_time, ts(30));
    }

    #[test]
    fn test_client_only_on_recorded() {
        let recorded = Session {
            kind: SessionKind::Recorded {
                client: Some(ClientIdentity::new("RetroArch/1.16.0").unwrap()),
            },
            start_time: ts(0),
            end_time: ts(5),
            duration_secs: 300,
            scope: SetScope::Any,
            events: Vec::new(),
        };
        assert_eq!(recorded.client().map(ClientIdentity::as_str), Some("RetroArch/1.16.0"));

        let generated = Session::generated(GeneratedKind::Reconstructed, ts(0), SetScope::Any);
        assert!(generated.client().is_none());
    }

    #[test]
    fn test_session_kind_serde_matches_as_str() {
        for kind in [
            SessionKind::Recorded { client: None },
            SessionKind::Reconstructed,
            SessionKind::ManualUnlock,
        ] {
            let value = serde_json::to_value(&kind).unwrap();
            assert_eq!(value["type"], kind.as_str());
        }
    }
}
