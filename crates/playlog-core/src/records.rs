//! Pre-fetched input records supplied by the data layer.
//!
//! The engine never queries storage itself; callers materialize these
//! collections up front and hand them over, one bundle per (user, game).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::AchievementDisplay;
use crate::session::GeneratedKind;
use crate::types::{AchievementId, AchievementSetId, ClientIdentity, GameId, SetScope, UnlockerName};

/// One row of session telemetry, as maintained by client heartbeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub started_at: DateTime<Utc>,
    /// Whole minutes; the client floors partial minutes.
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_presence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_presence_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub const fn new(started_at: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            started_at,
            duration_minutes,
            game_id: None,
            client: None,
            rich_presence: None,
            rich_presence_at: None,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: ClientIdentity) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn with_rich_presence(mut self, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.rich_presence = Some(message.into());
        self.rich_presence_at = Some(at);
        self
    }

    /// Computed end of the session before any refinement, or `None` when
    /// the duration does not fit the timestamp range.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        Duration::try_minutes(self.duration_minutes).and_then(|duration| self.started_at.checked_add_signed(duration))
    }
}

/// Coarse "last played at" timestamp kept per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlayedMarker {
    pub game_id: GameId,
    pub at: DateTime<Utc>,
}

/// A player's unlock state for one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub achievement_id: AchievementId,
    #[serde(default)]
    pub achievement_set: SetScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_hardcore_at: Option<DateTime<Utc>>,
    /// Account that recorded the unlock, when it was not the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocker: Option<UnlockerName>,
    #[serde(default)]
    pub achievement: AchievementDisplay,
}

impl UnlockRecord {
    /// A softcore-only unlock.
    pub fn softcore(achievement_id: AchievementId, at: DateTime<Utc>) -> Self {
        Self {
            achievement_id,
            achievement_set: SetScope::Any,
            unlocked_at: Some(at),
            unlocked_hardcore_at: None,
            unlocker: None,
            achievement: AchievementDisplay::default(),
        }
    }

    /// A hardcore unlock, which also satisfies softcore at the same instant.
    pub fn hardcore(achievement_id: AchievementId, at: DateTime<Utc>) -> Self {
        Self {
            unlocked_hardcore_at: Some(at),
            ..Self::softcore(achievement_id, at)
        }
    }

    #[must_use]
    pub fn in_set(mut self, set: AchievementSetId) -> Self {
        self.achievement_set = SetScope::Set(set);
        self
    }

    #[must_use]
    pub fn delegated_by(mut self, unlocker: UnlockerName) -> Self {
        self.unlocker = Some(unlocker);
        self
    }

    /// The earliest instant this record was unlocked at in any mode.
    pub fn earliest(&self) -> Option<DateTime<Utc>> {
        match (self.unlocked_at, self.unlocked_hardcore_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub const fn generated_kind(&self) -> GeneratedKind {
        if self.unlocker.is_some() {
            GeneratedKind::ManualUnlock
        } else {
            GeneratedKind::Reconstructed
        }
    }
}

/// An achievement set and the published achievements it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSet {
    pub id: AchievementSetId,
    /// When the set's achievements first went live, if already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements_published_at: Option<DateTime<Utc>>,
    /// Published achievements in the set.
    #[serde(default)]
    pub achievement_ids: Vec<AchievementId>,
}

impl AchievementSet {
    pub fn contains(&self, id: AchievementId) -> bool {
        self.achievement_ids.contains(&id)
    }

    pub fn published_achievements(&self) -> usize {
        self.achievement_ids.len()
    }
}

/// The player's recorded milestones for a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beaten_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beaten_hardcore_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_hardcore_at: Option<DateTime<Utc>>,
}

/// A caller-supplied marker injected into the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMarker {
    pub at: DateTime<Utc>,
    pub header: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: GeneratedKind,
}

/// Everything needed to reconstruct one player's activity on one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHistory {
    /// Free-form label for the player, used only in reports and logs.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub last_played: Vec<LastPlayedMarker>,
    #[serde(default)]
    pub unlocks: Vec<UnlockRecord>,
    /// Most recent progress reset that applies to this game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub achievement_sets: Vec<AchievementSet>,
    #[serde(default)]
    pub progress: PlayerProgress,
    #[serde(default)]
    pub markers: Vec<CustomMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    fn ach(id: u32) -> AchievementId {
        AchievementId::new(id).unwrap()
    }

    #[test]
    fn test_session_record_end() {
        let record = SessionRecord::new(ts(0), 30);
        assert_eq!(record.ended_at(), Some(ts(30)));
    }

    #[test]
    fn test_session_record_end_out_of_range() {
        assert_eq!(SessionRecord::new(ts(0), 9_000_000_000_000_000).ended_at(), None);
        assert_eq!(SessionRecord::new(ts(0), i64::MAX).ended_at(), None);
    }

    #[test]
    fn test_unlock_earliest() {
        let mut record = UnlockRecord::softcore(ach(1), ts(10));
        record.unlocked_hardcore_at = Some(ts(5));
        assert_eq!(record.earliest(), Some(ts(5)));

        record.unlocked_at = None;
        assert_eq!(record.earliest(), Some(ts(5)));

        record.unlocked_hardcore_at = None;
        assert_eq!(record.earliest(), None);
    }

    #[test]
    fn test_delegated_unlock_generates_manual_session() {
        let record = UnlockRecord::hardcore(ach(1), ts(0));
        assert_eq!(record.generated_kind(), GeneratedKind::Reconstructed);

        let record = record.delegated_by(UnlockerName::new("moderator").unwrap());
        assert_eq!(record.generated_kind(), GeneratedKind::ManualUnlock);
    }

    #[test]
    fn test_history_deserializes_with_defaults() {
        let json = r#"{
            "user": "player1",
            "unlocks": [
                {"achievement_id": 5, "achievement_set": 0, "unlocked_hardcore_at": "2024-03-02T12:00:00Z"}
            ]
        }"#;
        let history: ActivityHistory = serde_json::from_str(json).unwrap();

        assert_eq!(history.user, "player1");
        assert!(history.sessions.is_empty());
        assert_eq!(history.unlocks.len(), 1);
        assert_eq!(history.unlocks[0].achievement_set, SetScope::Any);
        assert_eq!(history.progress, PlayerProgress::default());
    }
}
