//! Point-in-time occurrences within a play session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AchievementId, UnlockerName};

/// Something that happened at a single instant inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// When the event occurred.
    pub at: DateTime<Utc>,
    /// What happened.
    pub kind: EventKind,
}

/// The kinds of event a session can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// An achievement was unlocked.
    Unlock(Unlock),
    /// The last rich presence message reported by the client.
    RichPresence {
        /// Free-text description of what the player was doing.
        message: String,
    },
    /// A caller-supplied marker, e.g. a progress reset.
    Custom { header: String, description: String },
}

/// A single achievement unlock.
///
/// An achievement earned in softcore and later re-earned in hardcore yields
/// two of these, one per timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unlock {
    pub achievement_id: AchievementId,
    pub hardcore: bool,
    /// Softcore unlock that precedes a hardcore unlock of the same achievement.
    #[serde(default)]
    pub hardcore_later: bool,
    /// Set when someone other than the player recorded the unlock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocker: Option<UnlockerName>,
    /// Display fields cached for rendering.
    #[serde(default)]
    pub achievement: AchievementDisplay,
}

/// Achievement fields carried along for downstream rendering only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDisplay {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_name: Option<String>,
}

impl Event {
    /// Creates an unlock event.
    pub const fn unlock(at: DateTime<Utc>, unlock: Unlock) -> Self {
        Self {
            at,
            kind: EventKind::Unlock(unlock),
        }
    }

    /// Creates a rich presence snapshot.
    pub fn rich_presence(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            at,
            kind: EventKind::RichPresence {
                message: message.into(),
            },
        }
    }

    /// Creates a custom marker event.
    pub fn custom(
        at: DateTime<Utc>,
        header: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            at,
            kind: EventKind::Custom {
                header: header.into(),
                description: description.into(),
            },
        }
    }

    /// Returns the unlock payload if this is an unlock event.
    pub const fn as_unlock(&self) -> Option<&Unlock> {
        match &self.kind {
            EventKind::Unlock(unlock) => Some(unlock),
            _ => None,
        }
    }

    /// Returns the achievement this event refers to, if any.
    pub fn achievement_id(&self) -> Option<AchievementId> {
        self.as_unlock().map(|u| u.achievement_id)
    }

    pub const fn is_rich_presence(&self) -> bool {
        matches!(self.kind, EventKind::RichPresence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::unlock(
            Utc::now(),
            Unlock {
                achievement_id: AchievementId::new(7).unwrap(),
                hardcore: true,
                hardcore_later: false,
                unlocker: None,
                achievement: AchievementDisplay {
                    title: "First Blood".into(),
                    points: 5,
                    ..AchievementDisplay::default()
                },
            },
        );

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, event);
    }

    #[test]
    fn event_kind_is_internally_tagged() {
        let event = Event::rich_presence(Utc::now(), "Exploring World 1-2");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["kind"]["type"], "rich_presence");
        assert_eq!(value["kind"]["message"], "Exploring World 1-2");
    }

    #[test]
    fn event_rejects_zero_achievement_id() {
        let json = r#"{
            "at": "2024-01-01T00:00:00Z",
            "kind": {"type": "unlock", "achievement_id": 0, "hardcore": true}
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn achievement_id_only_on_unlocks() {
        let at = Utc::now();
        assert_eq!(Event::custom(at, "Reset", "All progress").achievement_id(), None);
        assert!(Event::rich_presence(at, "Title screen").is_rich_presence());
    }
}
