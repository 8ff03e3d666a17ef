//! Error types for playlog-core.
//!
//! Timeline construction and metrics never fail on their own; missing or
//! inconsistent data degrades to shorter sessions and empty metrics. The only
//! failures surfaced here come from caller-supplied collaborators.

use thiserror::Error;

use crate::types::AchievementSetId;

/// Boxed error returned by a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while deriving metrics from a timeline.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The published-time resolver failed for an achievement set.
    #[error("failed to resolve publish time for achievement set {set_id}")]
    PublishedAt {
        set_id: AchievementSetId,
        #[source]
        source: BoxError,
    },

    /// The client decoder rejected a raw identity string.
    #[error("failed to decode client identity {identity:?}")]
    ClientDecode {
        identity: String,
        #[source]
        source: BoxError,
    },
}

/// Result type alias for playlog-core.
pub type Result<T> = std::result::Result<T, ActivityError>;
