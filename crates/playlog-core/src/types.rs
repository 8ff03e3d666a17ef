//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The provided identifier was zero.
    #[error("{field} must be non-zero")]
    Zero { field: &'static str },

    /// Invalid unlock mode value.
    #[error("invalid unlock mode: {value}")]
    InvalidUnlockMode { value: String },
}

/// Which unlock tier a playtime calculation is performed for.
///
/// Hardcore is strictly more restrictive: a hardcore unlock always satisfies
/// the softcore condition as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockMode {
    Softcore,
    Hardcore,
}

impl UnlockMode {
    /// String representation used in reports and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Softcore => "softcore",
            Self::Hardcore => "hardcore",
        }
    }
}

impl fmt::Display for UnlockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UnlockMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "softcore" => Ok(Self::Softcore),
            "hardcore" => Ok(Self::Hardcore),
            _ => Err(ValidationError::InvalidUnlockMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated non-zero numeric ID newtype with common trait implementations.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub struct $name(u32);

        impl $name {
            /// Creates a new ID after validation.
            pub const fn new(id: u32) -> Result<Self, ValidationError> {
                if id == 0 {
                    return Err(ValidationError::Zero { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the raw numeric value.
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ValidationError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_numeric_id!(
    /// A validated achievement identifier.
    AchievementId, "achievement ID"
);

define_numeric_id!(
    /// A validated achievement set identifier.
    ///
    /// Zero is reserved on the wire to mean "no particular set"; see
    /// [`SetScope`].
    AchievementSetId, "achievement set ID"
);

define_numeric_id!(
    /// A validated game identifier.
    GameId, "game ID"
);

/// The achievement set a session or unlock is tied to.
///
/// Subset games can have several sets in play at once, and sessions for
/// different sets may overlap. `Any` matches every set when merging; on the
/// wire it is encoded as set id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum SetScope {
    #[default]
    Any,
    Set(AchievementSetId),
}

impl SetScope {
    /// Whether a session in scope `self` may absorb an event in scope `other`.
    #[must_use]
    pub fn accepts(self, other: Self) -> bool {
        match (self, other) {
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::Set(a), Self::Set(b)) => a == b,
        }
    }

    /// Returns the set id, if this scope names one.
    #[must_use]
    pub const fn set_id(self) -> Option<AchievementSetId> {
        match self {
            Self::Any => None,
            Self::Set(id) => Some(id),
        }
    }
}

impl From<u32> for SetScope {
    fn from(value: u32) -> Self {
        AchievementSetId::new(value).map_or(Self::Any, Self::Set)
    }
}

impl From<SetScope> for u32 {
    fn from(scope: SetScope) -> Self {
        scope.set_id().map_or(0, AchievementSetId::get)
    }
}

impl From<AchievementSetId> for SetScope {
    fn from(id: AchievementSetId) -> Self {
        Self::Set(id)
    }
}

/// Generates a validated string newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// The raw client identity string (user agent) reported with a session.
    ClientIdentity, "client identity"
);

define_string_id!(
    /// The account that recorded an unlock on the player's behalf.
    ///
    /// Present only on delegated (manual) unlocks.
    UnlockerName, "unlocker name"
);
