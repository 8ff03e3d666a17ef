//! Play time per emulator client.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ActivityError, BoxError, Result};
use crate::timeline::Timeline;

/// A normalized client label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClientLabel {
    pub client: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Emulation core or build flavour, when the client reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

impl ClientLabel {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            version: None,
            variation: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self
    }
}

impl fmt::Display for ClientLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.client)?;
        if let Some(version) = &self.version {
            write!(f, " {version}")?;
        }
        if let Some(variation) = &self.variation {
            write!(f, " ({variation})")?;
        }
        Ok(())
    }
}

/// Turns a raw client identity (usually a user agent) into a label.
pub trait ClientDecoder {
    fn decode(&self, identity: &str) -> std::result::Result<ClientLabel, BoxError>;
}

impl<F> ClientDecoder for F
where
    F: Fn(&str) -> std::result::Result<ClientLabel, BoxError>,
{
    fn decode(&self, identity: &str) -> std::result::Result<ClientLabel, BoxError> {
        self(identity)
    }
}

/// Matches `Client/Version (Platform) core_libretro/Version`, where the
/// platform and core parts are optional.
static USER_AGENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<client>[^/\s]+)/(?P<version>[^\s(]+)(?:\s*\([^)]*\))?(?:\s+(?P<core>\S+?)_libretro/)?")
        .unwrap()
});

const UNKNOWN_CLIENT: &str = "Unknown";

/// Default decoder for emulator user agents.
///
/// Identities that do not look like a user agent are kept whole as the
/// client name. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAgentDecoder;

impl ClientDecoder for UserAgentDecoder {
    fn decode(&self, identity: &str) -> std::result::Result<ClientLabel, BoxError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Ok(ClientLabel::new(UNKNOWN_CLIENT));
        }

        let Some(caps) = USER_AGENT_RE.captures(identity) else {
            return Ok(ClientLabel::new(identity));
        };

        let mut label = ClientLabel::new(&caps["client"]).with_version(&caps["version"]);
        if let Some(core) = caps.name("core") {
            label = label.with_variation(core.as_str());
        }
        Ok(label)
    }
}

/// Play time attributed to one client label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUsage {
    pub label: ClientLabel,
    /// Seconds.
    pub duration: i64,
    /// Raw identities that decoded to this label, sorted.
    pub agents: Vec<String>,
    /// Share of all decoded duration, rounded to one decimal place.
    pub duration_percentage: f64,
}

#[derive(Default)]
struct Usage {
    duration: i64,
    agents: BTreeSet<String>,
}

impl Timeline {
    /// Aggregates recorded session time per decoded client.
    ///
    /// Only recorded sessions that carry a client identity contribute.
    /// Entries are sorted by descending duration, then by label.
    pub fn client_breakdown<D: ClientDecoder + ?Sized>(&self, decoder: &D) -> Result<Vec<ClientUsage>> {
        let mut usage: BTreeMap<ClientLabel, Usage> = BTreeMap::new();
        let mut total = 0i64;

        for session in self.sessions() {
            let Some(identity) = session.client() else {
                continue;
            };
            let label = decoder
                .decode(identity.as_str())
                .map_err(|source| ActivityError::ClientDecode {
                    identity: identity.to_string(),
                    source,
                })?;

            let entry = usage.entry(label).or_default();
            entry.duration += session.duration_secs;
            entry.agents.insert(identity.to_string());
            total += session.duration_secs;
        }

        let mut breakdown: Vec<ClientUsage> = usage
            .into_iter()
            .map(|(label, usage)| ClientUsage {
                label,
                duration: usage.duration,
                agents: usage.agents.into_iter().collect(),
                duration_percentage: percentage(usage.duration, total),
            })
            .collect();
        breakdown.sort_by(|a, b| b.duration.cmp(&a.duration).then_with(|| a.label.cmp(&b.label)));

        tracing::debug!(clients = breakdown.len(), total, "computed client breakdown");
        Ok(breakdown)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}
