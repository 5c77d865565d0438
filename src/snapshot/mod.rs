use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

pub mod store;

/// Text persisted while the channel is offline
pub const OFFLINE_SNAPSHOT: &str = "{}";

/// The recorded subset of a live stream's metadata.
///
/// Field order here is the key order of the serialized snapshot, so reordering fields changes the
/// persisted text (and would register as a change on the next run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSnapshot {
    pub title: String,
    /// `None` when Helix reports `null` for an untagged stream; recorded as `null` as well
    pub tags: Option<Vec<String>>,
    pub viewer_count: u64,
    pub started_at: String,
    pub thumbnail_url: String,
}

impl StreamSnapshot {
    /// Time elapsed since the stream started, if `started_at` is a valid RFC 3339 timestamp.
    pub fn uptime(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        DateTime::parse_from_rfc3339(&self.started_at)
            .ok()
            .map(|started| now.signed_duration_since(started))
    }
}

/// What a single lookup saw for the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Offline,
    Live(StreamSnapshot),
}

impl Observation {
    /// Canonical text form: compact JSON for a live stream, `{}` when offline.
    pub fn to_text(&self) -> serde_json::Result<String> {
        match self {
            Observation::Offline => Ok(OFFLINE_SNAPSHOT.to_string()),
            Observation::Live(snapshot) => serde_json::to_string(snapshot),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Observation::Live(_))
    }
}
