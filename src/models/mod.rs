//! Data models module
//!
//! Defines core data structures:
//! - MediaChannel: a notification channel ("media type") as reported remotely
//! - MediaWatchState: since when each tracked channel has been disabled
//! - UserGroup / GroupSnapshot: last observed user group membership
//! - SnapshotMode: one-shot baseline bootstrap for group drift detection
//! - WatchError: error taxonomy shared by every collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{btree_map, BTreeMap, BTreeSet};


/// Enabled flag of a media channel.
///
/// The platform encodes it as `"0"` (enabled) and `"1"` (disabled). Anything
/// that is not `"1"` is treated as enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Enabled,
    Disabled,
}

impl ChannelStatus {
    pub fn from_wire(value: &str) -> Self {
        if value.trim() == "1" {
            ChannelStatus::Disabled
        } else {
            ChannelStatus::Enabled
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            ChannelStatus::Enabled => "0",
            ChannelStatus::Disabled => "1",
        }
    }
}

impl Serialize for ChannelStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for ChannelStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ChannelStatus::from_wire(&raw))
    }
}

/// A notification channel configured on the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaChannel {
    /// Remote identifier
    #[serde(rename = "mediatypeid")]
    pub id: String,
    /// Display name, also used by the allow-list filter
    pub name: String,
    /// Current enabled flag
    pub status: ChannelStatus,
}

impl MediaChannel {
    pub fn is_disabled(&self) -> bool {
        self.status == ChannelStatus::Disabled
    }
}

/// Channel id -> instant the channel was first observed disabled.
///
/// A key exists only while the channel is disabled and neither restored
/// externally nor re-enabled by the watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaWatchState(BTreeMap<String, DateTime<Utc>>);

impl MediaWatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_seen(&self, channel_id: &str) -> Option<DateTime<Utc>> {
        self.0.get(channel_id).copied()
    }

    pub fn is_tracked(&self, channel_id: &str) -> bool {
        self.0.contains_key(channel_id)
    }

    /// Start tracking a channel. An existing entry keeps its original timestamp.
    pub fn track(&mut self, channel_id: &str, at: DateTime<Utc>) {
        self.0.entry(channel_id.to_string()).or_insert(at);
    }

    /// Stop tracking a channel, returning whether it was tracked
    pub fn untrack(&mut self, channel_id: &str) -> bool {
        self.0.remove(channel_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An administrative user group and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    #[serde(rename = "usrgrpid")]
    pub id: String,
    pub name: String,
    /// Member user ids; a set, serialized sorted
    #[serde(rename = "users", default)]
    pub members: BTreeSet<String>,
}

impl UserGroup {
    pub fn new<I, S>(id: &str, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Group id -> last observed group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSnapshot(BTreeMap<String, UserGroup>);

impl GroupSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group_id: &str) -> Option<&UserGroup> {
        self.0.get(group_id)
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.0.contains_key(group_id)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, UserGroup> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<UserGroup> for GroupSnapshot {
    fn from_iter<T: IntoIterator<Item = UserGroup>>(iter: T) -> Self {
        Self(iter.into_iter().map(|g| (g.id.clone(), g)).collect())
    }
}

/// Lifecycle of the group snapshot within one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotMode {
    /// No persisted snapshot existed at startup: the next observation is
    /// stored as ground truth without comparison
    Baseline,
    /// Observations are compared against the prior snapshot
    Steady,
}

/// Errors raised by the watcher and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("transport error calling {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response to {method}: {source}")]
    MalformedResponse {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("API error ({code}): {message} - {data}")]
    RemoteApi {
        code: i64,
        message: String,
        data: String,
    },

    #[error("failed to {action} state '{key}': {reason}")]
    Persistence {
        action: &'static str,
        key: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("notification delivery failed: {0}")]
    Notification(String),
}

impl WatchError {
    pub fn persistence(action: &'static str, key: &str, reason: impl ToString) -> Self {
        WatchError::Persistence {
            action,
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = WatchError> = std::result::Result<T, E>;
