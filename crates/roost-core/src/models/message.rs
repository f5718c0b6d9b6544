use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::StoreError;

/// Identifier of a message within a view.
///
/// Server-assigned ids are integers, but a locally echoed message is stored
/// under a fractional placeholder (e.g. `45.01`) until the server acks it,
/// so the id space is real-valued. `MessageId` is usable both as a hash key
/// and for ordered binary search: NaN and infinities are rejected at
/// construction, and negative zero is canonicalized so `Eq`, `Ord` and
/// `Hash` agree with each other.
#[derive(Debug, Clone, Copy)]
pub struct MessageId(f64);

impl MessageId {
    pub fn new(raw: f64) -> Result<Self, StoreError> {
        if !raw.is_finite() {
            return Err(StoreError::InvalidId { raw });
        }
        // -0.0 and 0.0 must map to the same key.
        let raw = if raw == 0.0 { 0.0 } else { raw };
        Ok(Self(raw))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Absolute distance to another id, used by closest-id selection.
    pub fn distance(self, other: MessageId) -> f64 {
        (self.0 - other.0).abs()
    }
}

impl From<i64> for MessageId {
    fn from(raw: i64) -> Self {
        Self(raw as f64)
    }
}

impl From<u32> for MessageId {
    fn from(raw: u32) -> Self {
        Self(f64::from(raw))
    }
}

impl PartialEq for MessageId {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for MessageId {}

impl PartialOrd for MessageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for MessageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        MessageId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A chat message as seen by the list data engine.
///
/// Only `id` and the flag/topic fields are interpreted; `content`,
/// `sender_id` and `timestamp` are carried for collaborators (the renderer
/// and the identity predicate) and never inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: u64,
    /// `None` for direct messages, which are never muted.
    pub stream_id: Option<u64>,
    pub topic: String,
    pub content: String,
    pub timestamp: u64,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub mentioned: bool,
}

impl Message {
    /// The muting key of a stream message, `None` for direct messages.
    pub fn topic_key(&self) -> Option<(u64, &str)> {
        self.stream_id.map(|stream_id| (stream_id, self.topic.as_str()))
    }
}
