use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::file_store::StoredMessage;

/// Represents a published message in the Pub/Sub system.
///
/// A message consists of a topic identifier, the opaque payload, and a
/// timestamp assigned by the broker at publish time. Once constructed it is
/// never mutated: the same value is persisted and fanned out.
///
/// This structure is serialized to JSON both for delivery over WebSocket
/// and for the durable log.
///
/// # Fields
///
/// - `topic` - The name of the topic this message belongs to.
/// - `payload` - The published content, any JSON value; never inspected by the broker.
/// - `timestamp` - Milliseconds since the Unix epoch, non-decreasing per process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub topic: String,
    pub payload: Value,
    pub timestamp: i64,
}

impl From<&Message> for StoredMessage {
    fn from(msg: &Message) -> Self {
        Self {
            topic: msg.topic.clone(),
            payload: msg.payload.clone(),
            timestamp: msg.timestamp,
        }
    }
}

/// An error frame delivered to a single offending client, never broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
}

impl ErrorFrame {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            error: reason.into(),
        }
    }
}
