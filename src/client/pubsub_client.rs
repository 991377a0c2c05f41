use std::collections::HashSet;

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

pub type ClientId = String;

/// Represents a connected WebSocket client in the Pub/Sub system.
///
/// Each client is uniquely identified by an `id` for its lifetime and has a
/// channel (`sender`) for sending frames to it over WebSocket. The client
/// carries its own subscription set; when the client is removed from the
/// broker the set is discarded with it, never persisted.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for the client, assigned at connect time.
    pub id: ClientId,

    /// Channel to send WebSocket frames to the client.
    pub sender: UnboundedSender<WsMessage>,

    /// Topics this client is currently subscribed to. Membership only;
    /// insertion order is irrelevant.
    pub topics: HashSet<String>,
}

impl Client {
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", uuid::Uuid::new_v4()),
            sender,
            topics: HashSet::new(),
        }
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}
