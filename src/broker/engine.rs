use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::{ErrorFrame, Message};
use crate::client::{Client, ClientId};
use crate::persistence::file_store::{FileStore, StoredMessage};
use crate::utils::error::StoreError;

/// The broadcast engine: owns the live client registry and the durable
/// message log, and routes published messages to subscribed clients.
///
/// All mutation happens through these methods while the caller holds the
/// surrounding `Mutex`, so each inbound event runs to completion, store
/// append and fan-out included, before the next one is processed. That
/// serialization is what makes a publish atomic with respect to other
/// subscribe/unsubscribe/publish calls, and what guarantees that two
/// publishes to the same topic reach any given subscriber in publish order.
#[derive(Debug)]
pub struct Broker {
    clients: HashMap<ClientId, Client>,
    store: FileStore,
    last_timestamp: i64,
}

impl Broker {
    /// Creates a broker around an already-loaded message store.
    ///
    /// The monotonic publish clock is seeded from the store's tail so
    /// timestamps keep advancing across restarts.
    pub fn new(store: FileStore) -> Self {
        let last_timestamp = store.last_timestamp();
        Self {
            clients: HashMap::new(),
            store,
            last_timestamp,
        }
    }

    /// Registers a new client with the broker.
    ///
    /// Called by the transport when a connection is established, before any
    /// of that connection's events are dispatched.
    pub fn register_client(&mut self, client: Client) {
        info!(client = %client.id, "client connected");
        self.clients.insert(client.id.clone(), client);
    }

    /// Removes a client and discards its subscription set.
    ///
    /// Called by the transport when the connection closes. Idempotent:
    /// disconnecting an unknown or already-removed client is a no-op.
    pub fn disconnect(&mut self, client_id: &ClientId) {
        if self.clients.remove(client_id).is_some() {
            info!(client = %client_id, "client disconnected");
        }
    }

    /// Adds `topic` to the client's subscription set.
    ///
    /// Subscribing twice to the same topic has no effect. Unknown client
    /// ids are ignored; the transport registers every connection before
    /// forwarding its events.
    pub fn subscribe(&mut self, client_id: &ClientId, topic: &str) {
        if let Some(client) = self.clients.get_mut(client_id) {
            client.topics.insert(topic.to_string());
            debug!(client = %client_id, topic, "subscribed");
        }
    }

    /// Removes `topic` from the client's subscription set if present.
    /// Never an error, even when the client was not subscribed.
    pub fn unsubscribe(&mut self, client_id: &ClientId, topic: &str) {
        if let Some(client) = self.clients.get_mut(client_id) {
            client.topics.remove(topic);
            debug!(client = %client_id, topic, "unsubscribed");
        }
    }

    /// Publishes `payload` to `topic`: stamps the message, persists it,
    /// then fans it out to every subscribed client.
    ///
    /// Persistence comes first. If the store append fails the error
    /// propagates and nothing is broadcast; the message was never
    /// committed. The publisher gets no special treatment during fan-out:
    /// it receives its own message exactly when it is itself subscribed.
    pub fn publish(&mut self, topic: &str, payload: Value) -> Result<Message, StoreError> {
        let message = Message {
            topic: topic.to_string(),
            payload,
            timestamp: self.next_timestamp(),
        };
        self.store.save(StoredMessage::from(&message))?;
        self.broadcast(&message);
        Ok(message)
    }

    /// Sends an `{error: reason}` frame to one client only. No other
    /// client ever observes it.
    pub fn send_error(&self, client_id: &ClientId, reason: &str) {
        if let Some(client) = self.clients.get(client_id) {
            if let Ok(text) = serde_json::to_string(&ErrorFrame::new(reason)) {
                let _ = client.sender.send(WsMessage::text(text));
            }
        }
    }

    /// Snapshot of the stored history, optionally filtered by topic.
    pub fn history(&self, topic: Option<&str>) -> Vec<StoredMessage> {
        self.store.get_all(topic)
    }

    pub fn is_subscribed(&self, client_id: &ClientId, topic: &str) -> bool {
        self.clients
            .get(client_id)
            .is_some_and(|c| c.is_subscribed(topic))
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Millisecond timestamps, clamped so they never go backwards within
    /// the process even if the wall clock does.
    fn next_timestamp(&mut self) -> i64 {
        self.last_timestamp = self.last_timestamp.max(Utc::now().timestamp_millis());
        self.last_timestamp
    }

    /// Delivers `message` to every client subscribed to its topic, at most
    /// once per client. A client whose channel is closed is skipped; the
    /// loop always runs to the end of the registry.
    fn broadcast(&self, message: &Message) {
        let text = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize message for broadcast: {e}");
                return;
            }
        };
        let frame = WsMessage::text(text);

        let mut delivered = 0usize;
        for client in self.clients.values() {
            if !client.is_subscribed(&message.topic) {
                continue;
            }
            match client.sender.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(client = %client.id, "skipping undeliverable client: {e}");
                }
            }
        }
        debug!(topic = %message.topic, delivered, "fan-out complete");
    }
}
