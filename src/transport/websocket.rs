use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::{Arc, Mutex};

use crate::broker::Broker;
use crate::client::{Client, ClientId};
use crate::transport::message::ClientMessage;

/// Classifies one raw text frame into a typed event.
///
/// Anything that is not JSON, or that is JSON but does not fit a known
/// action's shape, is "invalid message format"; a well-formed object whose
/// `action` is unrecognized is "unknown action". The error string is what
/// gets reported back to the offending client.
fn parse_client_message(text: &str) -> Result<ClientMessage, &'static str> {
    let value: Value = serde_json::from_str(text).map_err(|_| "invalid message format")?;
    match value.get("action").and_then(Value::as_str) {
        Some("subscribe" | "unsubscribe" | "publish") => {
            serde_json::from_value(value).map_err(|_| "invalid message format")
        }
        Some(_) => Err("unknown action"),
        None => Err("invalid message format"),
    }
}

/// Handles one inbound text frame from `client_id`: classify, validate,
/// dispatch to the broker.
///
/// The broker lock is taken once per frame and released before the next
/// frame is read, so every event runs to completion, persistence and
/// fan-out included, before any other connection's event can interleave.
pub fn handle_client_message(broker: &Arc<Mutex<Broker>>, client_id: &ClientId, text: &str) {
    let event = match parse_client_message(text) {
        Ok(event) => event,
        Err(reason) => {
            warn!(client = %client_id, reason, "rejected inbound frame");
            broker.lock().unwrap().send_error(client_id, reason);
            return;
        }
    };

    let mut broker = broker.lock().unwrap();
    match event {
        ClientMessage::Subscribe { topic } | ClientMessage::Publish { topic, .. }
            if topic.is_empty() =>
        {
            broker.send_error(client_id, "topic must not be empty");
        }
        ClientMessage::Subscribe { topic } => broker.subscribe(client_id, &topic),
        ClientMessage::Unsubscribe { topic } => broker.unsubscribe(client_id, &topic),
        ClientMessage::Publish { topic, payload } => {
            if let Err(e) = broker.publish(&topic, payload) {
                error!(client = %client_id, topic, "failed to persist message: {e}");
                broker.send_error(client_id, "failed to persist message");
            }
        }
    }
}

pub async fn start_websocket_server(addr: &str, broker: Arc<Mutex<Broker>>) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let broker = broker.clone();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake error: {e}");
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();

            // Channel carrying broker-originated frames to this client.
            let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

            // Register the client before reading any of its frames.
            let client_id = {
                let client = Client::new(tx);
                let id = client.id.clone();
                broker.lock().unwrap().register_client(client);
                id
            };

            // Forward frames from broker -> client.
            let sender_id = client_id.clone();
            tokio::spawn(async move {
                while let Some(msg) = rx.recv().await {
                    if let Err(e) = ws_sender.send(msg).await {
                        warn!(client = %sender_id, "send loop closed: {e}");
                        break;
                    }
                }
            });

            // Handle frames from client -> broker. Non-text frames are ignored.
            while let Some(Ok(msg)) = ws_receiver.next().await {
                if msg.is_text() {
                    if let Ok(text) = msg.to_text() {
                        handle_client_message(&broker, &client_id, text);
                    }
                }
            }

            broker.lock().unwrap().disconnect(&client_id);
        });
    }
}
