use crate::broker::Broker;
use crate::broker::message::Message;
use crate::client::Client;
use crate::persistence::file_store::FileStore;
use crate::transport::websocket::handle_client_message;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tungstenite::protocol::Message as WsMessage;

fn test_broker() -> (Arc<Mutex<Broker>>, TempDir) {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::open(dir.path().join("messages.json")).unwrap();
    (Arc::new(Mutex::new(Broker::new(store))), dir)
}

fn connect(broker: &Arc<Mutex<Broker>>) -> (String, UnboundedReceiver<WsMessage>) {
    let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx);
    let id = client.id.clone();
    broker.lock().unwrap().register_client(client);
    (id, rx)
}

fn recv_json(rx: &mut UnboundedReceiver<WsMessage>) -> serde_json::Value {
    match rx.try_recv().expect("expected a frame") {
        WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("Expected a text frame, got {other:?}"),
    }
}

#[test]
fn test_handle_subscribe() {
    let (broker, _dir) = test_broker();
    let (client_id, _rx) = connect(&broker);

    let msg = json!({"action": "subscribe", "topic": "news"}).to_string();
    handle_client_message(&broker, &client_id, &msg);

    assert!(broker.lock().unwrap().is_subscribed(&client_id, "news"));
}

#[test]
fn test_handle_unsubscribe() {
    let (broker, _dir) = test_broker();
    let (client_id, _rx) = connect(&broker);
    broker.lock().unwrap().subscribe(&client_id, "news");

    let msg = json!({"action": "unsubscribe", "topic": "news"}).to_string();
    handle_client_message(&broker, &client_id, &msg);

    assert!(!broker.lock().unwrap().is_subscribed(&client_id, "news"));
}

#[test]
fn test_handle_publish_fans_out_and_persists() {
    let (broker, _dir) = test_broker();
    let (publisher, _rx_pub) = connect(&broker);
    let (subscriber, mut rx_sub) = connect(&broker);
    broker.lock().unwrap().subscribe(&subscriber, "news");

    let msg = json!({
        "action": "publish",
        "topic": "news",
        "payload": "hello world"
    })
    .to_string();
    handle_client_message(&broker, &publisher, &msg);

    let received: Message = serde_json::from_value(recv_json(&mut rx_sub)).unwrap();
    assert_eq!(received.topic, "news");
    assert_eq!(received.payload, json!("hello world"));

    let history = broker.lock().unwrap().history(Some("news"));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].payload, json!("hello world"));
}

#[test]
fn test_publish_without_payload_defaults_to_null() {
    let (broker, _dir) = test_broker();
    let (client_id, mut rx) = connect(&broker);
    broker.lock().unwrap().subscribe(&client_id, "news");

    let msg = json!({"action": "publish", "topic": "news"}).to_string();
    handle_client_message(&broker, &client_id, &msg);

    assert_eq!(recv_json(&mut rx)["payload"], json!(null));
}

#[test]
fn test_unparseable_text_gets_invalid_format_error() {
    let (broker, _dir) = test_broker();
    let (client_id, mut rx) = connect(&broker);

    handle_client_message(&broker, &client_id, "this is not json");

    assert_eq!(recv_json(&mut rx)["error"], "invalid message format");
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_missing_topic_gets_invalid_format_error() {
    let (broker, _dir) = test_broker();
    let (client_id, mut rx) = connect(&broker);

    let msg = json!({"action": "subscribe"}).to_string();
    handle_client_message(&broker, &client_id, &msg);

    assert_eq!(recv_json(&mut rx)["error"], "invalid message format");
}

#[test]
fn test_unknown_action_gets_exactly_one_error_frame() {
    let (broker, _dir) = test_broker();
    let (offender, mut rx_off) = connect(&broker);
    let (bystander, mut rx_by) = connect(&broker);
    broker.lock().unwrap().subscribe(&bystander, "news");

    let msg = json!({"action": "bogus"}).to_string();
    handle_client_message(&broker, &offender, &msg);

    assert_eq!(recv_json(&mut rx_off)["error"], "unknown action");
    assert!(rx_off.try_recv().is_err());

    // No broadcast happened and no other client saw anything.
    assert!(rx_by.try_recv().is_err());
    assert!(broker.lock().unwrap().history(None).is_empty());
}

#[test]
fn test_empty_topic_is_rejected() {
    let (broker, _dir) = test_broker();
    let (client_id, mut rx) = connect(&broker);

    let msg = json!({"action": "subscribe", "topic": ""}).to_string();
    handle_client_message(&broker, &client_id, &msg);
    assert_eq!(recv_json(&mut rx)["error"], "topic must not be empty");
    assert!(!broker.lock().unwrap().is_subscribed(&client_id, ""));

    let msg = json!({"action": "publish", "topic": "", "payload": 1}).to_string();
    handle_client_message(&broker, &client_id, &msg);
    assert_eq!(recv_json(&mut rx)["error"], "topic must not be empty");
    assert!(broker.lock().unwrap().history(None).is_empty());
}

#[test]
fn test_failed_persistence_reports_to_publisher() {
    let dir = tempdir().unwrap();
    // Parent directory does not exist, so the store rewrite fails.
    let store = FileStore::open(dir.path().join("missing").join("messages.json")).unwrap();
    let broker = Arc::new(Mutex::new(Broker::new(store)));

    let (publisher, mut rx_pub) = connect(&broker);
    let (subscriber, mut rx_sub) = connect(&broker);
    broker.lock().unwrap().subscribe(&subscriber, "news");

    let msg = json!({"action": "publish", "topic": "news", "payload": "lost"}).to_string();
    handle_client_message(&broker, &publisher, &msg);

    assert_eq!(recv_json(&mut rx_pub)["error"], "failed to persist message");
    assert!(rx_sub.try_recv().is_err());
}
