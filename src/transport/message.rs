use serde::Deserialize;
use serde_json::Value;

/// An inbound event from a client, dispatched on its `action` field.
///
/// A `publish` without a payload carries JSON null; the broker treats the
/// payload as opaque either way.
#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { topic: String },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { topic: String },

    #[serde(rename = "publish")]
    Publish {
        topic: String,
        #[serde(default)]
        payload: Value,
    },
}
