//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It defines the messaging protocol used between clients and the server,
//! classifies malformed input before it reaches the broker, and implements
//! the WebSocket server itself: accepting connections, parsing frames, and
//! forwarding client requests to the broker.

pub mod message;
pub mod websocket;

#[cfg(test)]
mod tests;
