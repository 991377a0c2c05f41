//! The `client` module defines the representation of a connected client.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! live connection: its unique identifier, the channel for sending frames to
//! it, and the set of topics it is currently subscribed to.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientId};
