//! # EchoWire
//!
//! `echowire` is a topic-based publish/subscribe relay built with Rust.
//! Clients connect over WebSockets, declare interest in named topics,
//! publish payloads, and receive fan-out delivery of everything published
//! to the topics they follow. Every published message is appended to a
//! durable JSON log that survives restarts.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The broadcast engine that owns the live client registry and routes messages.
//! - `client`: Represents a connected WebSocket client and its subscribed topics.
//! - `config`: Handles loading and merging server configuration.
//! - `persistence`: The durable message log (a single human-inspectable JSON file).
//! - `transport`: The WebSocket server and the wire protocol spoken with clients.
//! - `utils`: Shared error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod persistence;
pub mod transport;
pub mod utils;
