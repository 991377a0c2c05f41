//! The `persistence` module provides the durable message log.
//!
//! Every published message is appended here before it is broadcast, so the
//! full history survives a process restart and can be queried by topic.
//!
//! The log is a single human-inspectable JSON file: it is loaded wholesale
//! at startup into an in-memory mirror and rewritten wholesale on every
//! append. That full rewrite is O(total history) per publish, a ceiling
//! this design accepts for simplicity.

pub mod file_store;
