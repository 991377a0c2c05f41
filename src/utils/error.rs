//! The `error` module defines the error types used within the `echowire`
//! application.

use thiserror::Error;

/// Errors raised by the durable message log.
///
/// A load-time error means the persisted log cannot be trusted and the
/// process must not start serving; a save-time error means the message was
/// never committed and must not be broadcast.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("message log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
