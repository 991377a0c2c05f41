use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::utils::error::StoreError;

/// A single persisted message record.
///
/// The payload is an opaque JSON value: the store never inspects it and
/// preserves it exactly through persistence and reload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub topic: String,
    pub payload: Value,
    pub timestamp: i64,
}

/// JSON-file message log with an in-memory mirror.
///
/// The file holds one ordered JSON array of [`StoredMessage`] records in
/// append order. The mirror is loaded once in [`FileStore::open`] and is
/// the sole source for history queries; the disk copy is only touched
/// again by [`FileStore::save`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: Vec<StoredMessage>,
}

impl FileStore {
    /// Opens the store at `path`, loading any previously persisted log.
    ///
    /// A missing file is a fresh start and yields an empty mirror. An
    /// unreadable or unparseable file is an error: callers must treat it
    /// as fatal rather than serve with history silently dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let cache: Vec<StoredMessage> = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        info!(
            messages = cache.len(),
            path = %path.display(),
            "message store loaded"
        );
        Ok(Self { path, cache })
    }

    /// Appends `msg` to the mirror and rewrites the whole log on disk
    /// before returning.
    ///
    /// Callers must not treat the message as committed until this returns
    /// `Ok`. On failure the mirror is rolled back so it never disagrees
    /// with the durable copy.
    pub fn save(&mut self, msg: StoredMessage) -> Result<(), StoreError> {
        self.cache.push(msg);
        let result = serde_json::to_vec_pretty(&self.cache)
            .map_err(StoreError::from)
            .and_then(|data| fs::write(&self.path, data).map_err(StoreError::from));
        if result.is_err() {
            self.cache.pop();
        }
        result
    }

    /// Returns a snapshot of the stored history in append order, filtered
    /// to `topic` when one is given.
    ///
    /// The snapshot is an independent copy: mutating it cannot affect the
    /// store's mirror.
    pub fn get_all(&self, topic: Option<&str>) -> Vec<StoredMessage> {
        match topic {
            Some(t) => self.cache.iter().filter(|m| m.topic == t).cloned().collect(),
            None => self.cache.clone(),
        }
    }

    /// Timestamp of the most recently appended record, or 0 for an empty
    /// log. Seeds the broker's monotonic clock across restarts.
    pub fn last_timestamp(&self) -> i64 {
        self.cache.last().map(|m| m.timestamp).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
