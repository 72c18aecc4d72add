//! StateStore — shared in-memory map of service id → last known status.
//!
//! The store is `Clone` (backed by `Arc<RwLock<HashMap>>`) and is handed
//! to every concurrent per-service check task. Updates are keyed by
//! distinct ids; `replace` is a single atomic write under the lock, so
//! overlapping cycles resolve to last-write-wins per id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::types::StatusRecord;

/// Thread-safe store of the most recent status per service.
#[derive(Clone, Default, Debug)]
pub struct StateStore {
    records: Arc<RwLock<HashMap<String, StatusRecord>>>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a snapshot file.
    ///
    /// A missing file yields an empty store. The file is deleted after a
    /// successful read so that records for services no longer configured
    /// don't outlive the run that dropped them.
    pub fn restore(path: &Path) -> StateResult<Self> {
        let records = match std::fs::read(path) {
            Ok(bytes) => {
                let map: HashMap<String, StatusRecord> =
                    serde_json::from_slice(&bytes).map_err(|e| StateError::Decode(e.to_string()))?;
                std::fs::remove_file(path).map_err(|e| StateError::Read(e.to_string()))?;
                debug!(records = map.len(), ?path, "state snapshot restored");
                map
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "no state snapshot, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(StateError::Read(e.to_string())),
        };
        Ok(Self {
            records: Arc::new(RwLock::new(records)),
        })
    }

    /// The last known record for a service, if it has ever been checked.
    pub async fn get(&self, id: &str) -> Option<StatusRecord> {
        self.records.read().await.get(id).cloned()
    }

    /// Atomically replace a service's record, returning the previous one.
    pub async fn replace(&self, id: &str, record: StatusRecord) -> Option<StatusRecord> {
        self.records.write().await.insert(id.to_string(), record)
    }

    /// Number of services with a known status.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// A point-in-time copy of every record.
    pub async fn snapshot(&self) -> HashMap<String, StatusRecord> {
        self.records.read().await.clone()
    }

    /// Serialize the store to a snapshot file.
    pub async fn persist(&self, path: &Path) -> StateResult<()> {
        let records = self.records.read().await;
        let bytes =
            serde_json::to_vec_pretty(&*records).map_err(|e| StateError::Encode(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StateError::Write(e.to_string()))?;
        }
        std::fs::write(path, bytes).map_err(|e| StateError::Write(e.to_string()))?;
        debug!(records = records.len(), ?path, "state snapshot written");
        Ok(())
    }
}
