use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::clock::Clock;
use super::store::KeyValueStore;
use crate::errors::Result;
use crate::snapshot::SnapshotRecord;

/// Bump when the shape of a cached [`SnapshotRecord`] changes; older entries
/// are then discarded once on first read.
pub const CACHE_FORMAT_VERSION: u32 = 3;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

const SNAPSHOT_KEY: &str = "snapshot_cache";

/// What actually sits in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope {
    pub data: SnapshotRecord,
    pub timestamp_millis: i64,
    pub format_version: u32,
}

/// Time-boxed cache of the last resolved snapshot.
///
/// Purely an optimisation: storage failures are logged and read as a miss.
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    format_version: u32,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(store, clock, DEFAULT_CACHE_TTL, CACHE_FORMAT_VERSION)
    }

    pub fn with_settings(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        format_version: u32,
    ) -> Self {
        Self {
            store,
            clock,
            ttl,
            format_version,
        }
    }

    /// Fresh cached record, or `None` when absent, stale, corrupt or written
    /// under another format version (which also deletes it).
    pub fn get(&self) -> Option<SnapshotRecord> {
        let raw = match self.store.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "snapshot cache read failed");
                return None;
            }
        };

        let envelope: CacheEnvelope = match serde_json::from_str(&raw) {
            Ok(env) => env,
            Err(e) => {
                warn!(error = %e, "discarding unreadable snapshot cache entry");
                self.discard();
                return None;
            }
        };

        if envelope.format_version != self.format_version {
            debug!(
                stored = envelope.format_version,
                expected = self.format_version,
                "snapshot cache format changed; discarding"
            );
            self.discard();
            return None;
        }

        let age_ms = self.clock.now().timestamp_millis() - envelope.timestamp_millis;
        if age_ms > self.ttl.as_millis() as i64 {
            debug!(age_ms, "snapshot cache expired");
            return None;
        }

        debug!(age_ms, fields = envelope.data.len(), "snapshot cache hit");
        Some(envelope.data)
    }

    /// Store `data` stamped with the current time and format version.
    pub fn put(&self, data: &SnapshotRecord) -> Result<()> {
        let envelope = CacheEnvelope {
            data: data.clone(),
            timestamp_millis: self.clock.now().timestamp_millis(),
            format_version: self.format_version,
        };
        let json = serde_json::to_string(&envelope)
            .map_err(|e| crate::errors::Error::storage(SNAPSHOT_KEY, e))?;
        self.store.set(SNAPSHOT_KEY, &json)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(SNAPSHOT_KEY)
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(SNAPSHOT_KEY) {
            warn!(error = %e, "could not remove stale snapshot cache entry");
        }
    }
}
