use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::store::KeyValueStore;
use crate::errors::{Error, Result};
use crate::snapshot::{Field, SnapshotRecord};

const METALS_KEY: &str = "metals_backup";

/// Last known-good metal prices. Never expires and is never cleared automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalsBackup {
    pub gold: String,
    pub silver: String,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
}

impl MetalsBackup {
    /// Build from a record carrying both metal fields.
    pub fn from_record(
        rec: &SnapshotRecord,
        fetched_at: DateTime<Utc>,
        source: &str,
    ) -> Option<Self> {
        Some(Self {
            gold: rec.get(Field::GoldOz)?.to_string(),
            silver: rec.get(Field::SilverOz)?.to_string(),
            fetched_at,
            source: source.to_string(),
        })
    }

    /// Overwrite the two metal fields of `rec`.
    pub fn apply_to(&self, rec: &mut SnapshotRecord) {
        rec.set(Field::GoldOz, self.gold.clone());
        rec.set(Field::SilverOz, self.silver.clone());
    }
}

pub struct MetalsBackupStore {
    store: Arc<dyn KeyValueStore>,
}

impl MetalsBackupStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, backup: &MetalsBackup) -> Result<()> {
        let json = serde_json::to_string(backup).map_err(|e| Error::storage(METALS_KEY, e))?;
        self.store.set(METALS_KEY, &json)
    }

    /// Stored backup, or `None` when missing or unreadable.
    pub fn load(&self) -> Option<MetalsBackup> {
        match self.store.get(METALS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(b) => Some(b),
                Err(e) => {
                    warn!(error = %e, "metals backup unreadable");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "metals backup read failed");
                None
            }
        }
    }
}
