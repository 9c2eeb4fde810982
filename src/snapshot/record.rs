use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fields::Field;

/// Field name → display string.
///
/// Canonical fields live under their canonical spelling; headers the alias
/// table does not know are still kept under their raw and upper-cased
/// spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotRecord(BTreeMap<String, String>);

impl SnapshotRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(field.as_str()).map(String::as_str)
    }

    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field.as_str().to_string(), value.into());
    }

    pub fn insert_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(field.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(field.as_str())
    }

    /// Both `GOLD OZ` and `SILVER OZ` are present.
    pub fn has_metals(&self) -> bool {
        Field::METALS.iter().all(|f| self.contains(*f))
    }

    /// Copy every canonical field `other` has and `self` lacks.
    pub fn fill_missing_from(&mut self, other: &SnapshotRecord) {
        for field in Field::ALL {
            if !self.contains(field) {
                if let Some(v) = other.get(field) {
                    self.set(field, v);
                }
            }
        }
    }

    /// Canonical fields absent from this record.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| !self.contains(*f))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for SnapshotRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
