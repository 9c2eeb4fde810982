use std::collections::BTreeMap;

use super::fields::Field;
use super::record::SnapshotRecord;
use crate::process::{first_year, is_blank, RawRow};

/// How a snapshot sheet lays out its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `Field Name,Value` header then one field per row.
    Vertical,
    /// Row 0 holds field names, the first non-blank row after it holds values.
    Horizontal,
}

const VERTICAL_MARKERS: &[&str] = &["FIELD NAME", "KEY", "NAME"];

pub fn detect_orientation(rows: &[RawRow]) -> Option<Orientation> {
    let first = rows.first()?;
    let lead = first.first().map(|c| c.trim().to_uppercase()).unwrap_or_default();
    if VERTICAL_MARKERS.contains(&lead.as_str()) {
        return Some(Orientation::Vertical);
    }
    if first.len() >= 2 && rows.len() >= 2 {
        return Some(Orientation::Horizontal);
    }
    None
}

/// Store `value` under the raw spelling, the upper-cased spelling and, when
/// known, the canonical alias. Blank names or values are ignored.
pub fn insert_field(rec: &mut SnapshotRecord, raw_name: &str, value: &str) -> bool {
    let name = raw_name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return false;
    }
    rec.insert_raw(name, value);
    let upper = name.to_uppercase();
    if upper != name {
        rec.insert_raw(upper, value);
    }
    if let Some(field) = Field::resolve_alias(name) {
        rec.set(field, value);
    }
    true
}

/// Turn a parsed snapshot sheet into a record. `Err` carries a description of
/// why the table is unusable.
pub fn map_table(rows: &[RawRow]) -> Result<SnapshotRecord, String> {
    let orientation = detect_orientation(rows).ok_or_else(|| {
        format!(
            "unrecognised layout ({} row(s), {} column(s) in the first row)",
            rows.len(),
            rows.first().map(Vec::len).unwrap_or(0)
        )
    })?;

    let mut rec = SnapshotRecord::new();
    let mut stored = 0usize;
    match orientation {
        Orientation::Vertical => {
            for row in rows.iter().skip(1) {
                if row.len() < 2 {
                    continue;
                }
                if insert_field(&mut rec, &row[0], &row[1]) {
                    stored += 1;
                }
            }
        }
        Orientation::Horizontal => {
            let header = &rows[0];
            let values = rows
                .iter()
                .skip(1)
                .find(|r| !is_blank(r))
                .ok_or_else(|| "header row has no values row".to_string())?;
            for (name, value) in header.iter().zip(values.iter()) {
                if insert_field(&mut rec, name, value) {
                    stored += 1;
                }
            }
        }
    }

    if stored == 0 {
        return Err(format!("{:?} table carried no values", orientation));
    }
    Ok(rec)
}

/// Year-keyed snapshot table: header `Year,<field>,<field>…`, one row per year.
#[derive(Debug, Clone, Default)]
pub struct DatedSnapshots {
    by_year: BTreeMap<i32, SnapshotRecord>,
}

impl DatedSnapshots {
    pub fn from_rows(rows: &[RawRow]) -> Result<Self, String> {
        let header = rows.first().ok_or_else(|| "empty table".to_string())?;
        if header.len() < 2 {
            return Err("header needs a year column and at least one field".to_string());
        }
        let mut by_year = BTreeMap::new();
        for row in rows.iter().skip(1) {
            let Some(year) = row.first().and_then(|c| first_year(c)) else {
                continue;
            };
            let mut rec = SnapshotRecord::new();
            for (name, value) in header.iter().zip(row.iter()).skip(1) {
                insert_field(&mut rec, name, value);
            }
            if !rec.is_empty() {
                by_year.insert(year, rec);
            }
        }
        if by_year.is_empty() {
            return Err("no rows with a recognisable year".to_string());
        }
        Ok(Self { by_year })
    }

    /// Exact year, else the nearest earlier year, else the earliest year on file.
    pub fn closest(&self, year: i32) -> Option<&SnapshotRecord> {
        self.by_year
            .get(&year)
            .or_else(|| self.by_year.range(..year).next_back().map(|(_, r)| r))
            .or_else(|| self.by_year.values().next())
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}
