use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use super::names::{strip_census_suffix, PlaceQuery};
use crate::errors::{Error, Result};
use crate::process::{clean_str, first_year, parse_population, RawRow};

/// Year → population for one place.
pub type YearSeries = BTreeMap<i32, u64>;

/// `"city, state"` (lower-case) → year series, built from a wide
/// `City,State,<year>,<year>,…` table.
#[derive(Debug, Clone, Default)]
pub struct PopulationIndex {
    by_key: HashMap<String, YearSeries>,
    years: Vec<i32>,
}

impl PopulationIndex {
    pub fn from_rows(rows: &[RawRow], source_name: &str) -> Result<Self> {
        let header = rows
            .first()
            .ok_or_else(|| Error::parse(source_name, "empty population table"))?;

        // 1) year columns: every header cell after city/state carrying a year
        let year_cols: Vec<(usize, i32)> = header
            .iter()
            .enumerate()
            .skip(2)
            .filter_map(|(i, cell)| first_year(cell).map(|y| (i, y)))
            .collect();
        if year_cols.is_empty() {
            return Err(Error::parse(
                source_name,
                format!("no year columns in header {:?}", header),
            ));
        }

        // 2) one series per row; rows without a usable value are dropped
        let mut by_key: HashMap<String, YearSeries> = HashMap::new();
        let mut dropped = 0usize;
        for row in rows.iter().skip(1) {
            if row.len() < 3 {
                continue;
            }
            let city = clean_str(&row[0]);
            let state = clean_str(&row[1]).to_lowercase();
            if city.is_empty() {
                continue;
            }

            let series: YearSeries = year_cols
                .iter()
                .filter_map(|(i, year)| {
                    row.get(*i)
                        .and_then(|cell| parse_population(cell))
                        .map(|pop| (*year, pop))
                })
                .collect();
            if series.is_empty() {
                dropped += 1;
                trace!(%city, %state, "no usable years; dropping");
                continue;
            }

            let original = format!("{}, {}", city.to_lowercase(), state);
            let key = format!("{}, {}", strip_census_suffix(&city).to_lowercase(), state);
            if key != original {
                by_key.entry(original).or_insert_with(|| series.clone());
            }
            by_key.entry(key).or_insert(series);
        }

        let years = year_cols.iter().map(|(_, y)| *y).collect();
        debug!(
            places = by_key.len(),
            dropped,
            year_columns = year_cols.len(),
            "built population index"
        );
        Ok(Self { by_key, years })
    }

    pub fn years_for(&self, key: &str) -> Option<&YearSeries> {
        self.by_key.get(key)
    }

    /// First candidate key of `query` present in the index.
    pub fn lookup(&self, query: &PlaceQuery) -> Option<(String, &YearSeries)> {
        query
            .candidate_keys()
            .into_iter()
            .find_map(|k| self.by_key.get(&k).map(|s| (k, s)))
    }

    /// Year columns the source table published.
    pub fn year_columns(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Population in `year`: the exact value when published, the nearest boundary
/// year outside the published range, otherwise linear interpolation between
/// the closest years either side (rounded to the nearest person).
pub fn population_in_year(series: &YearSeries, year: i32) -> Option<u64> {
    if let Some(v) = series.get(&year) {
        return Some(*v);
    }
    let below = series.range(..year).next_back();
    let above = series.range(year + 1..).next();
    match (below, above) {
        (Some((&y0, &v0)), Some((&y1, &v1))) => {
            let t = f64::from(year - y0) / f64::from(y1 - y0);
            let v = v0 as f64 + (v1 as f64 - v0 as f64) * t;
            Some(v.round() as u64)
        }
        (Some((_, &v)), None) | (None, Some((_, &v))) => Some(v),
        (None, None) => None,
    }
}
