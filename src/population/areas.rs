use std::collections::HashMap;
use tracing::{debug, trace};

use super::names::{normalize_area, strip_area_suffix};
use crate::errors::{Error, Result};
use crate::process::{first_year, parse_population, RawRow};

/// Rows searched for a header before assuming the table has none.
const HEADER_SCAN_ROWS: usize = 5;
const HEADER_MARKERS: &[&str] = &["geographic area", "population", "area name"];
/// Area column keywords, highest priority first.
const AREA_KEYWORDS: &[&str] = &["geographic area", "area", "name", "city"];

/// One `"city, state"` row of the current population table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRecord {
    /// Normalised: leading `.` removed, lower-case, `"city, state"`.
    pub area: String,
    pub population: u64,
}

/// Flat list of current areas with exact-lookup maps precomputed for the
/// first two matching passes.
#[derive(Debug, Clone, Default)]
pub struct AreaTable {
    records: Vec<AreaRecord>,
    by_area: HashMap<String, usize>,
    by_stripped: HashMap<String, usize>,
}

struct Columns {
    header_row: usize,
    area: usize,
    /// Population and year columns, left to right.
    population: Vec<usize>,
}

fn find_columns(rows: &[RawRow], source_name: &str) -> Result<Option<Columns>> {
    let header = rows.iter().take(HEADER_SCAN_ROWS).enumerate().find(|(_, row)| {
        row.iter().any(|cell| {
            let lower = cell.to_lowercase();
            HEADER_MARKERS.iter().any(|m| lower.contains(m))
        })
    });
    let Some((header_row, cells)) = header else {
        return Ok(None);
    };
    let lower: Vec<String> = cells.iter().map(|c| c.to_lowercase()).collect();

    let area = AREA_KEYWORDS
        .iter()
        .find_map(|kw| lower.iter().position(|c| c.contains(kw)))
        .ok_or_else(|| {
            Error::parse(source_name, format!("no area column in header {:?}", cells))
        })?;
    let population: Vec<usize> = lower
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != area && (c.contains("population") || first_year(c).is_some()))
        .map(|(i, _)| i)
        .collect();
    if population.is_empty() {
        return Err(Error::parse(
            source_name,
            format!("no population column in header {:?}", cells),
        ));
    }

    Ok(Some(Columns {
        header_row,
        area,
        population,
    }))
}

impl AreaTable {
    /// Build from parsed rows. An unresolvable header is a `Parse` error.
    pub fn from_rows(rows: &[RawRow], source_name: &str) -> Result<Self> {
        let columns = find_columns(rows, source_name)?;
        let data_start = columns.as_ref().map(|c| c.header_row + 1).unwrap_or(0);

        let mut records = Vec::new();
        let mut stripped = Vec::new();
        let mut skipped = 0usize;
        for row in rows.iter().skip(data_start) {
            // newest estimate wins; a blank newest cell falls back to older ones
            let (raw_area, population) = match &columns {
                Some(c) => (
                    row.get(c.area),
                    c.population
                        .iter()
                        .rev()
                        .find_map(|&i| row.get(i).and_then(|v| parse_population(v))),
                ),
                // headerless: area first, population is the last numeric cell
                None => (
                    row.first(),
                    row.iter().skip(1).rev().find_map(|v| parse_population(v)),
                ),
            };
            let raw_area = raw_area.map(|a| a.trim().trim_start_matches('.')).unwrap_or("");
            let area = normalize_area(raw_area);
            match population {
                Some(population) if !area.is_empty() => {
                    // strip before lower-casing: case tells "Carson City" from "Tulsa city"
                    stripped.push(normalize_area(&strip_area_suffix(raw_area)));
                    records.push(AreaRecord { area, population });
                }
                _ => {
                    skipped += 1;
                    trace!(?row, "skipping area row without a population");
                }
            }
        }

        let table = Self::build(records, stripped);
        debug!(
            areas = table.len(),
            skipped,
            header = columns.is_some(),
            "built current area table"
        );
        Ok(table)
    }

    /// Records whose areas are already normalised.
    pub fn from_records(records: Vec<AreaRecord>) -> Self {
        let stripped = records.iter().map(|r| strip_area_suffix(&r.area)).collect();
        Self::build(records, stripped)
    }

    fn build(records: Vec<AreaRecord>, stripped: Vec<String>) -> Self {
        let mut by_area = HashMap::with_capacity(records.len());
        let mut by_stripped = HashMap::with_capacity(records.len());
        for (i, (rec, key)) in records.iter().zip(stripped).enumerate() {
            by_area.entry(rec.area.clone()).or_insert(i);
            by_stripped.entry(key).or_insert(i);
        }
        Self {
            records,
            by_area,
            by_stripped,
        }
    }

    pub fn get_exact(&self, key: &str) -> Option<&AreaRecord> {
        self.by_area.get(key).map(|&i| &self.records[i])
    }

    /// Match against stored areas with their census suffix removed.
    pub fn get_stripped(&self, key: &str) -> Option<&AreaRecord> {
        self.by_stripped.get(key).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[AreaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::matching::find_area;
    use crate::population::names::PlaceQuery;
    use crate::process::parse_csv;

    #[test]
    fn header_rows_use_the_newest_filled_population_column() {
        let rows = parse_csv(
            "Table 1. Annual Estimates\n\
             Geographic Area,April 1 Population Base,Population Estimate 2023,2024\n\
             \".Kansas City city, Missouri\",\"508,090\",\"510,704\",\"516,032\"\n\
             \".Tulsa city, Oklahoma\",\"413,066\",\"411,938\",\n\
             Footnote: estimates,,,\n",
        );
        let table = AreaTable::from_rows(&rows, "current").unwrap();

        assert_eq!(table.len(), 2);
        let kc = table.get_exact("kansas city city, missouri").unwrap();
        assert_eq!(kc.population, 516_032);
        assert_eq!(
            table.get_stripped("kansas city, missouri").map(|r| r.population),
            Some(516_032)
        );
        // 2024 blank: the 2023 estimate is used instead of dropping the city
        assert_eq!(
            table.get_stripped("tulsa, oklahoma").map(|r| r.population),
            Some(411_938)
        );
    }

    #[test]
    fn blank_newest_estimate_keeps_the_city_findable() {
        let rows = parse_csv(
            "Geographic Area,Population Estimate 2022,Population Estimate 2023\n\
             \".Tulsa city, Oklahoma\",\"411,938\",\n",
        );
        let table = AreaTable::from_rows(&rows, "current").unwrap();
        assert_eq!(table.len(), 1);
        let hit = find_area(&table, &PlaceQuery::parse("Tulsa, OK"));
        assert_eq!(hit.map(|m| m.record.population), Some(411_938));
    }

    #[test]
    fn proper_name_city_is_not_stripped() {
        let rows = parse_csv(
            "Geographic Area,Population Estimate 2023\n\
             \".Carson City, Nevada\",\"58,993\"\n\
             \".Jersey City city, New Jersey\",\"291,657\"\n",
        );
        let table = AreaTable::from_rows(&rows, "current").unwrap();
        assert!(table.get_stripped("carson, nevada").is_none());
        assert!(table.get_stripped("carson city, nevada").is_some());
        assert_eq!(
            table.get_stripped("jersey city, new jersey").map(|r| r.population),
            Some(291_657)
        );
    }

    #[test]
    fn headerless_table_uses_first_and_last_numeric_cells() {
        let rows = parse_csv(
            "\"Boise city, Idaho\",\"235,684\",\"237,446\",\n\
             \"Nampa city, Idaho\",n/a,\n\
             ,\"12\"\n",
        );
        let table = AreaTable::from_rows(&rows, "current").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get_exact("boise city, idaho").map(|r| r.population),
            Some(237_446)
        );
    }

    #[test]
    fn header_without_population_column_is_a_parse_error() {
        let rows = parse_csv("Geographic Area,Notes\nBoise city,x\n");
        assert!(matches!(
            AreaTable::from_rows(&rows, "current"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn area_column_priority_prefers_geographic_area() {
        let rows = parse_csv("Name,Geographic Area,Population\nignored,\"Mesa city, Arizona\",504258\n");
        let table = AreaTable::from_rows(&rows, "current").unwrap();
        assert!(table.get_exact("mesa city, arizona").is_some());
    }
}
