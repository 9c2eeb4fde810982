use async_trait::async_trait;
use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::areas::AreaTable;
use super::index::{population_in_year, PopulationIndex};
use super::matching::find_area;
use super::names::PlaceQuery;
use crate::errors::{Error, Result};
use crate::fetch::TextFetcher;
use crate::memo::Memo;
use crate::process::{parse_csv, parse_iso_date};

/// Birth dates before 1 January of this year resolve against the historical table.
pub const HISTORICAL_CUTOFF_YEAR: i32 = 2020;
/// A historical miss for this year or later is retried once against the
/// current table.
pub const CURRENT_FALLBACK_YEAR: i32 = 2024;

/// "Population of this place today". `Ok(None)` means not found.
#[async_trait]
pub trait CurrentPopulationLookup: Send + Sync {
    async fn current_population(&self, place: &str) -> Result<Option<u64>>;
}

/// Which dataset a lookup goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Historical { year: i32 },
    Current,
}

impl Route {
    pub fn for_birth_date(dob: Option<&str>) -> Self {
        let Some(raw) = dob.filter(|d| !d.trim().is_empty()) else {
            return Route::Current;
        };
        match parse_iso_date(raw) {
            Some(date) if date.year() < HISTORICAL_CUTOFF_YEAR => {
                Route::Historical { year: date.year() }
            }
            Some(_) => Route::Current,
            None => {
                warn!(dob = raw, "unrecognised birth date; using current population");
                Route::Current
            }
        }
    }
}

// ─── current table ───────────────────────────────────────────────────────

pub struct CurrentResolver {
    fetcher: Arc<dyn TextFetcher>,
    url: String,
    table: Memo<AreaTable>,
}

impl CurrentResolver {
    pub fn new(fetcher: Arc<dyn TextFetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            table: Memo::new(),
        }
    }

    /// Fetch and parse once per process; concurrent first callers share the load.
    pub async fn load_table(&self) -> Result<Arc<AreaTable>> {
        self.table
            .get_or_try_init(|| async {
                let text = self.fetcher.fetch_text(&self.url).await?;
                let rows = parse_csv(&text);
                let table = AreaTable::from_rows(&rows, &self.url)?;
                info!(
                    url = %self.url,
                    rows = rows.len(),
                    areas = table.len(),
                    "loaded current population table"
                );
                Ok::<_, Error>(table)
            })
            .await
    }

    /// Fetch and parse failures propagate: an unreachable table is not the
    /// same answer as an unknown place.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, place: &str) -> Result<Option<u64>> {
        let table = self.load_table().await?;
        let query = PlaceQuery::parse(place);
        Ok(find_area(&table, &query).map(|m| m.record.population))
    }

    pub fn clear(&self) {
        self.table.clear();
    }
}

#[async_trait]
impl CurrentPopulationLookup for CurrentResolver {
    async fn current_population(&self, place: &str) -> Result<Option<u64>> {
        self.resolve(place).await
    }
}

// ─── historical table ────────────────────────────────────────────────────

pub struct HistoricalResolver {
    fetcher: Arc<dyn TextFetcher>,
    url: String,
    index: Memo<PopulationIndex>,
    current: Arc<dyn CurrentPopulationLookup>,
}

impl HistoricalResolver {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        url: impl Into<String>,
        current: Arc<dyn CurrentPopulationLookup>,
    ) -> Self {
        Self {
            fetcher,
            url: url.into(),
            index: Memo::new(),
            current,
        }
    }

    pub async fn load_index(&self) -> Result<Arc<PopulationIndex>> {
        self.index
            .get_or_try_init(|| async {
                let text = self.fetcher.fetch_text(&self.url).await?;
                let index = PopulationIndex::from_rows(&parse_csv(&text), &self.url)?;
                info!(
                    url = %self.url,
                    places = index.len(),
                    years = index.year_columns().len(),
                    "loaded historical population index"
                );
                Ok::<_, Error>(index)
            })
            .await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn population_at(&self, place: &str, year: i32) -> Result<Option<u64>> {
        let index = self.load_index().await?;
        let query = PlaceQuery::parse(place);
        if let Some((key, series)) = index.lookup(&query) {
            let population = population_in_year(series, year);
            debug!(%key, year, ?population, "historical match");
            return Ok(population);
        }
        if year >= CURRENT_FALLBACK_YEAR {
            debug!(year, "no historical key; trying current table");
            return self.current.current_population(place).await;
        }
        debug!(year, "no historical key");
        Ok(None)
    }

    pub fn clear(&self) {
        self.index.clear();
    }
}

// ─── routing ─────────────────────────────────────────────────────────────

/// Entry point: picks the dataset from the birth date.
pub struct PopulationResolver {
    current: Arc<CurrentResolver>,
    historical: HistoricalResolver,
}

impl PopulationResolver {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        current_url: impl Into<String>,
        historical_url: impl Into<String>,
    ) -> Self {
        let current = Arc::new(CurrentResolver::new(fetcher.clone(), current_url));
        let historical = HistoricalResolver::new(fetcher, historical_url, current.clone());
        Self {
            current,
            historical,
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn resolve_population(&self, place: &str, dob: Option<&str>) -> Result<Option<u64>> {
        match Route::for_birth_date(dob) {
            Route::Historical { year } => self.historical.population_at(place, year).await,
            Route::Current => self.current.resolve(place).await,
        }
    }

    /// Always the current table, whatever the birth date.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve_current(&self, place: &str) -> Result<Option<u64>> {
        self.current.resolve(place).await
    }

    pub fn clear(&self) {
        self.current.clear();
        self.historical.clear();
    }
}
