use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::Config;
use crate::errors::Result;
use crate::fetch::{HttpFetcher, TextFetcher};
use crate::history::{Clock, KeyValueStore, MetalsBackupStore, SnapshotCache, SystemClock};
use crate::population::{PopulationResolver, NOT_FOUND_MESSAGE};
use crate::snapshot::{SnapshotRecord, SnapshotResolver};

/// Everything a screen needs: today's facts, facts for a past date, and city
/// populations. Built once and shared.
pub struct DataService {
    snapshots: SnapshotResolver,
    population: PopulationResolver,
}

impl DataService {
    /// Production wiring: reqwest transport with the configured retry policy
    /// and the system clock.
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let fetcher = HttpFetcher::new(Client::new(), config.retry_policy());
        Self::with_parts(config, Arc::new(fetcher), store, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: &Config,
        fetcher: Arc<dyn TextFetcher>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = SnapshotCache::with_settings(
            store.clone(),
            clock.clone(),
            config.cache_ttl(),
            config.cache_format_version,
        );
        let snapshots = SnapshotResolver::new(
            fetcher.clone(),
            cache,
            MetalsBackupStore::new(store),
            clock,
            config.snapshot_url.clone(),
            config.historical_snapshot_url.clone(),
        );
        let population = PopulationResolver::new(
            fetcher,
            config.current_population_url.clone(),
            config.historical_population_url.clone(),
        );
        Self {
            snapshots,
            population,
        }
    }

    /// Never fails; see [`SnapshotResolver::resolve`] for the fallback order.
    pub async fn all_snapshot_values(&self) -> SnapshotRecord {
        self.snapshots.resolve().await
    }

    pub async fn snapshot_for_date(&self, iso_date: &str) -> Result<SnapshotRecord> {
        self.snapshots.snapshot_for_date(iso_date).await
    }

    /// `Ok(None)` is "not found": show [`DataService::not_found_message`].
    pub async fn population_for_city(&self, place: &str, dob: Option<&str>) -> Result<Option<u64>> {
        self.population.resolve_population(place, dob).await
    }

    pub async fn current_population_for_city(&self, place: &str) -> Result<Option<u64>> {
        self.population.resolve_current(place).await
    }

    /// Drop the durable snapshot cache and every in-memory table. The metals
    /// backup survives.
    #[instrument(level = "info", skip(self))]
    pub fn clear_cache(&self) -> Result<()> {
        self.snapshots.clear()?;
        self.population.clear();
        info!("caches cleared");
        Ok(())
    }

    pub fn not_found_message(&self) -> &'static str {
        NOT_FOUND_MESSAGE
    }
}
