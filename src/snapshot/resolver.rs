use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::defaults::{apply_office_holders, default_record};
use super::fields::Field;
use super::record::SnapshotRecord;
use super::table::{map_table, DatedSnapshots};
use crate::errors::{Error, Result};
use crate::fetch::TextFetcher;
use crate::history::{Clock, MetalsBackup, MetalsBackupStore, SnapshotCache};
use crate::memo::Memo;
use crate::process::{parse_csv, parse_iso_date};

/// Resolves "today's facts" through a layered fallback chain:
///
/// 1. durable cache
/// 2. live sheet (fetch + parse + orientation detection + aliasing)
/// 3. durable cache again, if it carries both metal prices
/// 4. static defaults with the permanent metals backup
/// 5. static defaults without any metal price
///
/// [`SnapshotResolver::resolve`] never fails.
pub struct SnapshotResolver {
    fetcher: Arc<dyn TextFetcher>,
    cache: SnapshotCache,
    backup: MetalsBackupStore,
    clock: Arc<dyn Clock>,
    snapshot_url: String,
    historical_url: Option<String>,
    dated: Memo<DatedSnapshots>,
}

impl SnapshotResolver {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        cache: SnapshotCache,
        backup: MetalsBackupStore,
        clock: Arc<dyn Clock>,
        snapshot_url: impl Into<String>,
        historical_url: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            backup,
            clock,
            snapshot_url: snapshot_url.into(),
            historical_url,
            dated: Memo::new(),
        }
    }

    /// Best-effort snapshot. Fetch and parse failures are absorbed by the chain.
    #[instrument(level = "info", skip(self), fields(url = %self.snapshot_url))]
    pub async fn resolve(&self) -> SnapshotRecord {
        // ─── 1) fast path ────────────────────────────────────────────────
        if let Some(mut rec) = self.cache.get() {
            apply_office_holders(&mut rec);
            return rec;
        }

        // ─── 2) live sheet ───────────────────────────────────────────────
        match self.fetch_live().await {
            Ok(rec) => return rec,
            Err(e) => warn!(error = %e, "live snapshot unavailable; falling back"),
        }

        // ─── 3) a concurrent fetch may have filled the cache meanwhile ───
        if let Some(mut rec) = self.cache.get().filter(SnapshotRecord::has_metals) {
            info!("using cached snapshot after live failure");
            apply_office_holders(&mut rec);
            return rec;
        }

        // ─── 4) defaults + permanent metals backup ───────────────────────
        let mut rec = default_record();
        if let Some(backup) = self.backup.load() {
            info!(fetched_at = %backup.fetched_at, "using metals backup over defaults");
            backup.apply_to(&mut rec);
            return rec;
        }

        // ─── 5) defaults, metal prices withheld ──────────────────────────
        warn!("no snapshot source available; serving defaults without metal prices");
        for field in Field::METALS {
            rec.remove(field);
        }
        rec
    }

    async fn fetch_live(&self) -> Result<SnapshotRecord> {
        let text = self.fetcher.fetch_text(&self.snapshot_url).await?;
        let rows = parse_csv(&text);
        let mut rec = map_table(&rows).map_err(|m| Error::parse(&self.snapshot_url, m))?;
        let live_metals = rec.has_metals();
        info!(
            rows = rows.len(),
            fields = rec.len(),
            live_metals,
            "fetched live snapshot"
        );

        let missing = rec.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "completing snapshot");
        }
        rec.fill_missing_from(&default_record());
        if !live_metals {
            if let Some(backup) = self.backup.load() {
                if !rec.contains(Field::GoldOz) {
                    rec.set(Field::GoldOz, backup.gold);
                }
                if !rec.contains(Field::SilverOz) {
                    rec.set(Field::SilverOz, backup.silver);
                }
            }
        }
        apply_office_holders(&mut rec);

        if let Err(e) = self.cache.put(&rec) {
            warn!(error = %e, "could not write snapshot cache");
        }
        if live_metals {
            self.save_backup(&rec);
        }
        Ok(rec)
    }

    fn save_backup(&self, rec: &SnapshotRecord) {
        let Some(backup) = MetalsBackup::from_record(rec, self.clock.now(), &self.snapshot_url)
        else {
            return;
        };
        match self.backup.save(&backup) {
            Ok(()) => debug!(gold = %backup.gold, silver = %backup.silver, "metals backup saved"),
            Err(e) => warn!(error = %e, "could not save metals backup"),
        }
    }

    /// Snapshot as of `iso_date`.
    ///
    /// Dates in the current year (or later), or any date when no dated sheet is
    /// configured, get the live snapshot. Earlier dates come from the dated
    /// sheet and keep the office holders it lists.
    #[instrument(level = "info", skip(self))]
    pub async fn snapshot_for_date(&self, iso_date: &str) -> Result<SnapshotRecord> {
        let date = parse_iso_date(iso_date)
            .ok_or_else(|| Error::parse("date", format!("unrecognised date {iso_date:?}")))?;
        let Some(url) = self.historical_url.as_deref() else {
            return Ok(self.resolve().await);
        };
        if date.year() >= self.clock.now().year() {
            return Ok(self.resolve().await);
        }

        match self.dated_table(url).await {
            Ok(table) => match table.closest(date.year()) {
                Some(rec) => Ok(rec.clone()),
                None => Ok(self.resolve().await),
            },
            Err(e) => {
                warn!(error = %e, "dated snapshot sheet unavailable; using live snapshot");
                Ok(self.resolve().await)
            }
        }
    }

    async fn dated_table(&self, url: &str) -> Result<Arc<DatedSnapshots>> {
        self.dated
            .get_or_try_init(|| async {
                let text = self.fetcher.fetch_text(url).await?;
                let table = DatedSnapshots::from_rows(&parse_csv(&text))
                    .map_err(|m| Error::parse(url, m))?;
                info!(years = table.len(), "loaded dated snapshot sheet");
                Ok::<_, Error>(table)
            })
            .await
    }

    /// Drop the durable snapshot cache and the in-memory dated sheet.
    /// The metals backup is left alone.
    pub fn clear(&self) -> Result<()> {
        self.dated.clear();
        self.cache.clear()
    }
}
