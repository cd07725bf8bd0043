use crate::aggregator::Aggregator;
use crate::cache::{CacheOutcome, SnapshotCache};
use crate::calendar::{CalendarMonth, DayDetail, MonthStats};
use crate::config::EngineConfig;
use crate::data_structures::{Snapshot, UsageTotals};
use crate::loader::DataLoader;
use crate::periods::{extract_months, extract_years};
use crate::reconcile::ReconciliationEngine;
use crate::series::{Breakdown, ChartSeries, SeriesBuilder};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Ties the pipeline together: raw attributes go through the cache policy,
/// and every view is derived from the cached snapshot on request.
pub struct UsageDashboard {
    cache: SnapshotCache,
    available_years: Vec<i32>,
    engine: ReconciliationEngine,
    aggregator: Aggregator,
    loader: DataLoader,
}

impl UsageDashboard {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cache: SnapshotCache::new(config.cache_policy()),
            available_years: Vec::new(),
            engine: ReconciliationEngine::with_tolerances(config.tolerances()),
            aggregator: Aggregator::new(),
            loader: DataLoader::new(),
        }
    }

    pub fn ingest(&mut self, attributes: &Value, now: DateTime<Utc>) -> CacheOutcome {
        let snapshot = self.loader.parse_document(attributes);
        self.observe(snapshot, now)
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, now: DateTime<Utc>) -> Result<CacheOutcome> {
        let snapshot = self.loader.load_from_file(path)?;
        Ok(self.observe(snapshot, now))
    }

    pub fn observe(&mut self, snapshot: Snapshot, now: DateTime<Utc>) -> CacheOutcome {
        let outcome = self.cache.observe(snapshot, now);
        if outcome.is_refreshed() {
            let snapshot = outcome.snapshot();
            self.available_years = extract_years(snapshot.yearlist(), snapshot.daylist());
        }
        outcome
    }

    /// Forgets the cached snapshot; the next observation is always applied.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.cache.snapshot()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.cache.entry().map(|entry| entry.last_update())
    }

    pub fn available_years(&self) -> &[i32] {
        &self.available_years
    }

    pub fn available_months(&self, year: i32) -> Vec<u32> {
        self.snapshot()
            .map(|s| extract_months(s.monthlist(), s.daylist(), year))
            .unwrap_or_default()
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn month_total(&self, year: i32, month: u32) -> UsageTotals {
        self.with_snapshot(|s| self.aggregator.month_total(year, month, s))
    }

    pub fn year_total(&self, year: i32) -> UsageTotals {
        self.with_snapshot(|s| self.aggregator.year_total(year, s))
    }

    pub fn month_stats(&self, year: i32, month: u32) -> MonthStats {
        self.with_snapshot(|s| MonthStats::compute(&self.aggregator, year, month, s))
    }

    pub fn yearly_series(&self) -> ChartSeries {
        self.with_snapshot(|s| self.builder().yearly(s))
    }

    pub fn monthly_series(&self, year: i32) -> ChartSeries {
        self.with_snapshot(|s| self.builder().monthly(s, year))
    }

    pub fn daily_series(&self, year: i32, month: u32) -> ChartSeries {
        self.with_snapshot(|s| self.builder().daily(s, year, month))
    }

    pub fn year_breakdown(&self, year: i32) -> Option<Breakdown> {
        self.snapshot()
            .and_then(|s| self.builder().year_breakdown(s, year))
    }

    pub fn total_breakdown(&self) -> Breakdown {
        self.with_snapshot(|s| self.builder().total_breakdown(s))
    }

    pub fn calendar(&self, year: i32, month: u32, today: NaiveDate) -> Option<CalendarMonth> {
        self.with_snapshot(|s| CalendarMonth::build(year, month, s, today))
    }

    pub fn day_detail(&self, date: NaiveDate) -> Option<DayDetail> {
        self.snapshot()
            .and_then(|s| DayDetail::build(&self.builder(), date, s))
    }

    pub fn record_count(&self) -> usize {
        self.snapshot().map_or(0, |s| s.record_count())
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().map_or(true, |s| s.is_empty())
    }

    fn builder(&self) -> SeriesBuilder<'_> {
        SeriesBuilder::new(&self.engine)
    }

    fn with_snapshot<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Snapshot) -> T,
    {
        match self.snapshot() {
            Some(snapshot) => f(snapshot),
            None => f(&Snapshot::default()),
        }
    }
}

impl Default for UsageDashboard {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
