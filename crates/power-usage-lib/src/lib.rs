pub mod aggregator;
pub mod cache;
pub mod calendar;
pub mod change;
pub mod config;
pub mod dashboard;
pub mod data_structures;
pub mod loader;
pub mod periods;
pub mod reconcile;
pub mod series;
pub mod statistics;

pub use aggregator::Aggregator;
pub use cache::{CacheEntry, CacheOutcome, CachePolicy, RefreshReason, SnapshotCache};
pub use calendar::{CalendarDay, CalendarMonth, DayDetail, MonthStats};
pub use change::{ChangeDetector, SnapshotDiff};
pub use config::EngineConfig;
pub use dashboard::UsageDashboard;
pub use data_structures::{
    Granularity, Snapshot, TouComponent, TouComponents, UsageRecord, UsageTotals,
};
pub use loader::DataLoader;
pub use periods::{extract_months, extract_years};
pub use reconcile::{Reconciliation, ReconciliationEngine, Tolerances};
pub use series::{Breakdown, ChartSeries, SeriesBuilder, Slice, SliceKind};
pub use statistics::{average, summarize, UsageSummary};

pub use anyhow::Result;
pub use chrono::{DateTime, Duration, NaiveDate, Utc};

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::dashboard::UsageDashboard;
    pub use crate::data_structures::{Granularity, Snapshot, TouComponent, UsageRecord};
    pub use crate::series::ChartSeries;
    pub use anyhow::Result;
    pub use chrono::{DateTime, NaiveDate, Utc};
}
