//! Aligned series for the chart and pie views.
//!
//! Every array in a [`ChartSeries`] has one slot per category, in ascending
//! chronological order. Renderers stack the four components, mark the total,
//! and draw `unattributed` as an outlined segment.

use crate::aggregator::Aggregator;
use crate::data_structures::{Snapshot, TouComponent, TouComponents, UsageRecord};
use crate::periods::extract_years;
use crate::reconcile::{Reconciliation, ReconciliationEngine};
use crate::statistics::summarize;
use chrono::Datelike;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    categories: Vec<String>,
    valley: Vec<f64>,
    peak: Vec<f64>,
    normal: Vec<f64>,
    sharp: Vec<f64>,
    total: Vec<f64>,
    cost: Vec<f64>,
    unattributed: Vec<f64>,
    balanced: Vec<bool>,
}

impl ChartSeries {
    fn push(
        &mut self,
        category: String,
        record: Option<&UsageRecord>,
        reconciliation: Option<Reconciliation>,
    ) {
        let components = record.map(|r| *r.components()).unwrap_or_default();

        self.categories.push(category);
        self.valley.push(components.valley());
        self.peak.push(components.peak());
        self.normal.push(components.normal());
        self.sharp.push(components.sharp());
        self.total.push(record.map_or(0.0, |r| r.usage()));
        self.cost.push(record.map_or(0.0, |r| r.cost()));
        self.unattributed
            .push(reconciliation.map_or(0.0, |r| r.unattributed()));
        self.balanced
            .push(reconciliation.map_or(true, |r| r.is_balanced()));
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn component(&self, component: TouComponent) -> &[f64] {
        match component {
            TouComponent::Valley => &self.valley,
            TouComponent::Peak => &self.peak,
            TouComponent::Normal => &self.normal,
            TouComponent::Sharp => &self.sharp,
        }
    }

    pub fn total(&self) -> &[f64] {
        &self.total
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn unattributed(&self) -> &[f64] {
        &self.unattributed
    }

    pub fn balanced(&self) -> &[bool] {
        &self.balanced
    }

    /// Components with at least one positive value, in legend order.
    pub fn active_components(&self) -> Vec<TouComponent> {
        TouComponent::ALL
            .into_iter()
            .filter(|c| self.component(*c).iter().any(|v| *v > 0.0))
            .collect()
    }

    pub fn max_cost(&self) -> f64 {
        self.cost.iter().copied().fold(0.0, f64::max)
    }

    pub fn max_total(&self) -> f64 {
        self.total.iter().copied().fold(0.0, f64::max)
    }
}

/// One slice of a pie breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Component(TouComponent),
    Unattributed,
}

impl SliceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SliceKind::Component(component) => component.name(),
            SliceKind::Unattributed => "Unattributed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slice {
    pub kind: SliceKind,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    slices: Vec<Slice>,
    reconciliation: Reconciliation,
    cost: f64,
}

impl Breakdown {
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Share of `slice` in the whole pie, 0 for an empty pie.
    pub fn share(&self, slice: &Slice) -> f64 {
        let whole: f64 = self.slices.iter().map(|s| s.value).sum();
        if whole > 0.0 {
            slice.value / whole
        } else {
            0.0
        }
    }
}

pub struct SeriesBuilder<'a> {
    engine: &'a ReconciliationEngine,
    aggregator: Aggregator,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(engine: &'a ReconciliationEngine) -> Self {
        Self {
            engine,
            aggregator: Aggregator::new(),
        }
    }

    /// One slot per available year, oldest first.
    pub fn yearly(&self, snapshot: &Snapshot) -> ChartSeries {
        let mut series = ChartSeries::default();
        let mut years = extract_years(snapshot.yearlist(), snapshot.daylist());
        years.reverse();

        for year in years {
            let record = self.aggregator.year_record(year, snapshot);
            let reconciliation = record.as_ref().map(|r| self.engine.reconcile_record(r));
            series.push(year.to_string(), record.as_ref(), reconciliation);
        }

        series
    }

    /// Always twelve slots, January first; months without data are zero.
    pub fn monthly(&self, snapshot: &Snapshot, year: i32) -> ChartSeries {
        let mut series = ChartSeries::default();

        for month in 1..=12 {
            let record = self.aggregator.month_record(year, month, snapshot);
            let reconciliation = record.as_ref().map(|r| self.engine.reconcile_record(r));
            series.push(month.to_string(), record.as_ref(), reconciliation);
        }

        series
    }

    /// One slot per recorded day of the month, labelled by day-of-month.
    pub fn daily(&self, snapshot: &Snapshot, year: i32, month: u32) -> ChartSeries {
        let mut series = ChartSeries::default();

        for record in self.aggregator.days_in_month(year, month, snapshot) {
            let label = record
                .date()
                .map(|d| d.day().to_string())
                .unwrap_or_default();
            series.push(label, Some(record), None);
        }

        series
    }

    pub fn breakdown(&self, record: &UsageRecord) -> Breakdown {
        let reconciliation = self.engine.reconcile_record(record);
        self.build_breakdown(record.components(), reconciliation, record.cost())
    }

    /// Breakdown for a single year, derived from days if the rollup is missing.
    pub fn year_breakdown(&self, snapshot: &Snapshot, year: i32) -> Option<Breakdown> {
        self.aggregator
            .year_record(year, snapshot)
            .map(|record| self.breakdown(&record))
    }

    /// Every available year summed and reconciled at the year tolerance.
    /// Years without a rollup are derived from their days, as in [`Self::yearly`].
    pub fn total_breakdown(&self, snapshot: &Snapshot) -> Breakdown {
        let years: Vec<UsageRecord> = extract_years(snapshot.yearlist(), snapshot.daylist())
            .into_iter()
            .filter_map(|year| self.aggregator.year_record(year, snapshot))
            .collect();
        let summary = summarize(&years);
        let reconciliation = summary.reconcile(self.engine, self.engine.tolerances().year);
        self.build_breakdown(summary.components(), reconciliation, summary.cost())
    }

    fn build_breakdown(
        &self,
        components: &TouComponents,
        reconciliation: Reconciliation,
        cost: f64,
    ) -> Breakdown {
        let mut slices: Vec<Slice> = TouComponent::ALL
            .into_iter()
            .map(|c| Slice {
                kind: SliceKind::Component(c),
                value: components.get(c),
            })
            .filter(|s| s.value > 0.0)
            .collect();

        let unattributed = reconciliation.unattributed();
        if unattributed > 0.0 {
            slices.push(Slice {
                kind: SliceKind::Unattributed,
                value: unattributed,
            });
        }

        Breakdown {
            slices,
            reconciliation,
            cost,
        }
    }
}
