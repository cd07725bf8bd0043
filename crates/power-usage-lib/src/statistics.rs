use crate::data_structures::{TouComponents, UsageRecord};
use crate::reconcile::{Reconciliation, ReconciliationEngine};
use serde::Serialize;

/// Element-wise totals across a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    components: TouComponents,
    total: f64,
    cost: f64,
}

impl UsageSummary {
    pub fn components(&self) -> &TouComponents {
        &self.components
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn reconcile(&self, engine: &ReconciliationEngine, tolerance: f64) -> Reconciliation {
        engine.reconcile_parts(&self.components, Some(self.total), tolerance)
    }
}

pub fn summarize(records: &[UsageRecord]) -> UsageSummary {
    let mut summary = UsageSummary::default();

    for record in records {
        summary.components.add(record.components());
        summary.total += record.usage();
        summary.cost += record.cost();
    }

    summary
}

/// Per-record mean of [`summarize`]; all zero for an empty set.
pub fn average(records: &[UsageRecord]) -> UsageSummary {
    if records.is_empty() {
        return UsageSummary::default();
    }

    let summary = summarize(records);
    let count = records.len() as f64;

    UsageSummary {
        components: summary.components.scaled(1.0 / count),
        total: summary.total / count,
        cost: summary.cost / count,
    }
}
