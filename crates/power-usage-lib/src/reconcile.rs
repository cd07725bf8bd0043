use crate::data_structures::{Granularity, TouComponents, UsageRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MONTH_TOLERANCE: f64 = 10.0;
pub const DEFAULT_YEAR_TOLERANCE: f64 = 200.0;

/// Allowed gap (kWh) between a period's total and the sum of its components.
///
/// Drift grows with the aggregation span, so each granularity has its own
/// tolerance. Days are not reconciled unless a tolerance is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub day: Option<f64>,
    pub month: f64,
    pub year: f64,
}

impl Tolerances {
    pub fn for_granularity(&self, granularity: Granularity) -> Option<f64> {
        match granularity {
            Granularity::Day => self.day,
            Granularity::Month => Some(self.month),
            Granularity::Year => Some(self.year),
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            day: None,
            month: DEFAULT_MONTH_TOLERANCE,
            year: DEFAULT_YEAR_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reconciliation {
    component_sum: f64,
    total: Option<f64>,
    remainder: Option<f64>,
    balanced: bool,
}

impl Reconciliation {
    pub fn component_sum(&self) -> f64 {
        self.component_sum
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// Signed `total - component_sum`; `None` without a total.
    pub fn remainder(&self) -> Option<f64> {
        self.remainder
    }

    pub fn is_balanced(&self) -> bool {
        self.balanced
    }

    /// Remainder floored at zero.
    pub fn display_remainder(&self) -> f64 {
        self.remainder.map_or(0.0, |r| r.max(0.0))
    }

    /// Usage the components fail to explain. Non-zero only for an
    /// unbalanced period whose total exceeds its components.
    pub fn unattributed(&self) -> f64 {
        match self.remainder {
            Some(remainder) if !self.balanced && remainder > 0.0 => remainder,
            _ => 0.0,
        }
    }
}

pub struct ReconciliationEngine {
    tolerances: Tolerances,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::with_tolerances(Tolerances::default())
    }

    pub fn with_tolerances(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn reconcile(&self, record: &UsageRecord, tolerance: f64) -> Reconciliation {
        let result = self.reconcile_parts(record.components(), record.total(), tolerance);
        if !result.balanced {
            let remainder = result.remainder.unwrap_or_default();
            debug!(
                period = record.period_key(),
                granularity = record.granularity().name(),
                remainder,
                tolerance,
                "{}",
                imbalance_message(remainder)
            );
        }
        result
    }

    /// Reconciles with the tolerance configured for the record's granularity.
    pub fn reconcile_record(&self, record: &UsageRecord) -> Reconciliation {
        let tolerance = self
            .tolerances
            .for_granularity(record.granularity())
            .unwrap_or(f64::INFINITY);
        self.reconcile(record, tolerance)
    }

    pub fn reconcile_parts(
        &self,
        components: &TouComponents,
        total: Option<f64>,
        tolerance: f64,
    ) -> Reconciliation {
        let component_sum = components.sum();

        match total {
            Some(total) => {
                let remainder = total - component_sum;
                Reconciliation {
                    component_sum,
                    total: Some(total),
                    remainder: Some(remainder),
                    balanced: remainder.abs() <= tolerance,
                }
            }
            None => Reconciliation {
                component_sum,
                total: None,
                remainder: None,
                balanced: true,
            },
        }
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn imbalance_message(remainder: f64) -> &'static str {
    if remainder < 0.0 {
        "components exceed reported total"
    } else {
        "components under-explain reported total"
    }
}
