use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::periods::{parse_day_key, parse_month_key, parse_year_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Attribute list the host publishes records of this granularity under.
    pub fn list_key(&self) -> &'static str {
        match self {
            Granularity::Day => "daylist",
            Granularity::Month => "monthlist",
            Granularity::Year => "yearlist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouComponent {
    Valley,
    Peak,
    Normal,
    Sharp,
}

impl TouComponent {
    pub const ALL: [TouComponent; 4] = [
        TouComponent::Valley,
        TouComponent::Peak,
        TouComponent::Normal,
        TouComponent::Sharp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TouComponent::Valley => "Valley",
            TouComponent::Peak => "Peak",
            TouComponent::Normal => "Normal",
            TouComponent::Sharp => "Sharp",
        }
    }
}

/// Usage split across the four time-of-use tariff buckets, in kWh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TouComponents {
    valley: f64,
    peak: f64,
    normal: f64,
    sharp: f64,
}

impl TouComponents {
    /// Negative or non-finite inputs are stored as 0.
    pub fn new(valley: f64, peak: f64, normal: f64, sharp: f64) -> Self {
        Self {
            valley: non_negative(valley),
            peak: non_negative(peak),
            normal: non_negative(normal),
            sharp: non_negative(sharp),
        }
    }

    pub fn valley(&self) -> f64 {
        self.valley
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn normal(&self) -> f64 {
        self.normal
    }

    pub fn sharp(&self) -> f64 {
        self.sharp
    }

    pub fn get(&self, component: TouComponent) -> f64 {
        match component {
            TouComponent::Valley => self.valley,
            TouComponent::Peak => self.peak,
            TouComponent::Normal => self.normal,
            TouComponent::Sharp => self.sharp,
        }
    }

    pub fn sum(&self) -> f64 {
        self.valley + self.peak + self.normal + self.sharp
    }

    pub fn add(&mut self, other: &TouComponents) {
        self.valley += other.valley;
        self.peak += other.peak;
        self.normal += other.normal;
        self.sharp += other.sharp;
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.valley * factor,
            self.peak * factor,
            self.normal * factor,
            self.sharp * factor,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.sum() == 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// One usage record of a given granularity, keyed by `YYYY-MM-DD`, `YYYY-MM`
/// or `YYYY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    granularity: Granularity,
    period_key: String,
    components: TouComponents,
    total: Option<f64>,
    cost: f64,
}

impl UsageRecord {
    pub fn new(
        granularity: Granularity,
        period_key: impl Into<String>,
        components: TouComponents,
        total: Option<f64>,
        cost: f64,
    ) -> Self {
        Self {
            granularity,
            period_key: period_key.into(),
            components,
            total,
            cost,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn period_key(&self) -> &str {
        &self.period_key
    }

    pub fn components(&self) -> &TouComponents {
        &self.components
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// Reported total, 0 when the source omitted it.
    pub fn usage(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self.granularity {
            Granularity::Day => parse_day_key(&self.period_key),
            _ => None,
        }
    }

    /// Calendar year the record belongs to, if its key parses.
    pub fn year(&self) -> Option<i32> {
        match self.granularity {
            Granularity::Day => parse_day_key(&self.period_key).map(|d| d.year()),
            Granularity::Month => parse_month_key(&self.period_key).map(|(y, _)| y),
            Granularity::Year => parse_year_key(&self.period_key),
        }
    }

    /// `(year, month)` for day and month records.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        match self.granularity {
            Granularity::Day => parse_day_key(&self.period_key).map(|d| (d.year(), d.month())),
            Granularity::Month => parse_month_key(&self.period_key),
            Granularity::Year => None,
        }
    }
}

/// Usage and cost for one period, as shown in the stats strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    usage: f64,
    cost: f64,
}

impl UsageTotals {
    pub fn new(usage: f64, cost: f64) -> Self {
        Self { usage, cost }
    }

    pub fn usage(&self) -> f64 {
        self.usage
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn add(&mut self, usage: f64, cost: f64) {
        self.usage += usage;
        self.cost += cost;
    }

    pub fn average_price(&self) -> f64 {
        if self.usage > 0.0 {
            self.cost / self.usage
        } else {
            0.0
        }
    }
}

/// The three record collections captured at one observation.
///
/// Equality is field-for-field and sensitive to list order: a reordered list
/// compares as different.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    daylist: Vec<UsageRecord>,
    monthlist: Vec<UsageRecord>,
    yearlist: Vec<UsageRecord>,
}

impl Snapshot {
    pub fn new(
        daylist: Vec<UsageRecord>,
        monthlist: Vec<UsageRecord>,
        yearlist: Vec<UsageRecord>,
    ) -> Self {
        Self {
            daylist,
            monthlist,
            yearlist,
        }
    }

    pub fn daylist(&self) -> &[UsageRecord] {
        &self.daylist
    }

    pub fn monthlist(&self) -> &[UsageRecord] {
        &self.monthlist
    }

    pub fn yearlist(&self) -> &[UsageRecord] {
        &self.yearlist
    }

    pub fn list(&self, granularity: Granularity) -> &[UsageRecord] {
        match granularity {
            Granularity::Day => &self.daylist,
            Granularity::Month => &self.monthlist,
            Granularity::Year => &self.yearlist,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&UsageRecord> {
        self.daylist.iter().find(|r| r.date() == Some(date))
    }

    pub fn month(&self, year: i32, month: u32) -> Option<&UsageRecord> {
        self.monthlist
            .iter()
            .find(|r| r.year_month() == Some((year, month)))
    }

    pub fn year(&self, year: i32) -> Option<&UsageRecord> {
        self.yearlist.iter().find(|r| r.year() == Some(year))
    }

    pub fn is_empty(&self) -> bool {
        self.daylist.is_empty() && self.monthlist.is_empty() && self.yearlist.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.daylist.len() + self.monthlist.len() + self.yearlist.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_clamp_negative_and_nan() {
        let components = TouComponents::new(-5.0, f64::NAN, 3.0, f64::INFINITY);
        assert_eq!(components.valley(), 0.0);
        assert_eq!(components.peak(), 0.0);
        assert_eq!(components.normal(), 3.0);
        assert_eq!(components.sharp(), 0.0);
        assert_eq!(components.sum(), 3.0);
    }

    #[test]
    fn test_record_year_month() {
        let day = UsageRecord::new(
            Granularity::Day,
            "2025-03-14",
            TouComponents::default(),
            Some(1.0),
            0.5,
        );
        assert_eq!(day.year(), Some(2025));
        assert_eq!(day.year_month(), Some((2025, 3)));

        let month = UsageRecord::new(
            Granularity::Month,
            "2024-12",
            TouComponents::default(),
            None,
            0.0,
        );
        assert_eq!(month.year_month(), Some((2024, 12)));
        assert_eq!(month.usage(), 0.0);

        let broken = UsageRecord::new(
            Granularity::Day,
            "yesterday",
            TouComponents::default(),
            None,
            0.0,
        );
        assert_eq!(broken.year(), None);
    }

    #[test]
    fn test_average_price_guards_zero_usage() {
        assert_eq!(UsageTotals::new(0.0, 12.0).average_price(), 0.0);
        assert_eq!(UsageTotals::new(10.0, 5.0).average_price(), 0.5);
    }

    #[test]
    fn test_snapshot_equality_is_order_sensitive() {
        let a = UsageRecord::new(
            Granularity::Year,
            "2023",
            TouComponents::default(),
            Some(1.0),
            0.0,
        );
        let b = UsageRecord::new(
            Granularity::Year,
            "2024",
            TouComponents::default(),
            Some(2.0),
            0.0,
        );
        let first = Snapshot::new(vec![], vec![], vec![a.clone(), b.clone()]);
        let reordered = Snapshot::new(vec![], vec![], vec![b, a]);
        assert_ne!(first, reordered);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_snapshot_lookup_returns_first_match() {
        let first = UsageRecord::new(
            Granularity::Month,
            "2025-03",
            TouComponents::default(),
            Some(1.0),
            0.0,
        );
        let duplicate = UsageRecord::new(
            Granularity::Month,
            "2025-03",
            TouComponents::default(),
            Some(2.0),
            0.0,
        );
        let snapshot = Snapshot::new(vec![], vec![first, duplicate], vec![]);
        assert_eq!(snapshot.month(2025, 3).and_then(|r| r.total()), Some(1.0));
        assert!(snapshot.month(2025, 4).is_none());
    }
}
