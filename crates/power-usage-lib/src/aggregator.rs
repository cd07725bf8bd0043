use crate::data_structures::{Granularity, Snapshot, TouComponents, UsageRecord, UsageTotals};
use chrono::Datelike;

/// Month and year rollups.
///
/// An explicit monthly or yearly record is authoritative. When the source
/// omits it, the rollup is derived from the matching day records.
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn month_total(&self, year: i32, month: u32, snapshot: &Snapshot) -> UsageTotals {
        match snapshot.month(year, month) {
            Some(record) => UsageTotals::new(record.usage(), record.cost()),
            None => self.sum_days(snapshot, |y, m| y == year && m == month),
        }
    }

    pub fn year_total(&self, year: i32, snapshot: &Snapshot) -> UsageTotals {
        match snapshot.year(year) {
            Some(record) => UsageTotals::new(record.usage(), record.cost()),
            None => self.sum_days(snapshot, |y, _| y == year),
        }
    }

    /// The month's record, or one derived from its days. `None` when neither
    /// exists.
    pub fn month_record(&self, year: i32, month: u32, snapshot: &Snapshot) -> Option<UsageRecord> {
        if let Some(record) = snapshot.month(year, month) {
            return Some(record.clone());
        }

        self.derive_record(
            Granularity::Month,
            format!("{:04}-{:02}", year, month),
            snapshot,
            |y, m| y == year && m == month,
        )
    }

    pub fn year_record(&self, year: i32, snapshot: &Snapshot) -> Option<UsageRecord> {
        if let Some(record) = snapshot.year(year) {
            return Some(record.clone());
        }

        self.derive_record(Granularity::Year, year.to_string(), snapshot, |y, _| {
            y == year
        })
    }

    /// Day records falling in `(year, month)`, ordered by date.
    pub fn days_in_month<'a>(
        &self,
        year: i32,
        month: u32,
        snapshot: &'a Snapshot,
    ) -> Vec<&'a UsageRecord> {
        let mut days: Vec<_> = snapshot
            .daylist()
            .iter()
            .filter_map(|record| record.date().map(|date| (date, record)))
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .collect();

        days.sort_by_key(|(date, _)| *date);
        days.into_iter().map(|(_, record)| record).collect()
    }

    fn sum_days<F>(&self, snapshot: &Snapshot, matches: F) -> UsageTotals
    where
        F: Fn(i32, u32) -> bool,
    {
        let mut totals = UsageTotals::default();

        for record in snapshot.daylist() {
            if let Some(date) = record.date() {
                if matches(date.year(), date.month()) {
                    totals.add(record.usage(), record.cost());
                }
            }
        }

        totals
    }

    fn derive_record<F>(
        &self,
        granularity: Granularity,
        period_key: String,
        snapshot: &Snapshot,
        matches: F,
    ) -> Option<UsageRecord>
    where
        F: Fn(i32, u32) -> bool,
    {
        let mut components = TouComponents::default();
        let mut total: Option<f64> = None;
        let mut cost = 0.0;
        let mut matched = false;

        for record in snapshot.daylist() {
            let date = match record.date() {
                Some(date) => date,
                None => continue,
            };
            if !matches(date.year(), date.month()) {
                continue;
            }

            matched = true;
            components.add(record.components());
            cost += record.cost();
            if let Some(day_total) = record.total() {
                total = Some(total.unwrap_or(0.0) + day_total);
            }
        }

        matched.then(|| UsageRecord::new(granularity, period_key, components, total, cost))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(date: NaiveDate, total: f64, cost: f64) -> UsageRecord {
        UsageRecord::new(
            Granularity::Day,
            date.format("%Y-%m-%d").to_string(),
            TouComponents::new(total / 2.0, total / 2.0, 0.0, 0.0),
            Some(total),
            cost,
        )
    }

    fn march_2025_days() -> Vec<UsageRecord> {
        (1..=31)
            .map(|d| day(NaiveDate::from_ymd_opt(2025, 3, d).unwrap(), 10.0, 5.0))
            .collect()
    }

    #[test]
    fn test_month_total_falls_back_to_days() {
        let aggregator = Aggregator::new();
        let snapshot = Snapshot::new(march_2025_days(), vec![], vec![]);

        let totals = aggregator.month_total(2025, 3, &snapshot);
        assert_eq!(totals.usage(), 310.0);
        assert_eq!(totals.cost(), 155.0);
    }

    #[test]
    fn test_month_record_is_authoritative() {
        let aggregator = Aggregator::new();
        let month = UsageRecord::new(
            Granularity::Month,
            "2025-03",
            TouComponents::default(),
            Some(999.0),
            42.0,
        );
        let snapshot = Snapshot::new(march_2025_days(), vec![month], vec![]);

        let totals = aggregator.month_total(2025, 3, &snapshot);
        assert_eq!(totals.usage(), 999.0);
        assert_eq!(totals.cost(), 42.0);
    }

    #[test]
    fn test_year_total_falls_back_to_days() {
        let aggregator = Aggregator::new();
        let mut days = march_2025_days();
        days.push(day(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(), 15.0, 1.0));
        days.push(day(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 100.0, 1.0));
        let snapshot = Snapshot::new(days, vec![], vec![]);

        assert_eq!(aggregator.year_total(2025, &snapshot).usage(), 325.0);
        assert_eq!(aggregator.year_total(2024, &snapshot).usage(), 100.0);
    }

    #[test]
    fn test_year_record_is_authoritative() {
        let aggregator = Aggregator::new();
        let year = UsageRecord::new(
            Granularity::Year,
            "2025",
            TouComponents::default(),
            Some(5000.0),
            2500.0,
        );
        let snapshot = Snapshot::new(march_2025_days(), vec![], vec![year]);

        assert_eq!(aggregator.year_total(2025, &snapshot).usage(), 5000.0);
    }

    #[test]
    fn test_no_matching_records_is_zero() {
        let aggregator = Aggregator::new();
        let snapshot = Snapshot::default();

        assert_eq!(aggregator.month_total(2025, 3, &snapshot), UsageTotals::default());
        assert_eq!(aggregator.year_total(2025, &snapshot), UsageTotals::default());
        assert!(aggregator.month_record(2025, 3, &snapshot).is_none());
    }

    #[test]
    fn test_malformed_day_keys_are_ignored() {
        let aggregator = Aggregator::new();
        let broken = UsageRecord::new(
            Granularity::Day,
            "2025/03/01",
            TouComponents::default(),
            Some(1000.0),
            0.0,
        );
        let mut days = march_2025_days();
        days.push(broken);
        let snapshot = Snapshot::new(days, vec![], vec![]);

        assert_eq!(aggregator.month_total(2025, 3, &snapshot).usage(), 310.0);
    }

    #[test]
    fn test_derived_month_record_sums_components() {
        let aggregator = Aggregator::new();
        let snapshot = Snapshot::new(march_2025_days(), vec![], vec![]);

        let record = aggregator.month_record(2025, 3, &snapshot).unwrap();
        assert_eq!(record.granularity(), Granularity::Month);
        assert_eq!(record.period_key(), "2025-03");
        assert_eq!(record.components().valley(), 155.0);
        assert_eq!(record.components().sum(), 310.0);
        assert_eq!(record.total(), Some(310.0));
    }

    #[test]
    fn test_derived_record_without_day_totals_has_no_total() {
        let aggregator = Aggregator::new();
        let no_total = UsageRecord::new(
            Granularity::Day,
            "2023-06-01",
            TouComponents::new(1.0, 0.0, 0.0, 0.0),
            None,
            0.3,
        );
        let snapshot = Snapshot::new(vec![no_total], vec![], vec![]);

        let record = aggregator.year_record(2023, &snapshot).unwrap();
        assert_eq!(record.total(), None);
        assert_eq!(record.cost(), 0.3);
    }

    #[test]
    fn test_days_in_month_sorted() {
        let aggregator = Aggregator::new();
        let mut days = march_2025_days();
        days.reverse();
        let snapshot = Snapshot::new(days, vec![], vec![]);

        let ordered = aggregator.days_in_month(2025, 3, &snapshot);
        assert_eq!(ordered.len(), 31);
        assert_eq!(ordered[0].period_key(), "2025-03-01");
        assert_eq!(ordered[30].period_key(), "2025-03-31");
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let aggregator = Aggregator::new();
        let snapshot = Snapshot::new(march_2025_days(), vec![], vec![]);

        let a = aggregator.month_total(2025, 3, &snapshot);
        let b = aggregator.month_total(2025, 3, &snapshot);
        assert_eq!(a.usage().to_bits(), b.usage().to_bits());
        assert_eq!(a.cost().to_bits(), b.cost().to_bits());
    }
}
