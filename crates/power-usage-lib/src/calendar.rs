use crate::aggregator::Aggregator;
use crate::data_structures::{Snapshot, UsageRecord, UsageTotals};
use crate::series::{Breakdown, SeriesBuilder};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub usage: f64,
    pub cost: f64,
    pub has_data: bool,
    pub is_today: bool,
}

/// Month grid laid out Monday-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
    leading_blanks: u32,
    days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// `None` for an invalid `(year, month)`.
    pub fn build(year: i32, month: u32, snapshot: &Snapshot, today: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let leading_blanks = first.weekday().num_days_from_monday();

        let days = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| {
                let record = snapshot.day(date);
                let usage = record.map_or(0.0, |r| r.usage());
                CalendarDay {
                    day: date.day(),
                    date,
                    usage,
                    cost: record.map_or(0.0, |r| r.cost()),
                    has_data: usage > 0.0,
                    is_today: date == today,
                }
            })
            .collect();

        Some(Self {
            year,
            month,
            leading_blanks,
            days,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Empty cells before the 1st in a Monday-first week.
    pub fn leading_blanks(&self) -> u32 {
        self.leading_blanks
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    /// Rows of seven cells; `None` pads the first and last week.
    pub fn weeks(&self) -> Vec<[Option<&CalendarDay>; 7]> {
        let mut cells: Vec<Option<&CalendarDay>> = Vec::new();
        cells.extend((0..self.leading_blanks).map(|_| None));
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        cells
            .chunks(7)
            .map(|week| {
                let mut row = [None; 7];
                row.copy_from_slice(week);
                row
            })
            .collect()
    }
}

/// Totals for the selected month and its year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthStats {
    pub month: UsageTotals,
    pub year: UsageTotals,
}

impl MonthStats {
    pub fn compute(aggregator: &Aggregator, year: i32, month: u32, snapshot: &Snapshot) -> Self {
        Self {
            month: aggregator.month_total(year, month, snapshot),
            year: aggregator.year_total(year, snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    record: UsageRecord,
    breakdown: Breakdown,
    average_price: f64,
}

impl DayDetail {
    pub fn build(builder: &SeriesBuilder<'_>, date: NaiveDate, snapshot: &Snapshot) -> Option<Self> {
        let record = snapshot.day(date)?.clone();
        let breakdown = builder.breakdown(&record);
        let average_price = UsageTotals::new(record.usage(), record.cost()).average_price();

        Some(Self {
            record,
            breakdown,
            average_price,
        })
    }

    pub fn record(&self) -> &UsageRecord {
        &self.record
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    /// Cost per kWh for the day.
    pub fn average_price(&self) -> f64 {
        self.average_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{Granularity, TouComponents};
    use crate::reconcile::ReconciliationEngine;

    fn day(key: &str, total: f64, cost: f64) -> UsageRecord {
        UsageRecord::new(
            Granularity::Day,
            key,
            TouComponents::new(total / 2.0, total / 2.0, 0.0, 0.0),
            Some(total),
            cost,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_grid_monday_first() {
        // 2025-03-01 is a Saturday.
        let snapshot = Snapshot::new(vec![day("2025-03-03", 8.0, 4.0)], vec![], vec![]);
        let calendar = CalendarMonth::build(2025, 3, &snapshot, date(2025, 3, 3)).unwrap();

        assert_eq!(calendar.leading_blanks(), 5);
        assert_eq!(calendar.days().len(), 31);

        let third = &calendar.days()[2];
        assert_eq!(third.day, 3);
        assert!(third.has_data);
        assert!(third.is_today);
        assert_eq!(third.usage, 8.0);
        assert!(!calendar.days()[0].has_data);
    }

    #[test]
    fn test_calendar_weeks_are_padded() {
        let snapshot = Snapshot::default();
        let calendar = CalendarMonth::build(2025, 3, &snapshot, date(2000, 1, 1)).unwrap();

        let weeks = calendar.weeks();
        assert_eq!(weeks.len(), 6);
        assert!(weeks[0][4].is_none());
        assert_eq!(weeks[0][5].map(|d| d.day), Some(1));
        assert_eq!(weeks[5][0].map(|d| d.day), Some(31));
        assert!(weeks[5][1].is_none());
    }

    #[test]
    fn test_calendar_leap_february() {
        let calendar = CalendarMonth::build(2024, 2, &Snapshot::default(), date(2024, 2, 1)).unwrap();
        assert_eq!(calendar.days().len(), 29);
        assert_eq!(calendar.leading_blanks(), 3);
    }

    #[test]
    fn test_calendar_invalid_month() {
        assert!(CalendarMonth::build(2025, 13, &Snapshot::default(), date(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_month_stats() {
        let aggregator = Aggregator::new();
        let snapshot = Snapshot::new(
            vec![day("2025-03-01", 10.0, 5.0), day("2025-04-01", 20.0, 8.0)],
            vec![],
            vec![],
        );

        let stats = MonthStats::compute(&aggregator, 2025, 3, &snapshot);
        assert_eq!(stats.month.usage(), 10.0);
        assert_eq!(stats.year.usage(), 30.0);
        assert_eq!(stats.year.cost(), 13.0);
    }

    #[test]
    fn test_day_detail() {
        let engine = ReconciliationEngine::new();
        let builder = SeriesBuilder::new(&engine);
        let snapshot = Snapshot::new(vec![day("2025-03-01", 10.0, 5.0)], vec![], vec![]);

        let detail = DayDetail::build(&builder, date(2025, 3, 1), &snapshot).unwrap();
        assert_eq!(detail.average_price(), 0.5);
        assert_eq!(detail.breakdown().slices().len(), 2);
        assert!(DayDetail::build(&builder, date(2025, 3, 2), &snapshot).is_none());
    }
}
