use crate::data_structures::UsageRecord;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.trim().split_once('-')?;
    let year = parse_year_key(year)?;
    let month: u32 = month.parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

pub fn parse_year_key(key: &str) -> Option<i32> {
    let key = key.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Years present in the data, most recent first.
///
/// Year records are the primary source; day records are folded in so a year
/// missing from the yearly rollup is still selectable.
pub fn extract_years(yearlist: &[UsageRecord], daylist: &[UsageRecord]) -> Vec<i32> {
    let mut years = BTreeSet::new();

    for record in yearlist {
        if let Some(year) = parse_year_key(record.period_key()) {
            years.insert(year);
        }
    }

    for record in daylist {
        if let Some(date) = parse_day_key(record.period_key()) {
            years.insert(date.year());
        }
    }

    years.into_iter().rev().collect()
}

/// Months of `year` present in either the monthly or daily list, ascending.
pub fn extract_months(monthlist: &[UsageRecord], daylist: &[UsageRecord], year: i32) -> Vec<u32> {
    let mut months = BTreeSet::new();

    for record in monthlist {
        if let Some((y, m)) = parse_month_key(record.period_key()) {
            if y == year {
                months.insert(m);
            }
        }
    }

    for record in daylist {
        if let Some(date) = parse_day_key(record.period_key()) {
            if date.year() == year {
                months.insert(date.month());
            }
        }
    }

    months.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{Granularity, TouComponents};

    fn record(granularity: Granularity, key: &str) -> UsageRecord {
        UsageRecord::new(granularity, key, TouComponents::default(), None, 0.0)
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_day_key("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(parse_day_key("2025-02-30"), None);
        assert_eq!(parse_day_key("not a date"), None);

        assert_eq!(parse_month_key("2025-03"), Some((2025, 3)));
        assert_eq!(parse_month_key("2025-3"), Some((2025, 3)));
        assert_eq!(parse_month_key("2025-13"), None);
        assert_eq!(parse_month_key("2025"), None);

        assert_eq!(parse_year_key("2024"), Some(2024));
        assert_eq!(parse_year_key(" 2024 "), Some(2024));
        assert_eq!(parse_year_key("20x4"), None);
        assert_eq!(parse_year_key(""), None);
    }

    #[test]
    fn test_extract_years_union_descending() {
        let yearlist = vec![record(Granularity::Year, "2024")];
        let daylist = vec![record(Granularity::Day, "2023-05-01")];

        assert_eq!(extract_years(&yearlist, &daylist), vec![2024, 2023]);
    }

    #[test]
    fn test_extract_years_dedupes_and_skips_malformed() {
        let yearlist = vec![
            record(Granularity::Year, "2022"),
            record(Granularity::Year, "garbage"),
            record(Granularity::Year, "2024"),
        ];
        let daylist = vec![
            record(Granularity::Day, "2024-01-01"),
            record(Granularity::Day, "2024-13-01"),
            record(Granularity::Day, ""),
            record(Granularity::Day, "2022-07-09"),
        ];

        assert_eq!(extract_years(&yearlist, &daylist), vec![2024, 2022]);
    }

    #[test]
    fn test_extract_years_empty() {
        assert!(extract_years(&[], &[]).is_empty());
    }

    #[test]
    fn test_extract_months() {
        let monthlist = vec![
            record(Granularity::Month, "2025-04"),
            record(Granularity::Month, "2024-04"),
        ];
        let daylist = vec![
            record(Granularity::Day, "2025-01-15"),
            record(Granularity::Day, "2025-04-02"),
        ];

        assert_eq!(extract_months(&monthlist, &daylist, 2025), vec![1, 4]);
        assert_eq!(extract_months(&monthlist, &daylist, 2023), Vec::<u32>::new());
    }
}
