use crate::data_structures::{Granularity, Snapshot, TouComponents, UsageRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Attribute field names for one granularity.
struct FieldNames {
    key: &'static str,
    valley: &'static str,
    peak: &'static str,
    normal: &'static str,
    sharp: &'static str,
    total: &'static str,
    cost: &'static str,
}

const DAY_FIELDS: FieldNames = FieldNames {
    key: "day",
    valley: "dayVPq",
    peak: "dayPPq",
    normal: "dayNPq",
    sharp: "dayTPq",
    total: "dayEleNum",
    cost: "dayEleCost",
};

const MONTH_FIELDS: FieldNames = FieldNames {
    key: "month",
    valley: "monthVPq",
    peak: "monthPPq",
    normal: "monthNPq",
    sharp: "monthTPq",
    total: "monthEleNum",
    cost: "monthEleCost",
};

const YEAR_FIELDS: FieldNames = FieldNames {
    key: "year",
    valley: "yearVPq",
    peak: "yearPPq",
    normal: "yearNPq",
    sharp: "yearTPq",
    total: "yearEleNum",
    cost: "yearEleCost",
};

fn fields_for(granularity: Granularity) -> &'static FieldNames {
    match granularity {
        Granularity::Day => &DAY_FIELDS,
        Granularity::Month => &MONTH_FIELDS,
        Granularity::Year => &YEAR_FIELDS,
    }
}

/// Turns loosely shaped host attributes into a typed [`Snapshot`].
///
/// Parsing never fails on shape: missing numbers become 0, records without a
/// usable period key are dropped.
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Snapshot> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {}", path.as_ref().display()))?;

        let json: Value = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse JSON in {}", path.as_ref().display())
        })?;

        Ok(self.parse_document(&json))
    }

    /// Accepts either the attribute object or an entity state wrapping it
    /// under `attributes`.
    pub fn parse_document(&self, json: &Value) -> Snapshot {
        match json.get("attributes") {
            Some(attributes) if attributes.is_object() => self.parse_attributes(attributes),
            _ => self.parse_attributes(json),
        }
    }

    pub fn parse_attributes(&self, attributes: &Value) -> Snapshot {
        Snapshot::new(
            self.parse_list(attributes, Granularity::Day),
            self.parse_list(attributes, Granularity::Month),
            self.parse_list(attributes, Granularity::Year),
        )
    }

    fn parse_list(&self, attributes: &Value, granularity: Granularity) -> Vec<UsageRecord> {
        let items = match attributes.get(granularity.list_key()) {
            Some(Value::Array(items)) => items,
            Some(other) if !other.is_null() => {
                debug!(list = granularity.list_key(), "ignoring non-array attribute list");
                return Vec::new();
            }
            _ => return Vec::new(),
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let record = self.parse_record(item, granularity);
                if record.is_none() {
                    debug!(
                        list = granularity.list_key(),
                        index, "skipping record without a period key"
                    );
                }
                record
            })
            .collect()
    }

    fn parse_record(&self, item: &Value, granularity: Granularity) -> Option<UsageRecord> {
        if !item.is_object() {
            return None;
        }

        let fields = fields_for(granularity);
        let period_key = self.extract_key(item, fields.key)?;

        let components = TouComponents::new(
            self.extract_f64(item, fields.valley).unwrap_or(0.0),
            self.extract_f64(item, fields.peak).unwrap_or(0.0),
            self.extract_f64(item, fields.normal).unwrap_or(0.0),
            self.extract_f64(item, fields.sharp).unwrap_or(0.0),
        );

        Some(UsageRecord::new(
            granularity,
            period_key,
            components,
            self.extract_f64(item, fields.total),
            self.extract_f64(item, fields.cost).unwrap_or(0.0),
        ))
    }

    /// Keys arrive as strings; a bare number is accepted for year keys.
    fn extract_key(&self, json: &Value, key: &str) -> Option<String> {
        match json.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn extract_f64(&self, json: &Value, key: &str) -> Option<f64> {
        let value = match json.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };

        value.is_finite().then_some(value)
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}
