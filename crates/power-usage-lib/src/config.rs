use crate::cache::{CachePolicy, DEFAULT_TTL_SECONDS};
use crate::reconcile::{Tolerances, DEFAULT_MONTH_TOLERANCE, DEFAULT_YEAR_TOLERANCE};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,
    #[serde(default = "default_tolerance_month")]
    pub tolerance_month: f64,
    #[serde(default = "default_tolerance_year")]
    pub tolerance_year: f64,
    #[serde(default)]
    pub tolerance_day: Option<f64>,
}

fn default_ttl_seconds() -> i64 {
    DEFAULT_TTL_SECONDS
}

fn default_tolerance_month() -> f64 {
    DEFAULT_MONTH_TOLERANCE
}

fn default_tolerance_year() -> f64 {
    DEFAULT_YEAR_TOLERANCE
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.as_ref().display()))
    }

    /// TTLs too large for a [`Duration`] saturate to [`Duration::MAX`].
    pub fn cache_policy(&self) -> CachePolicy {
        let ttl = Duration::try_seconds(self.ttl_seconds.max(0)).unwrap_or(Duration::MAX);
        CachePolicy::with_ttl(ttl)
    }

    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            day: self.tolerance_day,
            month: self.tolerance_month,
            year: self.tolerance_year,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            tolerance_month: default_tolerance_month(),
            tolerance_year: default_tolerance_year(),
            tolerance_day: None,
        }
    }
}
