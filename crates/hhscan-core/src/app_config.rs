use std::path::PathBuf;

use crate::place::BusinessStatus;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

pub const DEFAULT_PAGE_CAP: usize = 20;
pub const DEFAULT_MIN_CELL_SIZE_M: f64 = 200.0;
pub const DEFAULT_AREA_OVERLAP_MIN: f64 = 0.05;
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_TARGET_SECONDARY_HOURS: &str = "HAPPY_HOUR";

/// Knobs for one subdivision search run. All are safe to vary per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// A coarse search returning at least this many results is treated as truncated.
    pub page_cap: usize,
    /// Cells whose longer side is at or below this are never subdivided.
    pub min_cell_size_m: f64,
    /// Polygon cells overlapping the region less than this fraction are skipped.
    pub area_overlap_min: f64,
    /// Buffered details are flushed once this many accumulate.
    pub batch_size: usize,
    /// Provider categories passed to every nearby search.
    pub included_types: Vec<String>,
    pub admitted_statuses: Vec<BusinessStatus>,
    /// Secondary-hours tag a candidate must advertise, compared case-insensitively.
    pub target_secondary_hours: String,
    /// When `false` the secondary-hours test is skipped.
    pub require_secondary: bool,
    pub max_search_calls: Option<u64>,
    pub max_detail_calls: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_cap: DEFAULT_PAGE_CAP,
            min_cell_size_m: DEFAULT_MIN_CELL_SIZE_M,
            area_overlap_min: DEFAULT_AREA_OVERLAP_MIN,
            batch_size: DEFAULT_BATCH_SIZE,
            included_types: vec!["restaurant".to_string(), "bar".to_string()],
            admitted_statuses: vec![BusinessStatus::Operational],
            target_secondary_hours: DEFAULT_TARGET_SECONDARY_HOURS.to_string(),
            require_secondary: true,
            max_search_calls: None,
            max_detail_calls: None,
        }
    }
}

impl SearchSettings {
    /// Checks value ranges the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] naming the first bad knob.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &str, reason: &str| {
            Err(ConfigError::InvalidSetting {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };

        if self.page_cap == 0 {
            return invalid("page_cap", "must be at least 1");
        }
        if !self.min_cell_size_m.is_finite() || self.min_cell_size_m <= 0.0 {
            return invalid("min_cell_size_m", "must be a positive number of meters");
        }
        if !(0.0..=1.0).contains(&self.area_overlap_min) {
            return invalid("area_overlap_min", "must be within [0, 1]");
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "must be at least 1");
        }
        if self.admitted_statuses.is_empty() {
            return invalid("admitted_statuses", "must name at least one status");
        }
        if self.require_secondary && self.target_secondary_hours.trim().is_empty() {
            return invalid("target_secondary_hours", "must not be empty");
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub google_api_key: String,
    pub database_url: String,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub snapshot_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub search: SearchSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("google_api_key", &"[redacted]")
            .field("database_url", &"[redacted]")
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("snapshot_path", &self.snapshot_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("search", &self.search)
            .finish()
    }
}
