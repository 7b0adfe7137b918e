use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, SearchSettings};
use crate::place::BusinessStatus;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("HHSCAN_ENV", "development"))?;
    let log_level = or_default("HHSCAN_LOG_LEVEL", "info");
    let places_base_url = or_default(
        "HHSCAN_PLACES_BASE_URL",
        "https://places.googleapis.com/v1/",
    );
    let request_timeout_secs = parse_env(&lookup, "HHSCAN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("HHSCAN_USER_AGENT", "hhscan/0.1 (place-discovery)");
    let snapshot_path = PathBuf::from(or_default("HHSCAN_SNAPSHOT_PATH", "debug.csv"));

    let db_max_connections = parse_env(&lookup, "HHSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_env(&lookup, "HHSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_env(&lookup, "HHSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let defaults = SearchSettings::default();
    let search = SearchSettings {
        page_cap: parse_env(&lookup, "HHSCAN_PAGE_CAP", "20")?,
        min_cell_size_m: parse_env(&lookup, "HHSCAN_MIN_CELL_SIZE_M", "200")?,
        area_overlap_min: parse_env(&lookup, "HHSCAN_AREA_OVERLAP_MIN", "0.05")?,
        batch_size: parse_env(&lookup, "HHSCAN_BATCH_SIZE", "200")?,
        included_types: lookup("HHSCAN_INCLUDED_TYPES")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.included_types),
        admitted_statuses: match lookup("HHSCAN_ADMITTED_STATUSES") {
            Ok(raw) => parse_statuses("HHSCAN_ADMITTED_STATUSES", &raw)?,
            Err(_) => defaults.admitted_statuses,
        },
        target_secondary_hours: or_default(
            "HHSCAN_TARGET_SECONDARY_HOURS",
            &defaults.target_secondary_hours,
        )
        .trim()
        .to_string(),
        require_secondary: parse_bool(
            "HHSCAN_REQUIRE_SECONDARY",
            &or_default("HHSCAN_REQUIRE_SECONDARY", "true"),
        )?,
        max_search_calls: parse_optional(&lookup, "HHSCAN_MAX_SEARCH_CALLS")?,
        max_detail_calls: parse_optional(&lookup, "HHSCAN_MAX_DETAIL_CALLS")?,
    };

    search.validate().map_err(|e| match e {
        ConfigError::InvalidSetting { name, reason } => ConfigError::InvalidEnvVar {
            var: setting_env_var(&name).to_string(),
            reason,
        },
        other => other,
    })?;

    Ok(AppConfig {
        env,
        log_level,
        google_api_key,
        database_url,
        places_base_url,
        request_timeout_secs,
        user_agent,
        snapshot_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search,
    })
}

/// Reads `var` (or `default` when unset) and parses it as `T`.
fn parse_env<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Like [`parse_env`] but unset or blank means `None`.
fn parse_optional<F>(lookup: &F, var: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) if !raw.trim().is_empty() => parse_env(lookup, var, "").map(Some),
        _ => Ok(None),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected true/false, got '{other}'"),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_statuses(var: &str, raw: &str) -> Result<Vec<BusinessStatus>, ConfigError> {
    split_list(raw)
        .iter()
        .map(|s| {
            BusinessStatus::parse_known(s).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("unknown business status '{s}'"),
            })
        })
        .collect()
}

/// Maps a [`SearchSettings`] field name to the env var that sets it.
fn setting_env_var(name: &str) -> &'static str {
    match name {
        "page_cap" => "HHSCAN_PAGE_CAP",
        "min_cell_size_m" => "HHSCAN_MIN_CELL_SIZE_M",
        "area_overlap_min" => "HHSCAN_AREA_OVERLAP_MIN",
        "batch_size" => "HHSCAN_BATCH_SIZE",
        "admitted_statuses" => "HHSCAN_ADMITTED_STATUSES",
        _ => "HHSCAN_TARGET_SECONDARY_HOURS",
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything but `development`,
/// `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HHSCAN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
