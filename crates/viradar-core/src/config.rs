use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let youtube_api_key = lookup("VIRADAR_YOUTUBE_API_KEY").ok();
    let rapidapi_key = lookup("VIRADAR_RAPIDAPI_KEY").ok();

    let request_timeout_secs = parse_u64("VIRADAR_REQUEST_TIMEOUT_SECS", "30")?;
    let target_results = parse_usize("VIRADAR_TARGET_RESULTS", "25")?;
    let max_api_calls = parse_u32("VIRADAR_MAX_API_CALLS", "5")?;
    let daily_quota_units = parse_u64("VIRADAR_DAILY_QUOTA_UNITS", "10000")?;
    let quota_state_path = PathBuf::from(or_default(
        "VIRADAR_QUOTA_STATE_PATH",
        "./viradar-quota.json",
    ));
    let log_level = or_default("VIRADAR_LOG_LEVEL", "info");

    Ok(AppConfig {
        youtube_api_key,
        rapidapi_key,
        request_timeout_secs,
        target_results,
        max_api_calls,
        daily_quota_units,
        quota_state_path,
        log_level,
    })
}
