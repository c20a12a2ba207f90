//! Configuration loader

use super::Config;
use crate::error::{Result, SpyError};
use std::path::Path;

/// Load configuration from a YAML file
///
/// Also applies DBSPY_* env var overrides after loading.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Also applies DBSPY_* env var overrides after loading.
pub fn load_config_from_str(yaml: &str) -> Result<Config> {
    let mut config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    apply_env_overrides(&mut config);
    config.validate().map_err(SpyError::Config)?;
    Ok(config)
}

/// Apply DBSPY_* environment variable overrides to a config.
///
/// Supported env vars:
/// - `DBSPY_LOG_LEVEL` - Override log level
/// - `DBSPY_SQL_MAX_LINE_LENGTH` - Override SQL re-flow line length
/// - `DBSPY_TIMING_WARN_THRESHOLD_MS` - Override slow statement warn threshold
/// - `DBSPY_TIMING_ERROR_THRESHOLD_MS` - Override slow statement error threshold
/// - `DBSPY_COLLECT_RESULT_SETS` - Force result table collection on/off
/// - `DBSPY_FILL_IN_UNREAD` - Force fill-in of unread columns on/off
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Values that fail to parse are ignored and the configured value is kept.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("DBSPY_LOG_LEVEL") {
        debug!("Overriding log level from DBSPY_LOG_LEVEL");
        config.logging.level = val;
    }
    if let Some(val) = lookup("DBSPY_SQL_MAX_LINE_LENGTH") {
        if let Ok(len) = val.parse::<usize>() {
            debug!("Overriding sql.max_line_length from DBSPY_SQL_MAX_LINE_LENGTH");
            config.sql.max_line_length = len;
        }
    }
    if let Some(val) = lookup("DBSPY_TIMING_WARN_THRESHOLD_MS") {
        if let Ok(ms) = val.parse::<u64>() {
            debug!("Overriding timing.warn_threshold_ms from DBSPY_TIMING_WARN_THRESHOLD_MS");
            config.timing.warn_threshold_ms = Some(ms);
        }
    }
    if let Some(val) = lookup("DBSPY_TIMING_ERROR_THRESHOLD_MS") {
        if let Ok(ms) = val.parse::<u64>() {
            debug!("Overriding timing.error_threshold_ms from DBSPY_TIMING_ERROR_THRESHOLD_MS");
            config.timing.error_threshold_ms = Some(ms);
        }
    }
    if let Some(val) = lookup("DBSPY_COLLECT_RESULT_SETS") {
        if let Some(flag) = parse_flag(&val) {
            debug!("Overriding result_set.collect from DBSPY_COLLECT_RESULT_SETS");
            config.result_set.collect = Some(flag);
        }
    }
    if let Some(val) = lookup("DBSPY_FILL_IN_UNREAD") {
        if let Some(flag) = parse_flag(&val) {
            debug!("Overriding result_set.fill_in_unread from DBSPY_FILL_IN_UNREAD");
            config.result_set.fill_in_unread = Some(flag);
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
