//! Configuration types

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// How SQL text is dumped
    #[serde(default)]
    pub sql: SqlDumpConfig,

    /// Slow statement thresholds
    #[serde(default)]
    pub timing: TimingConfig,

    /// Result table collection
    #[serde(default)]
    pub result_set: ResultSetConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(warn), Some(error)) = (
            self.timing.warn_threshold_ms,
            self.timing.error_threshold_ms,
        ) {
            if warn > error {
                return Err(format!(
                    "timing.warn_threshold_ms ({}) must not exceed timing.error_threshold_ms ({})",
                    warn, error
                ));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// SQL dump formatting and filtering
#[derive(Debug, Clone, Deserialize)]
pub struct SqlDumpConfig {
    /// Trim leading/trailing whitespace
    #[serde(default = "default_true")]
    pub trim: bool,

    /// Collapse runs of blank lines into one
    #[serde(default = "default_true")]
    pub trim_extra_blank_lines: bool,

    /// Re-flow SQL onto lines of roughly this length (0 = leave as is)
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Append `;` to dumped SQL
    #[serde(default)]
    pub add_semicolon: bool,

    /// Prefix SQL run through a plain statement with a warning
    #[serde(default)]
    pub statement_warn: bool,

    /// Which statement kinds are dumped
    #[serde(default)]
    pub dump: SqlKindFilter,
}

impl Default for SqlDumpConfig {
    fn default() -> Self {
        Self {
            trim: true,
            trim_extra_blank_lines: true,
            max_line_length: default_max_line_length(),
            add_semicolon: false,
            statement_warn: false,
            dump: SqlKindFilter::default(),
        }
    }
}

/// Per statement kind switches. All on by default.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlKindFilter {
    #[serde(default = "default_true")]
    pub select: bool,
    #[serde(default = "default_true")]
    pub insert: bool,
    #[serde(default = "default_true")]
    pub update: bool,
    #[serde(default = "default_true")]
    pub delete: bool,
    #[serde(default = "default_true")]
    pub create: bool,
}

impl Default for SqlKindFilter {
    fn default() -> Self {
        Self {
            select: true,
            insert: true,
            update: true,
            delete: true,
            create: true,
        }
    }
}

impl SqlKindFilter {
    /// Filtering is only active once some kind has been switched off.
    pub fn is_filtering(&self) -> bool {
        !(self.select && self.insert && self.update && self.delete && self.create)
    }
}

/// Slow statement thresholds in milliseconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingConfig {
    /// Statements at least this slow are logged at WARN
    #[serde(default)]
    pub warn_threshold_ms: Option<u64>,

    /// Statements at least this slow are logged at ERROR
    #[serde(default)]
    pub error_threshold_ms: Option<u64>,
}

/// Result table collection switches.
///
/// Unset values follow the level of the `dbspy::resultsettable` log target:
/// INFO enables collection, DEBUG additionally enables fill-in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSetConfig {
    #[serde(default)]
    pub collect: Option<bool>,

    /// Read columns the application skipped before leaving a row
    #[serde(default)]
    pub fill_in_unread: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn default_max_line_length() -> usize {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}
