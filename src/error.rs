//! Error types for dbspy

use thiserror::Error;

/// Error reported by the wrapped database client.
///
/// Spies never alter these: a `DbError` returned by the real cursor,
/// statement or connection reaches the caller unchanged inside
/// [`SpyError::Database`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DbError {
    /// Human readable message from the driver
    pub message: String,
    /// Five character SQLSTATE, when the driver provides one
    pub sql_state: Option<String>,
    /// Vendor specific error code
    pub vendor_code: i32,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            vendor_code: 0,
        }
    }

    pub fn with_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    pub fn with_vendor_code(mut self, code: i32) -> Self {
        self.vendor_code = code;
        self
    }
}

/// Result type for calls into the wrapped client API
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Misuse of the row collector by the interception layer.
///
/// Only the spies call the collector, so these indicate a bug in call
/// description, never a database condition.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Accessor called without a usable column reference (ordinal 0)
    #[error("column accessor called without a column (ordinal 0)")]
    MissingColumn,

    /// Column looked up by name before metadata was available
    #[error("column '{0}' looked up by name before metadata was loaded")]
    MetadataNotLoaded(String),

    /// Column name not present in the cursor metadata
    #[error("column '{0}' is not part of the result")]
    UnknownColumn(String),

    /// Ordinal beyond the number of columns
    #[error("column {ordinal} is out of range (result has {count} columns)")]
    ColumnOutOfRange { ordinal: usize, count: usize },

    /// The live cursor refused to describe itself
    #[error("failed to load result metadata: {0}")]
    Metadata(#[source] DbError),
}

/// Main error type for dbspy
#[derive(Error, Debug)]
pub enum SpyError {
    /// Error from the wrapped database client
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Row collector misuse
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Replay fixture error
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// I/O error (config or fixture files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SpyError
pub type Result<T> = std::result::Result<T, SpyError>;

impl From<serde_yaml::Error> for SpyError {
    fn from(err: serde_yaml::Error) -> Self {
        SpyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SpyError {
    fn from(err: serde_json::Error) -> Self {
        SpyError::Fixture(err.to_string())
    }
}

impl SpyError {
    /// The backend error, if this error came from the wrapped client.
    pub fn as_database(&self) -> Option<&DbError> {
        match self {
            SpyError::Database(e) => Some(e),
            _ => None,
        }
    }
}
