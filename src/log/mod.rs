//! Spy event logging.
//!
//! Spies report what happened through the [`SpyLog`] trait. The default
//! implementation, [`TracingSpyLog`], writes to these `tracing` targets so each
//! kind of event can be switched on separately:
//!
//! | Target                  | Events                                   |
//! |-------------------------|------------------------------------------|
//! | `dbspy::audit`          | returns and errors of all non-cursor calls |
//! | `dbspy::resultset`      | returns of cursor calls                  |
//! | `dbspy::sqlonly`        | SQL text before execution                |
//! | `dbspy::sqltiming`      | SQL text with execution time             |
//! | `dbspy::connection`     | connections opened and closed            |
//! | `dbspy::resultsettable` | rendered result tables                   |

use std::fmt;
use std::time::Duration;

use crate::collector::RowCollector;
use crate::error::DbError;
use crate::spy::ConnectionRegistry;

pub mod sql;
mod tracing_log;

pub use sql::SqlFormatter;
pub use tracing_log::TracingSpyLog;

/// `tracing` targets used by [`TracingSpyLog`].
pub mod targets {
    pub const AUDIT: &str = "dbspy::audit";
    pub const RESULT_SET: &str = "dbspy::resultset";
    pub const SQL_ONLY: &str = "dbspy::sqlonly";
    pub const SQL_TIMING: &str = "dbspy::sqltiming";
    pub const CONNECTION: &str = "dbspy::connection";
    pub const RESULT_TABLE: &str = "dbspy::resultsettable";
}

/// Kind of object a spy wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyKind {
    DataSource,
    Connection,
    Statement,
    Cursor,
}

impl SpyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SpyKind::DataSource => "DataSource",
            SpyKind::Connection => "Connection",
            SpyKind::Statement => "Statement",
            SpyKind::Cursor => "Cursor",
        }
    }
}

/// Identifies the spy reporting an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpyContext {
    pub kind: SpyKind,
    /// Number of the owning connection; `None` before a connection exists
    pub connection_number: Option<u64>,
}

impl SpyContext {
    pub fn new(kind: SpyKind, connection_number: Option<u64>) -> Self {
        Self {
            kind,
            connection_number,
        }
    }
}

impl fmt::Display for SpyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connection_number {
            Some(n) => write!(f, "{}. {}", n, self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

/// Receiver of spy events.
///
/// Implementations must be cheap when the corresponding output is disabled:
/// spies call into the log for every intercepted method.
pub trait SpyLog: Send + Sync {
    /// A forwarded call failed. `sql` and `elapsed` are set for SQL execution.
    fn exception_occurred(
        &self,
        spy: &SpyContext,
        call: &dyn fmt::Display,
        error: &DbError,
        sql: Option<&str>,
        elapsed: Option<Duration>,
    );

    /// A forwarded call returned.
    fn method_returned(&self, spy: &SpyContext, call: &dyn fmt::Display, returned: &dyn fmt::Display);

    /// SQL is about to be executed.
    fn sql_occurred(&self, spy: &SpyContext, call: &dyn fmt::Display, sql: &str);

    /// SQL finished executing.
    fn sql_timing_occurred(
        &self,
        spy: &SpyContext,
        elapsed: Duration,
        call: &dyn fmt::Display,
        sql: &str,
    );

    fn connection_opened(&self, spy: &SpyContext, elapsed: Duration, registry: &ConnectionRegistry);

    fn connection_closed(&self, spy: &SpyContext, elapsed: Duration, registry: &ConnectionRegistry);

    /// Whether new cursor spies should collect result tables.
    fn is_collection_enabled(&self) -> bool;

    /// Whether collected rows get their unread columns filled in.
    fn is_fill_in_enabled(&self) -> bool;

    /// Whether SQL run through a plain statement is flagged.
    fn is_statement_warn_enabled(&self) -> bool {
        false
    }

    /// A result table is complete. The collector is reset right after.
    fn result_set_collected(&self, spy: &SpyContext, collector: &RowCollector);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        assert_eq!(
            SpyContext::new(SpyKind::Cursor, Some(3)).to_string(),
            "3. Cursor"
        );
        assert_eq!(
            SpyContext::new(SpyKind::DataSource, None).to_string(),
            "DataSource"
        );
    }
}
