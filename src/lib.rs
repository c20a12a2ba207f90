//! dbspy - logging proxy for database client calls
//!
//! This library wraps a database client API and:
//! - Logs every call made on data sources, connections, statements and cursors
//! - Dumps executed SQL, with timing and slow statement thresholds
//! - Tracks open connections in a [`ConnectionRegistry`]
//! - Rebuilds the rows an application reads into a table, printed when the
//!   cursor is exhausted or closed (see [`collector`])

#[macro_use]
mod logging;

pub mod api;
pub mod collector;
pub mod config;
pub mod error;
pub mod log;
pub mod memory;
pub mod render;
pub mod spy;
pub mod value;

pub use api::{
    Accessor, ColumnMetadata, ColumnRef, Connection, DataSource, ResultCursor, ResultMetadata,
    Statement,
};
pub use collector::{Cell, Row, RowCollector};
pub use config::Config;
pub use error::{CollectorError, DbError, DbResult, Result, SpyError};
pub use log::{SpyLog, TracingSpyLog};
pub use render::render_table;
pub use spy::{ConnectionRegistry, ConnectionSpy, CursorSpy, DataSourceSpy, StatementSpy};
pub use value::{TypeHint, Value};
