//! Logging wrappers around the client API.
//!
//! A [`DataSourceSpy`] hands out [`ConnectionSpy`]s, which create
//! [`StatementSpy`]s, which return [`CursorSpy`]s. Each forwards to the wrapped
//! object, reports to a shared [`SpyLog`](crate::log::SpyLog), and hands back
//! database errors unchanged as [`SpyError::Database`](crate::error::SpyError).

mod connection;
mod cursor;
mod datasource;
mod registry;
mod statement;

pub use connection::ConnectionSpy;
pub use cursor::CursorSpy;
pub use datasource::DataSourceSpy;
pub use registry::ConnectionRegistry;
pub use statement::StatementSpy;
