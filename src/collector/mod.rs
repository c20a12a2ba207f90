//! Result table collection.
//!
//! A [`RowCollector`] rebuilds what a cursor returned by watching the calls an
//! application makes against it. It never reads the cursor on its own, with
//! one exception: when fill-in is enabled, columns the application skipped are
//! read once just before the row is left.
//!
//! ## Protocol
//!
//! The cursor spy describes every call as a [`CursorCall`] and reports it twice:
//!
//! 1. `pre_call` before the real cursor runs (fill-in happens here)
//! 2. `post_call` after it returned, together with the [`Returned`] value
//!
//! `post_call` answers `true` when the table is complete. The spy then hands
//! the collector to the log for rendering and calls `reset`.

mod call;
mod columns;
mod row;
mod state;

pub use call::{Advance, CursorCall, Returned};
pub use columns::{ColumnDescriptor, ColumnSet};
pub use row::{Cell, Row};
pub use state::RowCollector;
