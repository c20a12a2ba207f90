use crate::api::{ResultCursor, ResultMetadata};
use crate::error::CollectorError;
use crate::value::Value;

use super::call::{CursorCall, Returned};
use super::columns::{ColumnDescriptor, ColumnSet};
use super::row::{Cell, Row};

/// Rebuilds the table behind one cursor from the calls made against it.
///
/// Owned by exactly one cursor spy; calls on a cursor are sequential, so no
/// locking is done here.
#[derive(Debug)]
pub struct RowCollector {
    columns: ColumnSet,
    current_row: Option<Row>,
    rows: Vec<Row>,
    /// Ordinal written by the immediately preceding accessor call
    last_accessed: Option<usize>,
    /// Last result of `next()`/`first()`. Starts `true` and survives `reset`,
    /// so a close after exhaustion does not emit the table a second time.
    last_advance: bool,
    fill_in_unread: bool,
}

impl RowCollector {
    pub fn new(fill_in_unread: bool) -> Self {
        Self {
            columns: ColumnSet::new(),
            current_row: None,
            rows: Vec::new(),
            last_accessed: None,
            last_advance: true,
            fill_in_unread,
        }
    }

    pub fn fill_in_unread(&self) -> bool {
        self.fill_in_unread
    }

    pub fn column_count(&self) -> usize {
        self.columns.count()
    }

    pub fn column_name(&self, ordinal: usize) -> Option<&str> {
        self.columns.get(ordinal).map(|c| c.name.as_str())
    }

    pub fn column_label(&self, ordinal: usize) -> Option<&str> {
        self.columns.get(ordinal).map(|c| c.label.as_str())
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.columns.columns()
    }

    /// Completed rows since the last reset.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row the cursor is currently positioned on, if any column was read.
    pub fn current_row(&self) -> Option<&Row> {
        self.current_row.as_ref()
    }

    /// Capture column structure from the live cursor, once.
    ///
    /// The spy calls this ahead of the real close, while the cursor can still
    /// describe itself.
    pub fn load_metadata_if_needed<C: ResultCursor + ?Sized>(
        &mut self,
        cursor: &C,
    ) -> Result<(), CollectorError> {
        self.columns.load_if_needed(cursor)
    }

    /// Forget everything collected. The last advance result is kept.
    pub fn reset(&mut self) {
        self.columns.clear();
        self.current_row = None;
        self.rows.clear();
        self.last_accessed = None;
    }

    /// Notification before the real cursor runs `call`.
    ///
    /// With fill-in enabled, leaving a row (advance or close) first reads every
    /// column the application skipped. Failures are recorded per cell and never
    /// reach the application.
    pub fn pre_call<C: ResultCursor + ?Sized>(&mut self, call: &CursorCall<'_>, cursor: &mut C) {
        if !self.fill_in_unread || !matches!(call, CursorCall::Advance(_) | CursorCall::Close) {
            return;
        }
        let Some(row) = self.current_row.as_mut() else {
            return;
        };
        for (i, cell) in row.cells_mut().iter_mut().enumerate() {
            if !cell.is_unread() {
                continue;
            }
            *cell = match cursor.read_generic(i + 1) {
                Ok(Value::Null) => Cell::Null,
                Ok(value) => Cell::Value(value),
                Err(e) => {
                    trace!("Fill-in of column {} failed: {}", i + 1, e);
                    Cell::FillError
                }
            };
        }
    }

    /// Notification after the real cursor returned from `call`.
    ///
    /// Returns `true` when the table is complete and should be rendered, after
    /// which the caller is expected to [`reset`](Self::reset).
    ///
    /// An advance that lands on a row allocates it with every cell unread,
    /// whether or not the application reads a column afterwards. With fill-in
    /// enabled, a loop that only calls `next()` therefore has every column of
    /// every row read through [`ResultCursor::read_generic`] before the cursor
    /// moves on.
    pub fn post_call<C: ResultCursor + ?Sized>(
        &mut self,
        call: &CursorCall<'_>,
        returned: &Returned<'_>,
        cursor: &C,
    ) -> Result<bool, CollectorError> {
        match (call, returned) {
            (CursorCall::PositionalAccessor { ordinal, .. }, Returned::Value(value)) => {
                self.record_positional(*ordinal, value)?;
                Ok(false)
            }
            (CursorCall::NamedAccessor { name, .. }, Returned::Value(value)) => {
                self.record_named(name, value)?;
                Ok(false)
            }
            (CursorCall::NullCheck, Returned::Bool(was_null)) => {
                self.record_null_check(*was_null);
                Ok(false)
            }
            (CursorCall::Advance(_), Returned::Bool(has_row)) => {
                self.last_accessed = None;
                self.last_advance = *has_row;
                self.finish_row();
                self.columns.load_if_needed(cursor)?;
                if *has_row && self.columns.count() > 0 {
                    // Positioned on a row: it exists in the table even if
                    // the application never reads a column of it
                    self.current_row = Some(Row::unread(self.columns.count()));
                }
                Ok(!*has_row)
            }
            (CursorCall::Close, _) => {
                self.last_accessed = None;
                self.columns.load_if_needed(cursor)?;
                self.finish_row();
                // A cursor already drained by next() was emitted then
                Ok(self.last_advance)
            }
            (CursorCall::MetadataFetch, Returned::Metadata(metadata)) => {
                self.last_accessed = None;
                self.load_metadata(*metadata);
                Ok(false)
            }
            _ => {
                self.last_accessed = None;
                Ok(false)
            }
        }
    }

    fn load_metadata(&mut self, metadata: Option<&ResultMetadata>) {
        self.columns.load_from(metadata);
    }

    fn record_positional(&mut self, ordinal: usize, value: &Value) -> Result<(), CollectorError> {
        if ordinal == 0 {
            return Err(CollectorError::MissingColumn);
        }
        if self.columns.count() == 0 {
            self.last_accessed = None;
            return Ok(());
        }
        let ordinal = self.columns.check_ordinal(ordinal)?;
        self.store(ordinal, value);
        Ok(())
    }

    fn record_named(&mut self, name: &str, value: &Value) -> Result<(), CollectorError> {
        if !self.columns.is_loaded() {
            return Err(CollectorError::MetadataNotLoaded(name.to_string()));
        }
        if self.columns.count() == 0 {
            self.last_accessed = None;
            return Ok(());
        }
        let ordinal = self.columns.resolve_name(name)?;
        self.store(ordinal, value);
        Ok(())
    }

    fn store(&mut self, ordinal: usize, value: &Value) {
        let width = self.columns.count();
        self.current_row
            .get_or_insert_with(|| Row::unread(width))
            .set(ordinal, Cell::Value(value.clone()));
        self.last_accessed = Some(ordinal);
    }

    fn record_null_check(&mut self, was_null: bool) {
        if !was_null {
            return;
        }
        if let (Some(ordinal), Some(row)) = (self.last_accessed, self.current_row.as_mut()) {
            row.set(ordinal, Cell::Null);
        }
    }

    fn finish_row(&mut self) {
        if let Some(row) = self.current_row.take() {
            self.rows.push(row);
        }
    }
}
