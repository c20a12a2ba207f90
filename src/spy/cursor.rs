use std::sync::Arc;

use crate::api::{Accessor, ColumnRef, ResultCursor, ResultMetadata};
use crate::collector::{Advance, CursorCall, Returned, RowCollector};
use crate::error::{DbError, Result, SpyError};
use crate::log::{SpyContext, SpyKind, SpyLog};
use crate::value::Value;

/// Wraps a result cursor, logging every call and optionally collecting the
/// rows read into a table.
pub struct CursorSpy<C: ResultCursor> {
    inner: C,
    log: Arc<dyn SpyLog>,
    context: SpyContext,
    collector: Option<RowCollector>,
}

impl<C: ResultCursor> CursorSpy<C> {
    /// Wrap `inner`. Collection and fill-in follow the log's switches at the
    /// time of wrapping.
    pub fn new(inner: C, log: Arc<dyn SpyLog>, connection_number: Option<u64>) -> Self {
        let collector = log
            .is_collection_enabled()
            .then(|| RowCollector::new(log.is_fill_in_enabled()));
        Self {
            inner,
            log,
            context: SpyContext::new(SpyKind::Cursor, connection_number),
            collector,
        }
    }

    pub fn connection_number(&self) -> Option<u64> {
        self.context.connection_number
    }

    /// The collector, when collection is enabled.
    pub fn collector(&self) -> Option<&RowCollector> {
        self.collector.as_ref()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn next(&mut self) -> Result<bool> {
        self.advance(Advance::Next)
    }

    pub fn first(&mut self) -> Result<bool> {
        self.advance(Advance::First)
    }

    fn advance(&mut self, advance: Advance) -> Result<bool> {
        let call = CursorCall::Advance(advance);
        self.before(&call);
        let result = match advance {
            Advance::Next => self.inner.next(),
            Advance::First => self.inner.first(),
        };
        match result {
            Ok(has_row) => {
                self.after(&call, &Returned::Bool(has_row))?;
                Ok(has_row)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    /// Close the cursor. A table still pending is emitted.
    ///
    /// Column structure is captured before the real close, since some drivers
    /// cannot describe a closed cursor. If that fails the cursor is still
    /// closed and the collector error returned.
    pub fn close(&mut self) -> Result<()> {
        let call = CursorCall::Close;
        let mut metadata_error = None;
        if let Some(collector) = self.collector.as_mut() {
            if let Err(e) = collector.load_metadata_if_needed(&self.inner) {
                warn!("Result table dropped, metadata unavailable before close: {}", e);
                collector.reset();
                metadata_error = Some(e);
            }
        }
        if metadata_error.is_none() {
            self.before(&call);
        }
        if let Err(e) = self.inner.close() {
            return Err(self.fail(&call, e));
        }
        if let Some(e) = metadata_error {
            self.log.method_returned(&self.context, &call, &Returned::Void);
            return Err(SpyError::Collector(e));
        }
        self.after(&call, &Returned::Void)
    }

    pub fn is_closed(&mut self) -> Result<bool> {
        let call = CursorCall::other("is_closed");
        match self.inner.is_closed() {
            Ok(closed) => {
                self.after(&call, &Returned::Bool(closed))?;
                Ok(closed)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    pub fn metadata(&mut self) -> Result<Option<ResultMetadata>> {
        let call = CursorCall::MetadataFetch;
        match self.inner.metadata() {
            Ok(metadata) => {
                self.after(&call, &Returned::Metadata(metadata.as_ref()))?;
                Ok(metadata)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    pub fn was_null(&mut self) -> Result<bool> {
        let call = CursorCall::NullCheck;
        match self.inner.was_null() {
            Ok(was_null) => {
                self.after(&call, &Returned::Bool(was_null))?;
                Ok(was_null)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    pub fn find_column(&mut self, name: &str) -> Result<usize> {
        let call = CursorCall::other_with_arg("find_column", name);
        match self.inner.find_column(name) {
            Ok(ordinal) => {
                self.after(&call, &Returned::Count(ordinal))?;
                Ok(ordinal)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    pub fn row_number(&mut self) -> Result<usize> {
        let call = CursorCall::other("row_number");
        match self.inner.row_number() {
            Ok(n) => {
                self.after(&call, &Returned::Count(n))?;
                Ok(n)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    /// Read a column through a typed accessor.
    pub fn get(&mut self, column: impl Into<ColumnRef>, accessor: Accessor) -> Result<Value> {
        let column = column.into();
        let call = CursorCall::accessor(accessor, &column);
        match self.inner.get(&column, accessor) {
            Ok(value) => {
                self.after(&call, &Returned::Value(&value))?;
                Ok(value)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    /// Raw bytes of a column. Logged, but not collected into the table.
    pub fn get_bytes(&mut self, column: impl Into<ColumnRef>) -> Result<Option<Vec<u8>>> {
        let column = column.into();
        let call = CursorCall::other_with_arg("get_bytes", &column);
        match self.inner.get_bytes(&column) {
            Ok(bytes) => {
                self.after(&call, &Returned::Bytes(bytes.as_deref()))?;
                Ok(bytes)
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    /// `None` for SQL NULL.
    pub fn get_string(&mut self, column: impl Into<ColumnRef>) -> Result<Option<String>> {
        Ok(match self.get(column, Accessor::String)? {
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }

    pub fn get_i64(&mut self, column: impl Into<ColumnRef>) -> Result<Option<i64>> {
        let value = self.get(column, Accessor::Long)?;
        Ok(value.as_i64())
    }

    pub fn get_i32(&mut self, column: impl Into<ColumnRef>) -> Result<Option<i32>> {
        let value = self.get(column, Accessor::Int)?;
        Ok(value.as_i64().and_then(|v| i32::try_from(v).ok()))
    }

    pub fn get_f64(&mut self, column: impl Into<ColumnRef>) -> Result<Option<f64>> {
        let value = self.get(column, Accessor::Double)?;
        Ok(value.as_f64())
    }

    pub fn get_bool(&mut self, column: impl Into<ColumnRef>) -> Result<Option<bool>> {
        let value = self.get(column, Accessor::Boolean)?;
        Ok(value.as_bool())
    }

    pub fn get_timestamp(
        &mut self,
        column: impl Into<ColumnRef>,
    ) -> Result<Option<chrono::NaiveDateTime>> {
        let value = self.get(column, Accessor::Timestamp)?;
        Ok(value.as_timestamp())
    }

    pub fn get_object(&mut self, column: impl Into<ColumnRef>) -> Result<Value> {
        self.get(column, Accessor::Object)
    }

    fn before(&mut self, call: &CursorCall<'_>) {
        if let Some(collector) = self.collector.as_mut() {
            collector.pre_call(call, &mut self.inner);
        }
    }

    /// Feed the collector, then log the return. A completed table is
    /// emitted ahead of the call that completed it.
    fn after(&mut self, call: &CursorCall<'_>, returned: &Returned<'_>) -> Result<()> {
        if let Some(collector) = self.collector.as_mut() {
            if collector.post_call(call, returned, &self.inner)? {
                self.log.result_set_collected(&self.context, collector);
                collector.reset();
            }
        }
        self.log.method_returned(&self.context, call, returned);
        Ok(())
    }

    fn fail(&self, call: &CursorCall<'_>, error: DbError) -> SpyError {
        self.log
            .exception_occurred(&self.context, call, &error, None, None);
        SpyError::Database(error)
    }
}

impl<C: ResultCursor> std::fmt::Debug for CursorSpy<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorSpy")
            .field("context", &self.context)
            .field("collecting", &self.collector.is_some())
            .finish()
    }
}
