use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Instant;

use super::CursorSpy;
use crate::api::Statement;
use crate::error::{DbError, DbResult, Result, SpyError};
use crate::log::{SpyContext, SpyKind, SpyLog};

const STATEMENT_WARNING: &str = "{WARNING: Statement used to run SQL} ";

/// Wraps a statement, logging SQL before it runs and again with its timing.
///
/// SQL queued with [`add_batch`](Self::add_batch) is kept until the batch runs
/// successfully or is cleared, and dumped as one numbered listing.
pub struct StatementSpy<S: Statement> {
    inner: S,
    log: Arc<dyn SpyLog>,
    context: SpyContext,
    batch: Vec<String>,
}

/// A statement method together with the SQL it was given.
struct SqlCall<'a> {
    method: &'static str,
    sql: &'a str,
}

impl fmt::Display for SqlCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method, self.sql)
    }
}

/// Update counts as returned by `execute_batch`.
struct Counts<'a>(&'a [u64]);

impl fmt::Display for Counts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<S: Statement> StatementSpy<S> {
    pub fn new(inner: S, log: Arc<dyn SpyLog>, connection_number: Option<u64>) -> Self {
        Self {
            inner,
            log,
            context: SpyContext::new(SpyKind::Statement, connection_number),
            batch: Vec::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// SQL queued for the next batch, as it will be dumped.
    pub fn pending_batch(&self) -> &[String] {
        &self.batch
    }

    /// Run a query; the returned cursor is itself spied on.
    pub fn execute_query(&mut self, sql: &str) -> Result<CursorSpy<S::Cursor>> {
        let call = SqlCall {
            method: "execute_query",
            sql,
        };
        let dumped = self.dumped_sql(sql);
        let cursor = self.timed(&call, &dumped, |inner| inner.execute_query(sql))?;
        self.log.method_returned(&self.context, &call, &"Cursor");
        Ok(CursorSpy::new(
            cursor,
            Arc::clone(&self.log),
            self.context.connection_number,
        ))
    }

    /// Run DML/DDL and return the affected row count.
    pub fn execute_update(&mut self, sql: &str) -> Result<u64> {
        let call = SqlCall {
            method: "execute_update",
            sql,
        };
        let dumped = self.dumped_sql(sql);
        let count = self.timed(&call, &dumped, |inner| inner.execute_update(sql))?;
        self.log.method_returned(&self.context, &call, &count);
        Ok(count)
    }

    /// Run any SQL; `true` when it produced a result set.
    pub fn execute(&mut self, sql: &str) -> Result<bool> {
        let call = SqlCall {
            method: "execute",
            sql,
        };
        let dumped = self.dumped_sql(sql);
        let has_results = self.timed(&call, &dumped, |inner| inner.execute(sql))?;
        self.log.method_returned(&self.context, &call, &has_results);
        Ok(has_results)
    }

    pub fn add_batch(&mut self, sql: &str) -> Result<()> {
        let call = SqlCall {
            method: "add_batch",
            sql,
        };
        self.batch.push(self.dumped_sql(sql));
        match self.inner.add_batch(sql) {
            Ok(()) => {
                self.log.method_returned(&self.context, &call, &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&call, e)),
        }
    }

    pub fn clear_batch(&mut self) -> Result<()> {
        match self.inner.clear_batch() {
            Ok(()) => {
                self.batch.clear();
                self.log.method_returned(&self.context, &"clear_batch()", &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&"clear_batch()", e)),
        }
    }

    /// Run the queued batch. The listing is dumped as a single SQL event and
    /// the queue is only cleared once the batch succeeded.
    pub fn execute_batch(&mut self) -> Result<Vec<u64>> {
        let report = batch_report(&self.batch);
        let counts = self.timed(&"execute_batch()", &report, |inner| inner.execute_batch())?;
        self.batch.clear();
        self.log
            .method_returned(&self.context, &"execute_batch()", &Counts(&counts));
        Ok(counts)
    }

    pub fn close(&mut self) -> Result<()> {
        match self.inner.close() {
            Ok(()) => {
                self.log.method_returned(&self.context, &"close()", &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&"close()", e)),
        }
    }

    pub fn is_closed(&self) -> Result<bool> {
        match self.inner.is_closed() {
            Ok(closed) => {
                self.log.method_returned(&self.context, &"is_closed()", &closed);
                Ok(closed)
            }
            Err(e) => Err(self.fail(&"is_closed()", e)),
        }
    }

    /// SQL as it should appear in the dump.
    fn dumped_sql(&self, sql: &str) -> String {
        if self.log.is_statement_warn_enabled() {
            format!("{}{}", STATEMENT_WARNING, sql)
        } else {
            sql.to_string()
        }
    }

    fn timed<T>(
        &mut self,
        call: &dyn fmt::Display,
        sql: &str,
        run: impl FnOnce(&mut S) -> DbResult<T>,
    ) -> Result<T> {
        self.log.sql_occurred(&self.context, call, sql);
        let start = Instant::now();
        match run(&mut self.inner) {
            Ok(value) => {
                self.log
                    .sql_timing_occurred(&self.context, start.elapsed(), call, sql);
                Ok(value)
            }
            Err(e) => {
                self.log.exception_occurred(
                    &self.context,
                    call,
                    &e,
                    Some(sql),
                    Some(start.elapsed()),
                );
                Err(SpyError::Database(e))
            }
        }
    }

    fn fail(&self, call: &dyn fmt::Display, error: DbError) -> SpyError {
        self.log
            .exception_occurred(&self.context, call, &error, None, None);
        SpyError::Database(error)
    }
}

/// Numbered listing of a batch, numbers right-justified to a common width:
///
/// ```text
/// batching 2 statements:
/// 1:  insert into t values (1)
/// 2:  insert into t values (2)
/// ```
fn batch_report(batch: &[String]) -> String {
    let width = batch.len().to_string().len();
    let mut report = format!("batching {} statements:", batch.len());
    for (i, sql) in batch.iter().enumerate() {
        let _ = write!(report, "\n{:>width$}:  {}", i + 1, sql, width = width);
    }
    report
}

impl<S: Statement> fmt::Debug for StatementSpy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementSpy")
            .field("context", &self.context)
            .field("batch", &self.batch.len())
            .finish()
    }
}
