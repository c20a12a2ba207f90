//! In-memory implementation of the client API.
//!
//! Backs the replay CLI and the test suite. Results and update counts are
//! registered per SQL text on a [`MemoryDataSource`]; every connection opened
//! from it shares the same script.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{Connection, DataSource, ResultMetadata, Statement};
use crate::error::{DbError, DbResult};
use crate::value::Value;

mod cursor;
mod fixture;

pub use cursor::MemoryCursor;
pub use fixture::{Fixture, FixtureColumn};

#[derive(Debug, Default)]
struct Script {
    queries: HashMap<String, MemoryCursor>,
    updates: HashMap<String, u64>,
    failures: HashMap<String, DbError>,
    connect_error: Option<DbError>,
    executed: Vec<String>,
    commits: usize,
    rollbacks: usize,
}

impl Script {
    fn record(&mut self, sql: &str) -> DbResult<String> {
        let key = sql.trim().to_string();
        self.executed.push(key.clone());
        match self.failures.get(&key) {
            Some(err) => Err(err.clone()),
            None => Ok(key),
        }
    }
}

/// Data source serving scripted results.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSource {
    script: Arc<Mutex<Script>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` for queries with this SQL text.
    pub fn with_query(self, sql: &str, metadata: ResultMetadata, rows: Vec<Vec<Value>>) -> Self {
        self.with_cursor(sql, MemoryCursor::new(metadata, rows))
    }

    /// Serve a prepared cursor (e.g. one with injected failures).
    pub fn with_cursor(self, sql: &str, cursor: MemoryCursor) -> Self {
        self.script
            .lock()
            .queries
            .insert(sql.trim().to_string(), cursor);
        self
    }

    pub fn with_update(self, sql: &str, count: u64) -> Self {
        self.script.lock().updates.insert(sql.trim().to_string(), count);
        self
    }

    /// Fail execution of this SQL text.
    pub fn with_failure(self, sql: &str, error: DbError) -> Self {
        self.script
            .lock()
            .failures
            .insert(sql.trim().to_string(), error);
        self
    }

    /// Fail every connection attempt.
    pub fn with_connect_error(self, error: DbError) -> Self {
        self.script.lock().connect_error = Some(error);
        self
    }

    /// SQL executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.script.lock().executed.clone()
    }

    pub fn commits(&self) -> usize {
        self.script.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.script.lock().rollbacks
    }
}

impl DataSource for MemoryDataSource {
    type Connection = MemoryConnection;

    fn connection(&self) -> DbResult<MemoryConnection> {
        if let Some(err) = &self.script.lock().connect_error {
            return Err(err.clone());
        }
        Ok(MemoryConnection {
            script: Arc::clone(&self.script),
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct MemoryConnection {
    script: Arc<Mutex<Script>>,
    closed: bool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> DbResult<()> {
        if self.closed {
            return Err(DbError::new("connection is closed").with_state("08003"));
        }
        Ok(())
    }
}

impl Connection for MemoryConnection {
    type Statement = MemoryStatement;

    fn create_statement(&mut self) -> DbResult<MemoryStatement> {
        self.ensure_open()?;
        Ok(MemoryStatement {
            script: Arc::clone(&self.script),
            batch: Vec::new(),
            closed: false,
        })
    }

    fn commit(&mut self) -> DbResult<()> {
        self.ensure_open()?;
        self.script.lock().commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        self.ensure_open()?;
        self.script.lock().rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> DbResult<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> DbResult<bool> {
        Ok(self.closed)
    }
}

#[derive(Debug)]
pub struct MemoryStatement {
    script: Arc<Mutex<Script>>,
    batch: Vec<String>,
    closed: bool,
}

impl MemoryStatement {
    fn ensure_open(&self) -> DbResult<()> {
        if self.closed {
            return Err(DbError::new("statement is closed").with_state("HY010"));
        }
        Ok(())
    }
}

impl Statement for MemoryStatement {
    type Cursor = MemoryCursor;

    fn execute_query(&mut self, sql: &str) -> DbResult<MemoryCursor> {
        self.ensure_open()?;
        let mut script = self.script.lock();
        let key = script.record(sql)?;
        script.queries.get(&key).cloned().ok_or_else(|| {
            DbError::new(format!("no result registered for: {}", key)).with_state("42000")
        })
    }

    fn execute_update(&mut self, sql: &str) -> DbResult<u64> {
        self.ensure_open()?;
        let mut script = self.script.lock();
        let key = script.record(sql)?;
        script.updates.get(&key).copied().ok_or_else(|| {
            DbError::new(format!("no update count registered for: {}", key)).with_state("42000")
        })
    }

    fn execute(&mut self, sql: &str) -> DbResult<bool> {
        self.ensure_open()?;
        let mut script = self.script.lock();
        let key = script.record(sql)?;
        if script.queries.contains_key(&key) {
            Ok(true)
        } else if script.updates.contains_key(&key) {
            Ok(false)
        } else {
            Err(DbError::new(format!("nothing registered for: {}", key)).with_state("42000"))
        }
    }

    fn add_batch(&mut self, sql: &str) -> DbResult<()> {
        self.ensure_open()?;
        self.batch.push(sql.to_string());
        Ok(())
    }

    fn clear_batch(&mut self) -> DbResult<()> {
        self.ensure_open()?;
        self.batch.clear();
        Ok(())
    }

    /// Runs the queued statements in order; the queue is emptied either way.
    fn execute_batch(&mut self) -> DbResult<Vec<u64>> {
        self.ensure_open()?;
        let batch = std::mem::take(&mut self.batch);
        let mut script = self.script.lock();
        batch
            .iter()
            .map(|sql| {
                let key = script.record(sql)?;
                script.updates.get(&key).copied().ok_or_else(|| {
                    DbError::new(format!("no update count registered for: {}", key))
                        .with_state("42000")
                })
            })
            .collect()
    }

    fn close(&mut self) -> DbResult<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> DbResult<bool> {
        Ok(self.closed)
    }
}
