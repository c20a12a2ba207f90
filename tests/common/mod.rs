//! Shared helpers for the spy integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use dbspy::api::{ColumnMetadata, ResultMetadata};
use dbspy::log::{SpyContext, SpyLog};
use dbspy::memory::MemoryDataSource;
use dbspy::render::render_collected;
use dbspy::{ConnectionRegistry, DbError, RowCollector, TypeHint, Value};

pub const CUSTOMERS: &str = "select id, name, val from customers";

/// One event received by [`RecordingLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Returned { spy: String, call: String, returned: String },
    Exception { spy: String, call: String, error: DbError, sql: Option<String> },
    Sql(String),
    Timing(String),
    Opened { number: Option<u64>, dump: String },
    Closed { number: Option<u64>, dump: String },
    Table(String),
}

/// Log that keeps every event for inspection.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub collect: bool,
    pub fill_in: bool,
    pub statement_warn: bool,
    events: Mutex<Vec<Event>>,
}

impl RecordingLog {
    pub fn collecting(fill_in: bool) -> Arc<Self> {
        Arc::new(Self {
            collect: true,
            fill_in,
            ..Default::default()
        })
    }

    pub fn warning_statements() -> Arc<Self> {
        Arc::new(Self {
            statement_warn: true,
            ..Default::default()
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn tables(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn exceptions(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Exception { .. }))
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Returned { call, .. } => Some(call),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl SpyLog for RecordingLog {
    fn exception_occurred(
        &self,
        spy: &SpyContext,
        call: &dyn fmt::Display,
        error: &DbError,
        sql: Option<&str>,
        _elapsed: Option<Duration>,
    ) {
        self.push(Event::Exception {
            spy: spy.to_string(),
            call: call.to_string(),
            error: error.clone(),
            sql: sql.map(str::to_string),
        });
    }

    fn method_returned(&self, spy: &SpyContext, call: &dyn fmt::Display, returned: &dyn fmt::Display) {
        self.push(Event::Returned {
            spy: spy.to_string(),
            call: call.to_string(),
            returned: returned.to_string(),
        });
    }

    fn sql_occurred(&self, _spy: &SpyContext, _call: &dyn fmt::Display, sql: &str) {
        self.push(Event::Sql(sql.to_string()));
    }

    fn sql_timing_occurred(
        &self,
        _spy: &SpyContext,
        _elapsed: Duration,
        _call: &dyn fmt::Display,
        sql: &str,
    ) {
        self.push(Event::Timing(sql.to_string()));
    }

    fn connection_opened(&self, spy: &SpyContext, _elapsed: Duration, registry: &ConnectionRegistry) {
        self.push(Event::Opened {
            number: spy.connection_number,
            dump: registry.dump(),
        });
    }

    fn connection_closed(&self, spy: &SpyContext, _elapsed: Duration, registry: &ConnectionRegistry) {
        self.push(Event::Closed {
            number: spy.connection_number,
            dump: registry.dump(),
        });
    }

    fn is_collection_enabled(&self) -> bool {
        self.collect
    }

    fn is_fill_in_enabled(&self) -> bool {
        self.fill_in
    }

    fn is_statement_warn_enabled(&self) -> bool {
        self.statement_warn
    }

    fn result_set_collected(&self, _spy: &SpyContext, collector: &RowCollector) {
        self.push(Event::Table(render_collected(collector)));
    }
}

pub fn customers_metadata() -> ResultMetadata {
    ResultMetadata::new(vec![
        ColumnMetadata::new("id", TypeHint::Integer),
        ColumnMetadata::new("name", TypeHint::Text),
        ColumnMetadata::new("val", TypeHint::Text),
    ])
}

pub fn customers_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Int(1), "a".into(), Value::Null],
        vec![Value::Int(2), "b".into(), "x".into()],
    ]
}

pub fn customers() -> MemoryDataSource {
    MemoryDataSource::new().with_query(CUSTOMERS, customers_metadata(), customers_rows())
}
