//! Integration tests for cursor spies and result table collection.

mod common;

use std::sync::Arc;

use dbspy::api::ResultCursor;
use dbspy::memory::{MemoryCursor, MemoryDataSource};
use dbspy::{ConnectionRegistry, CursorSpy, DataSourceSpy, DbError, SpyError, Value};

use common::{customers, customers_metadata, customers_rows, Event, RecordingLog, CUSTOMERS};

fn open(source: MemoryDataSource, log: &Arc<RecordingLog>) -> CursorSpy<MemoryCursor> {
    let spy = DataSourceSpy::with_registry(source, log.clone(), Arc::new(ConnectionRegistry::new()));
    let mut conn = spy.connection().unwrap();
    let mut stmt = conn.create_statement().unwrap();
    let cursor = stmt.execute_query(CUSTOMERS).unwrap();
    conn.close().unwrap();
    cursor
}

#[test]
fn test_full_read_emits_one_table() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    while cursor.next().unwrap() {
        for ordinal in 1..=3usize {
            cursor.get_object(ordinal).unwrap();
            cursor.was_null().unwrap();
        }
    }
    cursor.close().unwrap();

    let expected = "\
|---|-----|-------|
|id |name |val    |
|---|-----|-------|
|1  |a    |[null] |
|2  |b    |x      |
|---|-----|-------|
";
    assert_eq!(log.tables(), vec![expected.to_string()]);
}

#[test]
fn test_early_close_emits_partial_table() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    assert!(cursor.next().unwrap());
    assert_eq!(cursor.get_i64(1).unwrap(), Some(1));
    assert_eq!(cursor.get_string("NAME").unwrap().as_deref(), Some("a"));
    cursor.close().unwrap();

    let expected = "\
|---|-----|---------|
|id |name |val      |
|---|-----|---------|
|1  |a    |[unread] |
|---|-----|---------|
";
    assert_eq!(log.tables(), vec![expected.to_string()]);
}

#[test]
fn test_fill_in_reads_skipped_columns() {
    let log = RecordingLog::collecting(true);
    let mut cursor = open(customers(), &log);

    assert!(cursor.next().unwrap());
    cursor.get_object(1).unwrap();
    cursor.close().unwrap();

    let tables = log.tables();
    assert_eq!(tables.len(), 1);
    assert!(tables[0].contains("|1  |a    |[null] |"), "{}", tables[0]);
}

#[test]
fn test_null_without_null_check_shows_value() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    cursor.next().unwrap();
    assert_eq!(cursor.get_object(3).unwrap(), Value::Null);
    cursor.close().unwrap();

    assert!(log.tables()[0].contains("|[unread] |[unread] |null |"));
}

#[test]
fn test_empty_result_is_emitted_once() {
    let log = RecordingLog::collecting(false);
    let source = MemoryDataSource::new().with_query(CUSTOMERS, customers_metadata(), vec![]);
    let mut cursor = open(source, &log);

    assert!(!cursor.next().unwrap());
    cursor.close().unwrap();

    let expected = "\
|---|-----|----|
|id |name |val |
|---|-----|----|
|---|-----|----|
";
    assert_eq!(log.tables(), vec![expected.to_string()]);
}

#[test]
fn test_close_without_advancing_emits_header() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);
    cursor.close().unwrap();

    let tables = log.tables();
    assert_eq!(tables.len(), 1);
    assert!(tables[0].contains("|id |name |val |"));
}

#[test]
fn test_rewind_starts_a_new_table() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    while cursor.next().unwrap() {}
    assert!(cursor.first().unwrap());
    cursor.get_object(2).unwrap();
    cursor.close().unwrap();

    let tables = log.tables();
    assert_eq!(tables.len(), 2);
    assert!(tables[1].contains("|[unread] |a    |[unread] |"), "{}", tables[1]);
}

#[test]
fn test_no_collection_when_disabled() {
    let log = Arc::new(RecordingLog::default());
    let mut cursor = open(customers(), &log);

    assert!(cursor.collector().is_none());
    while cursor.next().unwrap() {
        cursor.get_object(1).unwrap();
    }
    cursor.close().unwrap();

    assert!(log.tables().is_empty());
    assert!(log.calls().contains(&"get_object(1)".to_string()));
}

#[test]
fn test_database_errors_pass_through_unchanged() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);
    cursor.next().unwrap();

    let err = cursor.get_object(9).unwrap_err();
    let db = err.as_database().expect("database error");
    assert_eq!(db.sql_state.as_deref(), Some("22023"));

    let exceptions = log.exceptions();
    assert_eq!(exceptions.len(), 1);
    match &exceptions[0] {
        Event::Exception { spy, call, error, sql } => {
            assert_eq!(spy, "1. Cursor");
            assert_eq!(call, "get_object(9)");
            assert_eq!(error, db);
            assert!(sql.is_none());
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_forward_only_first_fails() {
    let log = RecordingLog::collecting(false);
    let source = MemoryDataSource::new().with_cursor(
        CUSTOMERS,
        MemoryCursor::new(customers_metadata(), customers_rows()).forward_only(),
    );
    let mut cursor = open(source, &log);

    let err = cursor.first().unwrap_err();
    assert!(matches!(err, SpyError::Database(ref e) if e.sql_state.as_deref() == Some("HY106")));
    assert!(!log.calls().contains(&"first()".to_string()));
}

#[test]
fn test_metadata_failure_before_close_still_closes() {
    let log = RecordingLog::collecting(false);
    let mut inner = MemoryCursor::new(customers_metadata(), customers_rows());
    inner.fail_metadata(DbError::new("metadata unavailable"));
    let mut cursor = CursorSpy::new(inner, log.clone(), Some(1));

    let err = cursor.close().unwrap_err();
    assert!(matches!(err, SpyError::Collector(_)));
    assert!(cursor.inner().is_closed().unwrap());
    assert!(log.tables().is_empty());
}

#[test]
fn test_cursor_calls_are_logged_in_order() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    cursor.next().unwrap();
    cursor.get_i32("id").unwrap();
    cursor.was_null().unwrap();
    cursor.find_column("val").unwrap();
    cursor.row_number().unwrap();
    cursor.get_bytes(2).unwrap();
    cursor.close().unwrap();

    let cursor_calls: Vec<String> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Returned { spy, call, .. } if spy.ends_with("Cursor") => Some(call),
            _ => None,
        })
        .collect();
    assert_eq!(
        cursor_calls,
        vec![
            "next()",
            "get_i32(id)",
            "was_null()",
            "find_column(val)",
            "row_number()",
            "get_bytes(2)",
            "close()",
        ]
    );
}

#[test]
fn test_table_is_emitted_before_completing_call_returns() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    while cursor.next().unwrap() {
        cursor.get_object(1).unwrap();
    }

    let events = log.events();
    let table_at = events
        .iter()
        .position(|e| matches!(e, Event::Table(_)))
        .expect("table event");
    let last_next_at = events
        .iter()
        .rposition(|e| {
            matches!(e, Event::Returned { call, returned, .. }
                if call == "next()" && returned == "false")
        })
        .expect("final next() return");
    assert!(table_at < last_next_at);
}

#[test]
fn test_table_is_emitted_before_close_returns() {
    let log = RecordingLog::collecting(false);
    let mut cursor = open(customers(), &log);

    assert!(cursor.next().unwrap());
    cursor.close().unwrap();

    let events = log.events();
    let table_at = events
        .iter()
        .position(|e| matches!(e, Event::Table(_)))
        .expect("table event");
    let close_at = events
        .iter()
        .rposition(|e| matches!(e, Event::Returned { call, .. } if call == "close()"))
        .expect("close() return");
    assert!(table_at < close_at);
}
