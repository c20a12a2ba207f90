use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::api::{Accessor, ColumnRef, ResultCursor, ResultMetadata};
use crate::error::{DbError, DbResult};
use crate::value::Value;

/// A cursor over rows held in memory.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    metadata: ResultMetadata,
    rows: Vec<Vec<Value>>,
    /// 0 before the first row, `rows.len() + 1` after the last
    position: usize,
    closed: bool,
    was_null: bool,
    forward_only: bool,
    metadata_error: Option<DbError>,
    column_errors: HashMap<usize, DbError>,
}

impl MemoryCursor {
    pub fn new(metadata: ResultMetadata, rows: Vec<Vec<Value>>) -> Self {
        Self {
            metadata,
            rows,
            position: 0,
            closed: false,
            was_null: false,
            forward_only: false,
            metadata_error: None,
            column_errors: HashMap::new(),
        }
    }

    /// Refuse `first()` like a forward-only driver cursor.
    pub fn forward_only(mut self) -> Self {
        self.forward_only = true;
        self
    }

    /// Make `metadata()` fail with `error`.
    pub fn fail_metadata(&mut self, error: DbError) {
        self.metadata_error = Some(error);
    }

    /// Make every read of the column at `ordinal` fail with `error`.
    pub fn fail_column(&mut self, ordinal: usize, error: DbError) {
        self.column_errors.insert(ordinal, error);
    }

    fn ensure_open(&self) -> DbResult<()> {
        if self.closed {
            return Err(DbError::new("cursor is closed").with_state("24000"));
        }
        Ok(())
    }

    fn ordinal(&self, column: &ColumnRef) -> DbResult<usize> {
        match column {
            ColumnRef::Ordinal(i) if (1..=self.metadata.column_count()).contains(i) => Ok(*i),
            ColumnRef::Ordinal(i) => Err(DbError::new(format!("column index {} out of range", i))
                .with_state("22023")),
            ColumnRef::Name(name) => self.find_column(name),
        }
    }

    /// Raw value at the current row, recording NULL for `was_null`.
    fn read(&mut self, column: &ColumnRef) -> DbResult<Value> {
        self.ensure_open()?;
        let ordinal = self.ordinal(column)?;
        if self.position == 0 || self.position > self.rows.len() {
            return Err(DbError::new("cursor is not positioned on a row").with_state("24000"));
        }
        if let Some(err) = self.column_errors.get(&ordinal) {
            return Err(err.clone());
        }
        let value = self.rows[self.position - 1]
            .get(ordinal - 1)
            .cloned()
            .unwrap_or(Value::Null);
        self.was_null = value.is_null();
        Ok(value)
    }
}

impl ResultCursor for MemoryCursor {
    fn next(&mut self) -> DbResult<bool> {
        self.ensure_open()?;
        if self.position <= self.rows.len() {
            self.position += 1;
        }
        Ok(self.position <= self.rows.len())
    }

    fn first(&mut self) -> DbResult<bool> {
        self.ensure_open()?;
        if self.forward_only {
            return Err(DbError::new("operation not allowed on a forward-only cursor")
                .with_state("HY106"));
        }
        self.position = if self.rows.is_empty() { 0 } else { 1 };
        Ok(!self.rows.is_empty())
    }

    fn close(&mut self) -> DbResult<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> DbResult<bool> {
        Ok(self.closed)
    }

    fn metadata(&self) -> DbResult<Option<ResultMetadata>> {
        self.ensure_open()?;
        if let Some(err) = &self.metadata_error {
            return Err(err.clone());
        }
        Ok(Some(self.metadata.clone()))
    }

    fn was_null(&self) -> DbResult<bool> {
        self.ensure_open()?;
        Ok(self.was_null)
    }

    fn find_column(&self, name: &str) -> DbResult<usize> {
        self.ensure_open()?;
        self.metadata
            .columns()
            .iter()
            .position(|c| c.label.eq_ignore_ascii_case(name) || c.name.eq_ignore_ascii_case(name))
            .map(|i| i + 1)
            .ok_or_else(|| DbError::new(format!("column '{}' not found", name)).with_state("42S22"))
    }

    fn row_number(&self) -> DbResult<usize> {
        self.ensure_open()?;
        if self.position > self.rows.len() {
            return Ok(0);
        }
        Ok(self.position)
    }

    fn get(&mut self, column: &ColumnRef, accessor: Accessor) -> DbResult<Value> {
        let raw = self.read(column)?;
        convert(raw, accessor)
    }

    fn get_bytes(&mut self, column: &ColumnRef) -> DbResult<Option<Vec<u8>>> {
        match self.read(column)? {
            Value::Null => Ok(None),
            Value::Bytes(b) | Value::Blob(b) => Ok(Some(b)),
            Value::Text(s) | Value::Clob(s) => Ok(Some(s.into_bytes())),
            other => Err(conversion_error(&other, "bytes")),
        }
    }
}

fn conversion_error(value: &Value, target: &str) -> DbError {
    DbError::new(format!("cannot convert {} to {}", value.type_name(), target)).with_state("22018")
}

fn narrow(value: &Value, min: i64, max: i64, target: &str) -> DbResult<Value> {
    match value.as_i64() {
        Some(v) if (min..=max).contains(&v) => Ok(Value::Int(v)),
        Some(_) => Err(DbError::new(format!("value out of range for {}", target)).with_state("22003")),
        None => Err(conversion_error(value, target)),
    }
}

/// Apply an accessor's conversion to a raw column value.
fn convert(raw: Value, accessor: Accessor) -> DbResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match accessor {
        Accessor::Object => Ok(raw),
        Accessor::String => Ok(match raw {
            Value::Text(s) | Value::Clob(s) | Value::Decimal(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }),
        Accessor::Long => narrow(&raw, i64::MIN, i64::MAX, "i64"),
        Accessor::Int => narrow(&raw, i32::MIN.into(), i32::MAX.into(), "i32"),
        Accessor::Short => narrow(&raw, i16::MIN.into(), i16::MAX.into(), "i16"),
        Accessor::Byte => narrow(&raw, i8::MIN.into(), i8::MAX.into(), "i8"),
        Accessor::Float | Accessor::Double => raw
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| conversion_error(&raw, "float")),
        Accessor::Decimal => match raw {
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => Ok(Value::Decimal(raw.to_string())),
            Value::Text(ref s) if s.trim().parse::<f64>().is_ok() => {
                Ok(Value::Decimal(s.trim().to_string()))
            }
            other => Err(conversion_error(&other, "decimal")),
        },
        Accessor::Boolean => raw
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| conversion_error(&raw, "bool")),
        Accessor::Date => match raw {
            Value::Date(d) => Ok(Value::Date(d)),
            Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
            Value::Text(ref s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| conversion_error(&raw, "date")),
            other => Err(conversion_error(&other, "date")),
        },
        Accessor::Time => match raw {
            Value::Time(t) => Ok(Value::Time(t)),
            Value::Timestamp(ts) => Ok(Value::Time(ts.time())),
            Value::Text(ref s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|_| conversion_error(&raw, "time")),
            other => Err(conversion_error(&other, "time")),
        },
        Accessor::Timestamp => raw
            .as_timestamp()
            .map(Value::Timestamp)
            .ok_or_else(|| conversion_error(&raw, "timestamp")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ColumnMetadata;
    use crate::value::TypeHint;

    fn cursor() -> MemoryCursor {
        MemoryCursor::new(
            ResultMetadata::new(vec![
                ColumnMetadata::new("id", TypeHint::Integer),
                ColumnMetadata::new("created", TypeHint::Date).with_label("Created On"),
            ]),
            vec![
                vec![Value::Int(7), Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())],
                vec![Value::Int(70000), Value::Null],
            ],
        )
    }

    #[test]
    fn test_iteration_and_row_number() {
        let mut c = cursor();
        assert_eq!(c.row_number().unwrap(), 0);
        assert!(c.next().unwrap());
        assert_eq!(c.row_number().unwrap(), 1);
        assert!(c.next().unwrap());
        assert!(!c.next().unwrap());
        assert!(!c.next().unwrap());
        assert_eq!(c.row_number().unwrap(), 0);
        assert!(c.first().unwrap());
        assert_eq!(c.row_number().unwrap(), 1);
    }

    #[test]
    fn test_read_before_first_row_fails() {
        let mut c = cursor();
        let err = c.get(&ColumnRef::Ordinal(1), Accessor::Long).unwrap_err();
        assert_eq!(err.sql_state.as_deref(), Some("24000"));
    }

    #[test]
    fn test_accessor_conversions() {
        let mut c = cursor();
        c.next().unwrap();
        assert_eq!(c.get(&ColumnRef::Ordinal(1), Accessor::String).unwrap(), Value::Text("7".into()));
        assert_eq!(c.get(&ColumnRef::Ordinal(1), Accessor::Double).unwrap(), Value::Float(7.0));
        assert_eq!(
            c.get(&"created on".into(), Accessor::String).unwrap(),
            Value::Text("2024-05-01".into())
        );
        assert!(matches!(
            c.get(&ColumnRef::Ordinal(2), Accessor::Timestamp).unwrap(),
            Value::Timestamp(_)
        ));
        assert!(c.get(&ColumnRef::Ordinal(2), Accessor::Boolean).is_err());

        c.next().unwrap();
        assert_eq!(c.get(&ColumnRef::Ordinal(1), Accessor::Int).unwrap(), Value::Int(70000));
        assert_eq!(
            c.get(&ColumnRef::Ordinal(1), Accessor::Short).unwrap_err().sql_state.as_deref(),
            Some("22003")
        );
    }

    #[test]
    fn test_was_null_tracks_last_read() {
        let mut c = cursor();
        c.next().unwrap();
        c.next().unwrap();
        assert_eq!(c.get(&ColumnRef::Ordinal(2), Accessor::Date).unwrap(), Value::Null);
        assert!(c.was_null().unwrap());
        c.get(&ColumnRef::Ordinal(1), Accessor::Long).unwrap();
        assert!(!c.was_null().unwrap());
    }

    #[test]
    fn test_find_column_matches_name_or_label() {
        let c = cursor();
        assert_eq!(c.find_column("ID").unwrap(), 1);
        assert_eq!(c.find_column("created").unwrap(), 2);
        assert_eq!(c.find_column("CREATED ON").unwrap(), 2);
        assert!(c.find_column("missing").is_err());
    }

    #[test]
    fn test_closed_cursor_refuses_metadata() {
        let mut c = cursor();
        c.close().unwrap();
        assert!(c.is_closed().unwrap());
        assert!(c.metadata().is_err());
        assert!(c.next().is_err());
    }

    #[test]
    fn test_forward_only_refuses_first() {
        let mut c = cursor().forward_only();
        assert_eq!(c.first().unwrap_err().sql_state.as_deref(), Some("HY106"));
    }

    #[test]
    fn test_read_generic_widens_by_declared_type() {
        let mut c = MemoryCursor::new(
            ResultMetadata::new(vec![ColumnMetadata::new("at", TypeHint::Timestamp)]),
            vec![vec![Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())]],
        );
        c.next().unwrap();
        assert_eq!(
            c.read_generic(1).unwrap().to_string(),
            "2024-05-01 00:00:00"
        );
    }
}
