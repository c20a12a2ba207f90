//! The database client API that dbspy wraps.
//!
//! A driver binding implements these traits; the spies in [`crate::spy`]
//! implement the same operations on top of them, adding logging.

use std::fmt;

use crate::error::DbResult;
use crate::value::{normalize, TypeHint, Value};

/// Reference to a column of the current row: by 1-based ordinal or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Ordinal(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(ordinal: usize) -> Self {
        ColumnRef::Ordinal(ordinal)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Ordinal(i) => write!(f, "{}", i),
            ColumnRef::Name(name) => f.write_str(name),
        }
    }
}

/// The typed getter family of a cursor.
///
/// Every accessor reads one column of the current row. Raw byte reads are
/// deliberately not part of this family: they go through
/// [`ResultCursor::get_bytes`] and are not collected into logged tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    String,
    Long,
    Int,
    Short,
    Byte,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    Time,
    Timestamp,
    Object,
}

impl Accessor {
    /// Method name used when describing the call in logs.
    pub fn method_name(self) -> &'static str {
        match self {
            Accessor::String => "get_string",
            Accessor::Long => "get_i64",
            Accessor::Int => "get_i32",
            Accessor::Short => "get_i16",
            Accessor::Byte => "get_i8",
            Accessor::Float => "get_f32",
            Accessor::Double => "get_f64",
            Accessor::Decimal => "get_decimal",
            Accessor::Boolean => "get_bool",
            Accessor::Date => "get_date",
            Accessor::Time => "get_time",
            Accessor::Timestamp => "get_timestamp",
            Accessor::Object => "get_object",
        }
    }
}

/// Description of one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Display name, e.g. from `SELECT id AS "Customer Id"`
    pub label: String,
    pub type_hint: TypeHint,
}

impl ColumnMetadata {
    /// Column whose label equals its name.
    pub fn new(name: impl Into<String>, type_hint: TypeHint) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            type_hint,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Structure of a result: its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultMetadata {
    columns: Vec<ColumnMetadata>,
}

impl ResultMetadata {
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column at a 1-based ordinal.
    pub fn column(&self, ordinal: usize) -> Option<&ColumnMetadata> {
        ordinal.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }
}

/// A forward-only, read-once result cursor.
///
/// Positioned before the first row until [`next`](ResultCursor::next) or
/// [`first`](ResultCursor::first) returns `true`.
pub trait ResultCursor {
    /// Advance to the next row; `false` once past the last row.
    fn next(&mut self) -> DbResult<bool>;

    /// Move to the first row. Forward-only drivers may refuse.
    fn first(&mut self) -> DbResult<bool>;

    fn close(&mut self) -> DbResult<()>;

    fn is_closed(&self) -> DbResult<bool>;

    /// Result structure; `None` for results that return no rows.
    /// Some drivers refuse this once the cursor is closed.
    fn metadata(&self) -> DbResult<Option<ResultMetadata>>;

    /// Whether the last column read was SQL NULL.
    fn was_null(&self) -> DbResult<bool>;

    /// Ordinal of a column, matched case-insensitively.
    fn find_column(&self, name: &str) -> DbResult<usize>;

    /// 1-based number of the current row, 0 when not on a row.
    fn row_number(&self) -> DbResult<usize>;

    /// Read a column of the current row through a typed accessor.
    fn get(&mut self, column: &ColumnRef, accessor: Accessor) -> DbResult<Value>;

    fn get_bytes(&mut self, column: &ColumnRef) -> DbResult<Option<Vec<u8>>>;

    /// Best-effort read of a column without knowing its type up front.
    ///
    /// Used to fill in columns the application never read. The default reads
    /// through [`Accessor::Object`] and normalizes against the declared type.
    fn read_generic(&mut self, ordinal: usize) -> DbResult<Value> {
        let raw = self.get(&ColumnRef::Ordinal(ordinal), Accessor::Object)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let hint = self
            .metadata()?
            .and_then(|m| m.column(ordinal).map(|c| c.type_hint));
        Ok(normalize(raw, hint))
    }
}

/// A statement that executes SQL text.
pub trait Statement {
    type Cursor: ResultCursor;

    fn execute_query(&mut self, sql: &str) -> DbResult<Self::Cursor>;

    /// Execute DML/DDL, returning the affected row count.
    fn execute_update(&mut self, sql: &str) -> DbResult<u64>;

    /// Execute any SQL. `true` when it produced a result set.
    fn execute(&mut self, sql: &str) -> DbResult<bool>;

    /// Queue SQL for the next [`execute_batch`](Statement::execute_batch).
    fn add_batch(&mut self, sql: &str) -> DbResult<()>;

    fn clear_batch(&mut self) -> DbResult<()>;

    /// Run the queued SQL, returning one update count per statement.
    fn execute_batch(&mut self) -> DbResult<Vec<u64>>;

    fn close(&mut self) -> DbResult<()>;

    fn is_closed(&self) -> DbResult<bool>;
}

/// An open database session.
pub trait Connection {
    type Statement: Statement;

    fn create_statement(&mut self) -> DbResult<Self::Statement>;

    fn commit(&mut self) -> DbResult<()>;

    fn rollback(&mut self) -> DbResult<()>;

    fn close(&mut self) -> DbResult<()>;

    fn is_closed(&self) -> DbResult<bool>;
}

/// Factory for connections.
pub trait DataSource {
    type Connection: Connection;

    fn connection(&self) -> DbResult<Self::Connection>;
}
