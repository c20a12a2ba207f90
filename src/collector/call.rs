use std::fmt;

use crate::api::{Accessor, ColumnRef, ResultMetadata};
use crate::value::Value;

/// Which positioning call moved the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    First,
}

/// A call made against a cursor, as described by the cursor spy.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorCall<'a> {
    /// Typed getter addressed by 1-based ordinal
    PositionalAccessor { accessor: Accessor, ordinal: usize },
    /// Typed getter addressed by column name or label
    NamedAccessor { accessor: Accessor, name: &'a str },
    /// "was the last value read NULL"
    NullCheck,
    Advance(Advance),
    Close,
    /// Explicit metadata request by the application
    MetadataFetch,
    /// Anything else; logged but irrelevant to the table
    Other {
        method: &'static str,
        arg: Option<String>,
    },
}

impl<'a> CursorCall<'a> {
    /// Describe a getter call for the given column reference.
    pub fn accessor(accessor: Accessor, column: &'a ColumnRef) -> Self {
        match column {
            ColumnRef::Ordinal(ordinal) => CursorCall::PositionalAccessor {
                accessor,
                ordinal: *ordinal,
            },
            ColumnRef::Name(name) => CursorCall::NamedAccessor { accessor, name },
        }
    }

    pub fn other(method: &'static str) -> Self {
        CursorCall::Other { method, arg: None }
    }

    pub fn other_with_arg(method: &'static str, arg: impl ToString) -> Self {
        CursorCall::Other {
            method,
            arg: Some(arg.to_string()),
        }
    }
}

impl fmt::Display for CursorCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorCall::PositionalAccessor { accessor, ordinal } => {
                write!(f, "{}({})", accessor.method_name(), ordinal)
            }
            CursorCall::NamedAccessor { accessor, name } => {
                write!(f, "{}({})", accessor.method_name(), name)
            }
            CursorCall::NullCheck => f.write_str("was_null()"),
            CursorCall::Advance(Advance::Next) => f.write_str("next()"),
            CursorCall::Advance(Advance::First) => f.write_str("first()"),
            CursorCall::Close => f.write_str("close()"),
            CursorCall::MetadataFetch => f.write_str("metadata()"),
            CursorCall::Other { method, arg: None } => write!(f, "{}()", method),
            CursorCall::Other {
                method,
                arg: Some(arg),
            } => write!(f, "{}({})", method, arg),
        }
    }
}

/// What a forwarded call returned.
#[derive(Debug, Clone, Copy)]
pub enum Returned<'a> {
    Void,
    Bool(bool),
    Count(usize),
    Value(&'a Value),
    Bytes(Option<&'a [u8]>),
    Metadata(Option<&'a ResultMetadata>),
}

impl fmt::Display for Returned<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Returned::Void => f.write_str("void"),
            Returned::Bool(b) => write!(f, "{}", b),
            Returned::Count(n) => write!(f, "{}", n),
            Returned::Value(v) => write!(f, "{}", v),
            Returned::Bytes(None) => f.write_str("null"),
            Returned::Bytes(Some(bytes)) => write!(f, "[{} bytes]", bytes.len()),
            Returned::Metadata(None) => f.write_str("null"),
            Returned::Metadata(Some(m)) => write!(f, "metadata({} columns)", m.column_count()),
        }
    }
}
