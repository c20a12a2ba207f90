//! JSON replay fixtures.
//!
//! ```json
//! {
//!   "sql": "select id, name from customers",
//!   "columns": [
//!     { "name": "id", "type": "integer" },
//!     { "name": "name", "label": "Customer" }
//!   ],
//!   "rows": [[1, "Ann"], [2, null]]
//! }
//! ```

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::MemoryDataSource;
use crate::api::{ColumnMetadata, ResultMetadata};
use crate::error::{Result, SpyError};
use crate::value::{TypeHint, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureColumn {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub type_hint: TypeHint,
}

/// A single query and the rows it returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub sql: String,
    pub columns: Vec<FixtureColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn metadata(&self) -> ResultMetadata {
        ResultMetadata::new(
            self.columns
                .iter()
                .map(|c| {
                    let column = ColumnMetadata::new(c.name.clone(), c.type_hint);
                    match &c.label {
                        Some(label) => column.with_label(label.clone()),
                        None => column,
                    }
                })
                .collect(),
        )
    }

    /// Rows converted according to the declared column types.
    pub fn rows(&self) -> Result<Vec<Vec<Value>>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.columns.len() {
                    return Err(SpyError::Fixture(format!(
                        "row {} has {} values, expected {}",
                        i + 1,
                        row.len(),
                        self.columns.len()
                    )));
                }
                row.iter()
                    .zip(&self.columns)
                    .map(|(raw, column)| {
                        convert(raw, column.type_hint).map_err(|e| {
                            SpyError::Fixture(format!("row {}, column '{}': {}", i + 1, column.name, e))
                        })
                    })
                    .collect::<Result<Vec<Value>>>()
            })
            .collect()
    }

    /// Data source answering this fixture's query.
    pub fn data_source(&self) -> Result<MemoryDataSource> {
        Ok(MemoryDataSource::new().with_query(&self.sql, self.metadata(), self.rows()?))
    }
}

fn convert(raw: &serde_json::Value, hint: TypeHint) -> std::result::Result<Value, String> {
    use serde_json::Value as Json;

    match raw {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => match hint {
            TypeHint::Decimal => Ok(Value::Decimal(n.to_string())),
            TypeHint::Float => n.as_f64().map(Value::Float).ok_or_else(|| n.to_string()),
            _ => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| format!("unsupported number {}", n)),
            },
        },
        Json::String(s) => match hint {
            TypeHint::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| format!("invalid date '{}': {}", s, e)),
            TypeHint::Time => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|e| format!("invalid time '{}': {}", s, e)),
            TypeHint::Timestamp => parse_timestamp(s),
            TypeHint::Binary => decode_hex(s).map(Value::Bytes),
            TypeHint::Blob => decode_hex(s).map(Value::Blob),
            TypeHint::Clob => Ok(Value::Clob(s.clone())),
            TypeHint::Decimal => Ok(Value::Decimal(s.clone())),
            _ => Ok(Value::Text(s.clone())),
        },
        Json::Array(_) | Json::Object(_) => Err("nested values are not supported".to_string()),
    }
}

fn parse_timestamp(s: &str) -> std::result::Result<Value, String> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(Value::Timestamp)
        .ok_or_else(|| format!("invalid timestamp '{}'", s))
}

fn decode_hex(s: &str) -> std::result::Result<Vec<u8>, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in '{}'", s));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex '{}'", s))
        })
        .collect()
}
