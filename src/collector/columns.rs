use std::collections::HashMap;

use crate::api::{ColumnRef, ResultCursor, ResultMetadata};
use crate::error::CollectorError;

/// Column of a collected table. Name and label are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// 1-based position
    pub ordinal: usize,
    pub name: String,
    pub label: String,
}

/// Column structure of one cursor, captured once.
///
/// Metadata is copied out as soon as it is available because several drivers
/// refuse to describe a cursor after it has been closed, and the table is often
/// rendered right at close.
#[derive(Debug, Default)]
pub struct ColumnSet {
    loaded: bool,
    columns: Vec<ColumnDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn get(&self, ordinal: usize) -> Option<&ColumnDescriptor> {
        ordinal.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Capture the cursor's structure unless already done.
    ///
    /// A cursor that is already closed leaves the set loaded with zero
    /// columns. Any other failure to describe a live cursor is escalated.
    pub fn load_if_needed<C: ResultCursor + ?Sized>(
        &mut self,
        cursor: &C,
    ) -> Result<(), CollectorError> {
        if self.loaded {
            return Ok(());
        }
        if cursor.is_closed().map_err(CollectorError::Metadata)? {
            debug!("Cursor already closed, result table has no column metadata");
            self.loaded = true;
            return Ok(());
        }
        let metadata = cursor.metadata().map_err(CollectorError::Metadata)?;
        self.load_from(metadata.as_ref());
        Ok(())
    }

    /// Capture structure from metadata the application already fetched.
    pub fn load_from(&mut self, metadata: Option<&ResultMetadata>) {
        if self.loaded {
            return;
        }
        let mut columns = Vec::new();
        let mut by_name = HashMap::new();
        if let Some(metadata) = metadata {
            columns.reserve(metadata.column_count());
            for (i, column) in metadata.columns().iter().enumerate() {
                let ordinal = i + 1;
                let label = column.label.to_lowercase();
                let name = column.name.to_lowercase();
                by_name.insert(label.clone(), ordinal);
                by_name.insert(name.clone(), ordinal);
                columns.push(ColumnDescriptor {
                    ordinal,
                    name,
                    label,
                });
            }
        }
        trace!("Loaded result metadata: {} columns", columns.len());
        self.columns = columns;
        self.by_name = by_name;
        self.loaded = true;
    }

    /// Resolve a column reference to its ordinal.
    pub fn resolve(&self, column: &ColumnRef) -> Result<usize, CollectorError> {
        match column {
            ColumnRef::Ordinal(ordinal) => self.check_ordinal(*ordinal),
            ColumnRef::Name(name) => self.resolve_name(name),
        }
    }

    pub(crate) fn check_ordinal(&self, ordinal: usize) -> Result<usize, CollectorError> {
        if ordinal == 0 {
            return Err(CollectorError::MissingColumn);
        }
        if ordinal > self.count() {
            return Err(CollectorError::ColumnOutOfRange {
                ordinal,
                count: self.count(),
            });
        }
        Ok(ordinal)
    }

    pub(crate) fn resolve_name(&self, name: &str) -> Result<usize, CollectorError> {
        if !self.loaded {
            return Err(CollectorError::MetadataNotLoaded(name.to_string()));
        }
        self.by_name
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| CollectorError::UnknownColumn(name.to_string()))
    }

    pub fn clear(&mut self) {
        self.loaded = false;
        self.columns.clear();
        self.by_name.clear();
    }
}
