use std::fmt;

use crate::value::Value;

/// One cell of a collected row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// The application never read this column in this row
    Unread,
    /// Read, and the cursor reported SQL NULL
    Null,
    /// Fill-in tried to read the column and failed
    FillError,
    Value(Value),
}

impl Cell {
    pub fn is_unread(&self) -> bool {
        matches!(self, Cell::Unread)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Unread => f.write_str("[unread]"),
            Cell::Null => f.write_str("[null]"),
            Cell::FillError => f.write_str("[unread!]"),
            Cell::Value(v) => write!(f, "{}", v),
        }
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Value(v)
    }
}

/// A row of cells, positionally aligned to column ordinals (index 0 = column 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// Row of `width` cells, all unread.
    pub fn unread(width: usize) -> Self {
        Self {
            cells: vec![Cell::Unread; width],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a 1-based ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&Cell> {
        ordinal.checked_sub(1).and_then(|i| self.cells.get(i))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn set(&mut self, ordinal: usize, cell: Cell) {
        self.cells[ordinal - 1] = cell;
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}
