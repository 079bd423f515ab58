//! Sheet session abstraction.
//!
//! A session is an open handle on one worksheet. Rows and columns are
//! 1-based, as in the spreadsheet UI; row 1 holds the column headers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ConnectError, StoreError};

/// Column holding the entry status (`F`).
pub const STATUS_COLUMN: u32 = 6;

/// Number of columns in a ledger row (`A` to `G`).
pub const ROW_WIDTH: u32 = 7;

/// A value written to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Text(String),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// An open worksheet.
pub trait SheetSession: Send {
    /// Worksheet title, for logging.
    fn title(&self) -> &str;

    /// Append a row after the last non-empty row; returns its position.
    fn append_row(&mut self, values: &[Cell]) -> Result<u32, StoreError>;

    /// Values of a row as displayed; empty when the row has no data.
    fn row_values(&mut self, row: u32) -> Result<Vec<String>, StoreError>;

    /// Overwrite a row starting at column `A`.
    fn update_row(&mut self, row: u32, values: &[Cell]) -> Result<(), StoreError>;

    /// Overwrite a single cell.
    fn update_cell(&mut self, row: u32, column: u32, value: Cell) -> Result<(), StoreError>;
}

/// Opens sessions on demand.
pub trait SessionConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn SheetSession>, ConnectError>;
}

impl<F> SessionConnector for F
where
    F: Fn() -> Result<Box<dyn SheetSession>, ConnectError> + Send + Sync,
{
    fn connect(&self) -> Result<Box<dyn SheetSession>, ConnectError> {
        self()
    }
}
