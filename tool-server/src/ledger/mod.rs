//! Account book kept in a spreadsheet.
//!
//! Each entry is one row of a worksheet:
//!
//! | A    | B    | C    | D     | E        | F      | G    |
//! |------|------|------|-------|----------|--------|------|
//! | date | time | name | count | subtotal | status | note |
//!
//! Row 1 holds the headers; an entry's id is its row number. The
//! [`LedgerAdapter`] implements create, read, update and soft delete over
//! any [`SheetSession`]. Two stores are provided: [`GoogleSheet`] for the
//! real account book and [`MemorySheet`] for offline use.

mod adapter;
mod auth;
mod config;
mod error;
mod google;
mod memory;
mod session;

pub use adapter::{
    DELETED, InvalidMethod, LedgerAdapter, LedgerMethod, LedgerOp, NewEntry, UPDATED,
};
pub use auth::{SCOPES, ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenSource};
pub use config::{
    DEFAULT_CONFIG_FILE, DEFAULT_CREDENTIAL_FILE, DEFAULT_WORKSHEET, LedgerConfig,
    SpreadsheetLocator,
};
pub use error::{ConfigError, ConnectError, LedgerError, StoreError};
pub use google::{GoogleConnector, GoogleSheet, GoogleSheetsClient, column_letter, row_of_range};
pub use memory::{HEADER_ROW, MemorySheet};
pub use session::{Cell, ROW_WIDTH, STATUS_COLUMN, SessionConnector, SheetSession};
