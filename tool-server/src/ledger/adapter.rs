//! Ledger CRUD over an open sheet session.
//!
//! Entries are rows; an entry's id is its 1-based row position. Row 1 is
//! the header, so read, update and delete only accept ids above 1. Deletes
//! are soft: the status column is set to `deleted` and nothing else moves.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use super::error::LedgerError;
use super::session::{Cell, ROW_WIDTH, STATUS_COLUMN, SheetSession};

/// Date stamp written into column `A`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time stamp written into column `B`.
pub const TIME_FORMAT: &str = "%H:%M";

/// Status marker for soft-deleted rows.
pub const DELETED: &str = "deleted";

/// Status marker for rewritten rows.
pub const UPDATED: &str = "update";

/// Report labels with their column widths.
const READ_COLUMNS: [(&str, usize); ROW_WIDTH as usize] = [
    ("日期", 6),
    ("時間", 6),
    ("名稱", 6),
    ("個數", 6),
    ("小計價格", 8),
    ("狀態", 6),
    ("備註", 8),
];

/// Ledger operation named by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerMethod {
    Create,
    Read,
    Update,
    Delete,
}

impl LedgerMethod {
    pub const ALL: [LedgerMethod; 4] = [
        LedgerMethod::Create,
        LedgerMethod::Read,
        LedgerMethod::Update,
        LedgerMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerMethod::Create => "create",
            LedgerMethod::Read => "read",
            LedgerMethod::Update => "update",
            LedgerMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for LedgerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a method name outside [`LedgerMethod::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error: Invalid method specified. Please use 'create', 'read', 'update', or 'delete'.")]
pub struct InvalidMethod(pub String);

impl FromStr for LedgerMethod {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LedgerMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidMethod(s.to_string()))
    }
}

/// Entry fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub count: i64,
    pub subtotal: i64,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, count: i64, subtotal: i64) -> Self {
        Self {
            name: name.into(),
            count,
            subtotal,
        }
    }
}

/// A fully specified ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    Create(NewEntry),
    Read { id: i64 },
    Update { id: i64, entry: NewEntry },
    Delete { id: i64 },
}

impl LedgerOp {
    /// Build an operation from the flat tool arguments.
    ///
    /// Fields the method does not use are dropped, including the id on
    /// create.
    pub fn from_parts(method: LedgerMethod, id: i64, entry: NewEntry) -> Self {
        match method {
            LedgerMethod::Create => LedgerOp::Create(entry),
            LedgerMethod::Read => LedgerOp::Read { id },
            LedgerMethod::Update => LedgerOp::Update { id, entry },
            LedgerMethod::Delete => LedgerOp::Delete { id },
        }
    }

    pub fn method(&self) -> LedgerMethod {
        match self {
            LedgerOp::Create(_) => LedgerMethod::Create,
            LedgerOp::Read { .. } => LedgerMethod::Read,
            LedgerOp::Update { .. } => LedgerMethod::Update,
            LedgerOp::Delete { .. } => LedgerMethod::Delete,
        }
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Check an id addresses a data row, returning the row number.
fn data_row(op: LedgerMethod, id: i64) -> Result<u32, LedgerError> {
    if id <= 1 {
        return Err(LedgerError::InvalidId {
            op: op.as_str(),
            id,
        });
    }
    u32::try_from(id).map_err(|_| LedgerError::NotFound { id })
}

/// CRUD adapter over one sheet session.
pub struct LedgerAdapter {
    session: Option<Box<dyn SheetSession>>,
    clock: fn() -> NaiveDateTime,
}

impl fmt::Debug for LedgerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerAdapter")
            .field("session", &self.session.as_ref().map(|s| s.title()))
            .finish()
    }
}

impl LedgerAdapter {
    /// Adapter over an open session, or none at all.
    pub fn new(session: Option<Box<dyn SheetSession>>) -> Self {
        Self {
            session,
            clock: local_now,
        }
    }

    /// Adapter with no session; every operation fails as not connected.
    pub fn disconnected() -> Self {
        Self::new(None)
    }

    /// Replace the wall clock used for date and time stamps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Attach a session, replacing any previous one.
    pub fn attach(&mut self, session: Box<dyn SheetSession>) {
        self.session = Some(session);
    }

    fn session(&mut self) -> Result<&mut (dyn SheetSession + 'static), LedgerError> {
        self.session.as_deref_mut().ok_or(LedgerError::NotConnected)
    }

    /// Run one operation.
    pub fn execute(&mut self, op: LedgerOp) -> Result<String, LedgerError> {
        match op {
            LedgerOp::Create(entry) => self.create(&entry),
            LedgerOp::Read { id } => self.read(id),
            LedgerOp::Update { id, entry } => self.update(id, &entry),
            LedgerOp::Delete { id } => self.delete(id),
        }
    }

    /// Append a new entry stamped with the current date and time.
    pub fn create(&mut self, entry: &NewEntry) -> Result<String, LedgerError> {
        let now = (self.clock)();
        let session = self.session()?;

        let row = vec![
            Cell::from(now.format(DATE_FORMAT).to_string()),
            Cell::from(now.format(TIME_FORMAT).to_string()),
            Cell::from(entry.name.as_str()),
            Cell::Int(entry.count),
            Cell::Int(entry.subtotal),
        ];
        let id = session.append_row(&row)?;
        info!(sheet = session.title(), id, name = %entry.name, "ledger entry created");

        Ok(format!(
            "Successfully created entry. Item ID is {id}, available for future reference."
        ))
    }

    /// Labeled fixed-width report of one entry.
    pub fn read(&mut self, id: i64) -> Result<String, LedgerError> {
        let session = self.session()?;
        let row = data_row(LedgerMethod::Read, id)?;

        let values = session.row_values(row)?;
        if values.iter().all(|v| v.is_empty()) {
            return Err(LedgerError::NotFound { id });
        }
        debug!(sheet = session.title(), id, "ledger entry read");

        let mut labels = Vec::with_capacity(READ_COLUMNS.len());
        let mut cells = Vec::with_capacity(READ_COLUMNS.len());
        for (i, (label, width)) in READ_COLUMNS.iter().enumerate() {
            let value = values.get(i).map(String::as_str).unwrap_or_default();
            let width = *width.max(&value.chars().count());
            labels.push(format!("{label:<width$}"));
            cells.push(format!("{value:<width$}"));
        }

        Ok(format!(
            "Successfully retrieved entry details for Item ID: {id}.\n{}\n{}",
            labels.join(" ").trim_end(),
            cells.join(" ").trim_end(),
        ))
    }

    /// Rewrite an entry, keeping its original date and time.
    pub fn update(&mut self, id: i64, entry: &NewEntry) -> Result<String, LedgerError> {
        let now = (self.clock)();
        let session = self.session()?;
        let row = data_row(LedgerMethod::Update, id)?;

        let original = session.row_values(row)?;
        if original.iter().all(|v| v.is_empty()) {
            return Err(LedgerError::NotFound { id });
        }
        let kept = |i: usize| Cell::from(original.get(i).cloned().unwrap_or_default());

        let values = vec![
            kept(0),
            kept(1),
            Cell::from(entry.name.as_str()),
            Cell::Int(entry.count),
            Cell::Int(entry.subtotal),
            Cell::from(UPDATED),
            Cell::from(format!(
                "{} {} 更新",
                now.format(TIME_FORMAT),
                now.format(DATE_FORMAT)
            )),
        ];
        session.update_row(row, &values)?;
        info!(sheet = session.title(), id, "ledger entry updated");

        Ok(format!("Successfully updated entry. Item ID: {id}."))
    }

    /// Mark an entry deleted; the row itself stays in place.
    pub fn delete(&mut self, id: i64) -> Result<String, LedgerError> {
        let session = self.session()?;
        let row = data_row(LedgerMethod::Delete, id)?;

        if session.row_values(row)?.iter().all(|v| v.is_empty()) {
            return Err(LedgerError::NotFound { id });
        }
        session.update_cell(row, STATUS_COLUMN, Cell::from(DELETED))?;
        info!(sheet = session.title(), id, "ledger entry deleted");

        Ok(format!("Successfully deleted entry with Item ID: {id}."))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ledger::memory::MemorySheet;
    use proptest::prelude::*;

    proptest! {
        /// Ids at or below the header row never change the sheet.
        #[test]
        fn low_ids_never_mutate(id in i64::MIN..=1, name in "[a-z]{0,8}", count in 0i64..100) {
            let mut ledger = LedgerAdapter::new(Some(Box::new(MemorySheet::new("Notebook"))));
            ledger.create(&NewEntry::new("seed", 1, 1)).unwrap();
            let snapshot: Vec<Vec<String>> = (1..=3)
                .map(|r| ledger.session().unwrap().row_values(r).unwrap())
                .collect();

            let is_invalid = |r: Result<String, LedgerError>| matches!(r, Err(LedgerError::InvalidId { .. }));
            let update_op = LedgerOp::Update { id, entry: NewEntry::new(name, count, count) };
            prop_assert!(is_invalid(ledger.execute(update_op)));
            let delete_op = LedgerOp::Delete { id };
            prop_assert!(is_invalid(ledger.execute(delete_op)));
            let read_op = LedgerOp::Read { id };
            prop_assert!(is_invalid(ledger.execute(read_op)));

            let after: Vec<Vec<String>> = (1..=3)
                .map(|r| ledger.session().unwrap().row_values(r).unwrap())
                .collect();
            prop_assert_eq!(snapshot, after);
        }
    }
}
