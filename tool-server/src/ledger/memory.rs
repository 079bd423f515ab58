//! In-process sheet, for offline use and tests.

use super::error::StoreError;
use super::session::{Cell, SheetSession};

/// Column headers seeded into row 1.
pub const HEADER_ROW: [&str; 7] = ["日期", "時間", "名稱", "個數", "小計價格", "狀態", "備註"];

/// A worksheet held in memory.
///
/// Cells are kept as their displayed text, matching what a real sheet
/// hands back on read.
#[derive(Debug, Clone)]
pub struct MemorySheet {
    title: String,
    rows: Vec<Vec<String>>,
}

impl MemorySheet {
    /// A sheet with the header row in place.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: vec![HEADER_ROW.iter().map(|s| s.to_string()).collect()],
        }
    }

    /// A sheet with no rows at all.
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// All rows, header included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn row_mut(&mut self, row: u32) -> Result<&mut Vec<String>, StoreError> {
        let index = row.checked_sub(1).ok_or_else(|| StoreError::Decode {
            message: "row 0 does not exist".into(),
        })? as usize;
        if self.rows.len() <= index {
            self.rows.resize_with(index + 1, Vec::new);
        }
        Ok(&mut self.rows[index])
    }
}

fn set(row: &mut Vec<String>, column: usize, value: String) {
    if row.len() <= column {
        row.resize(column + 1, String::new());
    }
    row[column] = value;
}

impl SheetSession for MemorySheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn append_row(&mut self, values: &[Cell]) -> Result<u32, StoreError> {
        // Appends land after the last row holding any data.
        while self.rows.last().is_some_and(|r| r.iter().all(String::is_empty)) {
            self.rows.pop();
        }
        self.rows.push(values.iter().map(Cell::to_string).collect());
        Ok(self.rows.len() as u32)
    }

    fn row_values(&mut self, row: u32) -> Result<Vec<String>, StoreError> {
        let mut values = match row.checked_sub(1) {
            Some(index) => self.rows.get(index as usize).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        while values.last().is_some_and(String::is_empty) {
            values.pop();
        }
        Ok(values)
    }

    fn update_row(&mut self, row: u32, values: &[Cell]) -> Result<(), StoreError> {
        let target = self.row_mut(row)?;
        for (column, value) in values.iter().enumerate() {
            set(target, column, value.to_string());
        }
        Ok(())
    }

    fn update_cell(&mut self, row: u32, column: u32, value: Cell) -> Result<(), StoreError> {
        let column = column.checked_sub(1).ok_or_else(|| StoreError::Decode {
            message: "column 0 does not exist".into(),
        })? as usize;
        set(self.row_mut(row)?, column, value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_after_header() {
        let mut sheet = MemorySheet::new("Notebook");
        let row = sheet.append_row(&[Cell::from("a"), Cell::Int(1)]).unwrap();
        assert_eq!(row, 2);
        assert_eq!(sheet.row_values(2).unwrap(), vec!["a", "1"]);
        assert_eq!(sheet.row_values(1).unwrap()[0], "日期");
    }

    #[test]
    fn missing_rows_read_empty() {
        let mut sheet = MemorySheet::new("Notebook");
        assert!(sheet.row_values(0).unwrap().is_empty());
        assert!(sheet.row_values(42).unwrap().is_empty());
    }

    #[test]
    fn update_cell_grows_the_row() {
        let mut sheet = MemorySheet::new("Notebook");
        sheet.append_row(&[Cell::from("a")]).unwrap();
        sheet.update_cell(2, 6, Cell::from("deleted")).unwrap();
        assert_eq!(sheet.row_values(2).unwrap(), vec!["a", "", "", "", "", "deleted"]);
    }

    #[test]
    fn append_skips_trailing_blank_rows() {
        let mut sheet = MemorySheet::new("Notebook");
        sheet.update_cell(5, 1, Cell::from("")).unwrap();
        assert_eq!(sheet.append_row(&[Cell::from("x")]).unwrap(), 2);
    }
}
