//! Table types.

use serde::{Deserialize, Serialize};

/// A raw grid of free-text cells, rows x columns.
///
/// The grid is always rectangular: short rows are padded with empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Rows of cells
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from rows, padding them to a common width.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { rows }
    }

    /// Build a table from string slices (handy for fixtures).
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
        )
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.column_count() == 0
    }

    /// Get a cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(col).map(String::as_str))
    }

    /// Plain text representation (tab-separated cells).
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_table_is_padded() {
        let table = RawTable::from_rows(&[vec!["Audit services", "2,000"], vec!["Total"]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(1, 1), Some(""));
    }

    #[test]
    fn test_column() {
        let table = RawTable::from_rows(&[vec!["a", "1"], vec!["b", "2"]]);
        let col: Vec<&str> = table.column(1).collect();
        assert_eq!(col, vec!["1", "2"]);
        assert_eq!(table.plain_text(), "a\t1\nb\t2");
    }

    #[test]
    fn test_empty() {
        assert!(RawTable::default().is_empty());
        assert!(RawTable::new(vec![vec![]]).is_empty());
    }
}
