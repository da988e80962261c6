use std::fmt;

use indexmap::IndexMap;

use crate::db::fold_identifier;

/// A single row: column name to cell text, in column order.
///
/// Cells are always text. Columns missing from a record read as the empty
/// string.
pub type Record = IndexMap<String, String>;

/// Reads a cell, treating an absent column as the empty string.
pub(crate) fn cell<'r>(record: &'r Record, column: &str) -> &'r str {
    record.get(column).map(String::as_str).unwrap_or("")
}

/// An in-memory relation with ordered columns and ordered rows.
///
/// `columns` is authoritative for the shape of a row and the order of a
/// projection. Only [`Database::insert`](crate::Database::insert) enforces
/// that a record carries exactly these keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given columns.
    ///
    /// Column names are case-folded so they line up with parsed queries.
    pub fn new<S: AsRef<str>>(name: &str, columns: &[S]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| fold_identifier(c.as_ref())).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a table holding `rows`.
    ///
    /// Row keys are case-folded like column names. When `columns` is empty
    /// the column list is taken from the keys of the first row.
    pub fn from_records<S: AsRef<str>>(name: &str, columns: &[S], rows: Vec<Record>) -> Self {
        let mut table = Self::new(name, columns);
        let rows: Vec<Record> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(key, value)| (fold_identifier(&key), value))
                    .collect()
            })
            .collect();

        if table.columns.is_empty()
            && let Some(first) = rows.first()
        {
            table.columns = first.keys().cloned().collect();
        }

        table.rows = rows;
        table
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Table: {} ===", self.name)?;

        if self.rows.is_empty() {
            return writeln!(f, "[empty]");
        }

        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| cell(row, col).chars().count())
                    .fold(col.chars().count(), usize::max)
            })
            .collect();

        let header = self
            .columns
            .iter()
            .zip(widths.iter().copied())
            .map(|(col, width)| format!("{col: <width$}"))
            .collect::<Vec<_>>()
            .join(" | ");

        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.chars().count()))?;

        for row in &self.rows {
            let line = self
                .columns
                .iter()
                .zip(widths.iter().copied())
                .map(|(col, width)| format!("{: <width$}", cell(row, col)))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
