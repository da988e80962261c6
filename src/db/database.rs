use std::fmt;

use indexmap::IndexMap;

use crate::{
    DatabaseError,
    db::{
        aggregate::AggregateFunction,
        coerce_number, fold_identifier,
        table::{Record, Table, cell},
    },
    sql::{
        ast::{Condition, OrderBy},
        executor::{Executor, QueryResult},
        parser::SqlParser,
    },
};

/// The main database handle.
///
/// `Database` owns a registry of in-memory [`Table`]s and every operation
/// over them: filtered and ordered reads, inserts, updates, deletes, equality
/// joins and aggregation. All cells are text; numeric coercion happens only
/// where an operation needs numbers.
///
/// Each instance owns its own registry. Mutations take `&mut self`, so the
/// single-writer rule is enforced by the borrow checker rather than a lock.
#[derive(Debug, Default)]
pub struct Database {
    /// All tables currently loaded, keyed by case-folded name in load order.
    pub tables: IndexMap<String, Table>,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under `name`, replacing any table with that name.
    pub fn create_table(&mut self, name: &str, table: Table) {
        let name = fold_identifier(name);
        if self.tables.contains_key(&name) {
            tracing::warn!(table = %name, "table already exists, replacing it");
        }

        tracing::debug!(
            table = %name,
            columns = ?table.columns,
            rows = table.len(),
            "registered table"
        );
        self.tables.insert(name, table);
    }

    /// Gets an immutable reference to a table.
    pub fn get_table(&self, name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(&fold_identifier(name))
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Gets a mutable reference to a table.
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, DatabaseError> {
        self.tables
            .get_mut(&fold_identifier(name))
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Reads rows matching `condition`, projected onto `columns`.
    ///
    /// `None` projects every declared column. A column missing from a row
    /// reads as the empty string. When `order_by` is set the *projected*
    /// rows are sorted by that column as text; the sort is stable in both
    /// directions.
    pub fn select(
        &self,
        table_name: &str,
        columns: Option<&[String]>,
        condition: &Condition,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let table = self.get_table(table_name)?;
        tracing::debug!(table = table_name, %condition, "selecting rows");

        let columns: Vec<String> = match columns {
            Some(columns) => columns.iter().map(|c| fold_identifier(c)).collect(),
            None => table.columns.clone(),
        };

        let mut result = Vec::new();
        for row in &table.rows {
            if condition.matches(row)? {
                result.push(project(row, &columns));
            }
        }

        if let Some(OrderBy { column, descending }) = order_by {
            result.sort_by(|a, b| {
                let ordering = cell(a, column).cmp(cell(b, column));
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(result)
    }

    /// Appends a row given in the table's column order.
    pub fn insert(&mut self, table_name: &str, values: Vec<String>) -> Result<(), DatabaseError> {
        let table = self.get_table_mut(table_name)?;

        if values.len() != table.columns.len() {
            return Err(DatabaseError::SchemaMismatch {
                table: table_name.to_string(),
                expected: table.columns.len(),
                actual: values.len(),
            });
        }

        let row: Record = table.columns.iter().cloned().zip(values).collect();
        table.rows.push(row);

        Ok(())
    }

    /// Overwrites cells on every row matching `condition`.
    ///
    /// Assignments to columns the table does not declare are ignored.
    /// Returns the number of rows matched.
    pub fn update(
        &mut self,
        table_name: &str,
        assignments: &IndexMap<String, String>,
        condition: &Condition,
    ) -> Result<usize, DatabaseError> {
        let table = self.get_table_mut(table_name)?;
        tracing::debug!(table = table_name, %condition, "updating rows");

        let assignments: Vec<(String, &String)> = assignments
            .iter()
            .map(|(column, value)| (fold_identifier(column), value))
            .filter(|(column, _)| table.has_column(column))
            .collect();

        // Evaluate the predicate everywhere first so a failure leaves the table untouched.
        let matched = matching_rows(&table.rows, condition)?;

        for (row, _) in table.rows.iter_mut().zip(&matched).filter(|(_, m)| **m) {
            for (column, value) in &assignments {
                row.insert(column.clone(), (*value).clone());
            }
        }

        Ok(matched.iter().filter(|m| **m).count())
    }

    /// Removes every row matching `condition` and returns how many went.
    ///
    /// [`Condition::All`] empties the table.
    pub fn delete(
        &mut self,
        table_name: &str,
        condition: &Condition,
    ) -> Result<usize, DatabaseError> {
        let table = self.get_table_mut(table_name)?;
        tracing::debug!(table = table_name, %condition, "deleting rows");

        let matched = matching_rows(&table.rows, condition)?;
        let before = table.rows.len();

        let mut matched = matched.into_iter();
        table.rows.retain(|_| !matched.next().unwrap_or(false));

        Ok(before - table.rows.len())
    }

    /// Nested-loop equality join.
    ///
    /// Emits one merged record per pair whose key cells are equal as text.
    /// On a column-name collision the right-hand value wins. `columns`
    /// optionally projects the merged record.
    pub fn join(
        &self,
        left_table: &str,
        right_table: &str,
        left_key: &str,
        right_key: &str,
        columns: Option<&[String]>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let left = self.get_table(left_table)?;
        let right = self.get_table(right_table)?;

        let (left_key, right_key) = (fold_identifier(left_key), fold_identifier(right_key));
        let columns: Option<Vec<String>> =
            columns.map(|columns| columns.iter().map(|c| fold_identifier(c)).collect());

        let mut result = Vec::new();
        for lrow in &left.rows {
            for rrow in &right.rows {
                if cell(lrow, &left_key) != cell(rrow, &right_key) {
                    continue;
                }

                let mut merged = lrow.clone();
                merged.extend(rrow.iter().map(|(k, v)| (k.clone(), v.clone())));

                result.push(match &columns {
                    Some(columns) => project(&merged, columns),
                    None => merged,
                });
            }
        }

        Ok(result)
    }

    /// Aggregates the numeric values of `column` over rows matching `condition`.
    ///
    /// Every value must parse as a number. Returns `None` when no rows match.
    pub fn aggregate(
        &self,
        table_name: &str,
        func: AggregateFunction,
        column: &str,
        condition: &Condition,
    ) -> Result<Option<f64>, DatabaseError> {
        let table = self.get_table(table_name)?;
        let column = fold_identifier(column);

        let mut values = Vec::new();
        for row in &table.rows {
            if condition.matches(row)? {
                values.push(coerce_number(cell(row, &column))?);
            }
        }

        Ok(func.apply(&values))
    }

    /// Partitions rows by the raw text of `group_column` and aggregates
    /// `agg_column` within each partition.
    ///
    /// Groups appear in order of first occurrence.
    pub fn group_by(
        &self,
        table_name: &str,
        group_column: &str,
        agg_column: &str,
        func: AggregateFunction,
    ) -> Result<IndexMap<String, f64>, DatabaseError> {
        let table = self.get_table(table_name)?;
        let group_column = fold_identifier(group_column);
        let agg_column = fold_identifier(agg_column);

        let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
        for row in &table.rows {
            let value = coerce_number(cell(row, &agg_column))?;
            groups
                .entry(cell(row, &group_column).to_string())
                .or_default()
                .push(value);
        }

        Ok(groups
            .into_iter()
            .filter_map(|(key, values)| func.apply(&values).map(|result| (key, result)))
            .collect())
    }

    /// Parses and executes a single statement.
    ///
    /// Recoverable errors (unknown table, bad grammar, wrong value count) are
    /// logged and handed back as [`QueryResult::Reported`] so a query loop can
    /// continue. Data-integrity failures are returned as `Err`.
    pub fn execute_query(&mut self, query: &str) -> Result<QueryResult, DatabaseError> {
        let outcome = SqlParser::new(query)
            .parse()
            .and_then(|parsed| Executor::new(self).execute(&parsed));

        match outcome {
            Ok(result) => Ok(result),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(%err, "query rejected");
                Ok(QueryResult::Reported(err))
            }
            Err(err) => Err(err),
        }
    }
}

/// Builds a record with exactly `columns`, in that order.
fn project(row: &Record, columns: &[String]) -> Record {
    columns
        .iter()
        .map(|column| (column.clone(), cell(row, column).to_string()))
        .collect()
}

fn matching_rows(rows: &[Record], condition: &Condition) -> Result<Vec<bool>, DatabaseError> {
    rows.iter().map(|row| condition.matches(row)).collect()
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in self.tables.values() {
            writeln!(f)?;
            write!(f, "{table}")?;
        }
        Ok(())
    }
}
