use indexmap::IndexMap;

use crate::{
    Database, DatabaseError, Record, Table,
    sql::ast::{DeleteQuery, InsertQuery, Query, SelectQuery, UpdateQuery},
};

/// Outcome of executing one statement.
#[derive(Debug)]
pub enum QueryResult {
    /// Rows produced by a SELECT.
    Rows(Vec<Record>),

    /// Human-readable summary of a mutation.
    Status(String),

    /// A recoverable failure. The statement had no effect.
    Reported(DatabaseError),
}

impl QueryResult {
    /// The result rows; empty for anything but a successful SELECT.
    pub fn rows(&self) -> &[Record] {
        match self {
            QueryResult::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            QueryResult::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn reported(&self) -> Option<&DatabaseError> {
        match self {
            QueryResult::Reported(err) => Some(err),
            _ => None,
        }
    }

    /// Wraps result rows in a table so they can be rendered.
    pub fn into_table(self) -> Option<Table> {
        match self {
            QueryResult::Rows(rows) => Some(Table::from_records::<&str>("Result", &[], rows)),
            _ => None,
        }
    }
}

/// Dispatches parsed queries to the matching [`Database`] operation.
///
/// Every failure is returned as `Err`; deciding which ones to report and
/// which to surface is left to [`Database::execute_query`].
pub struct Executor<'db> {
    db: &'db mut Database,
}

impl<'db> Executor<'db> {
    pub fn new(db: &'db mut Database) -> Self {
        Self { db }
    }

    pub fn execute(&mut self, query: &Query) -> Result<QueryResult, DatabaseError> {
        tracing::debug!(kind = %query.kind(), table = query.table_name(), "executing");

        match query {
            Query::Select(select) => self.execute_select(select),
            Query::Insert(insert) => self.execute_insert(insert),
            Query::Update(update) => self.execute_update(update),
            Query::Delete(delete) => self.execute_delete(delete),
        }
    }

    fn execute_select(&mut self, query: &SelectQuery) -> Result<QueryResult, DatabaseError> {
        let rows = self.db.select(
            &query.table_name,
            query.columns.as_deref(),
            &query.condition,
            query.order_by.as_ref(),
        )?;

        Ok(QueryResult::Rows(rows))
    }

    fn execute_insert(&mut self, query: &InsertQuery) -> Result<QueryResult, DatabaseError> {
        let values = match &query.columns {
            // Re-project named values into the table's own column order.
            Some(columns) => {
                let table = self.db.get_table(&query.table_name)?;
                if columns.len() != query.values.len() {
                    return Err(DatabaseError::SchemaMismatch {
                        table: query.table_name.clone(),
                        expected: columns.len(),
                        actual: query.values.len(),
                    });
                }

                let named: IndexMap<&str, &str> = columns
                    .iter()
                    .map(String::as_str)
                    .zip(query.values.iter().map(String::as_str))
                    .collect();

                table
                    .columns
                    .iter()
                    .map(|column| named.get(column.as_str()).copied().unwrap_or("").to_string())
                    .collect()
            }
            None => query.values.clone(),
        };

        self.db.insert(&query.table_name, values)?;
        tracing::info!(table = %query.table_name, "inserted 1 row");

        Ok(QueryResult::Status(format!(
            "Inserted 1 row into {}",
            query.table_name
        )))
    }

    fn execute_update(&mut self, query: &UpdateQuery) -> Result<QueryResult, DatabaseError> {
        let updated = self
            .db
            .update(&query.table_name, &query.assignments, &query.condition)?;
        tracing::info!(table = %query.table_name, updated, "updated rows");

        Ok(QueryResult::Status(format!(
            "Updated {} in {}",
            plural_rows(updated),
            query.table_name
        )))
    }

    fn execute_delete(&mut self, query: &DeleteQuery) -> Result<QueryResult, DatabaseError> {
        let deleted = self.db.delete(&query.table_name, &query.condition)?;
        tracing::info!(table = %query.table_name, deleted, "deleted rows");

        Ok(QueryResult::Status(format!(
            "Deleted {} from {}",
            plural_rows(deleted),
            query.table_name
        )))
    }
}

fn plural_rows(count: usize) -> String {
    if count == 1 {
        "1 row".to_string()
    } else {
        format!("{count} rows")
    }
}

#[cfg(test)]
mod tests {
    use crate::sql::ast::Condition;

    use super::*;

    fn people() -> Database {
        let mut db = Database::new();
        db.create_table("people", Table::new("people", &["name", "age"]));
        db
    }

    fn insert(columns: Option<&[&str]>, values: &[&str]) -> Query {
        Query::Insert(InsertQuery {
            table_name: "people".into(),
            columns: columns.map(|c| c.iter().map(|s| s.to_string()).collect()),
            values: values.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_insert_with_named_columns_is_reprojected() {
        let mut db = people();
        let mut executor = Executor::new(&mut db);

        executor
            .execute(&insert(Some(&["age", "name"]), &["41", "Carol"]))
            .unwrap();
        executor
            .execute(&insert(Some(&["name", "email"]), &["Dan", "d@x"]))
            .unwrap();

        let table = db.get_table("people").unwrap();
        assert_eq!(table.rows[0].get("name").unwrap(), "Carol");
        assert_eq!(table.rows[0].get("age").unwrap(), "41");
        assert_eq!(table.rows[1].get("age").unwrap(), "");
        assert!(!table.rows[1].contains_key("email"));
    }

    #[test]
    fn test_insert_positional_mismatch_is_an_error() {
        let mut db = people();
        let err = Executor::new(&mut db)
            .execute(&insert(None, &["Eve"]))
            .unwrap_err();

        assert!(matches!(err, DatabaseError::SchemaMismatch { .. }));

        let err = Executor::new(&mut db)
            .execute(&insert(Some(&["name", "age"]), &["Eve"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::SchemaMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert!(db.get_table("people").unwrap().is_empty());
    }

    #[test]
    fn test_status_messages() {
        let mut db = people();
        let mut executor = Executor::new(&mut db);

        let result = executor.execute(&insert(None, &["Bob", "25"])).unwrap();
        assert_eq!(result.status(), Some("Inserted 1 row into people"));

        let result = executor
            .execute(&Query::Update(UpdateQuery {
                table_name: "people".into(),
                assignments: IndexMap::from([("age".to_string(), "26".to_string())]),
                condition: Condition::All,
            }))
            .unwrap();
        assert_eq!(result.status(), Some("Updated 1 row in people"));

        let result = executor
            .execute(&Query::Delete(DeleteQuery {
                table_name: "people".into(),
                condition: Condition::eq("name", "Nobody"),
            }))
            .unwrap();
        assert_eq!(result.status(), Some("Deleted 0 rows from people"));
        assert!(result.rows().is_empty());
    }

    #[test]
    fn test_rows_into_table() {
        let result = QueryResult::Rows(vec![Record::from([
            ("name".to_string(), "Bob".to_string()),
            ("age".to_string(), "26".to_string()),
        ])]);

        let table = result.into_table().unwrap();
        assert_eq!(table.name, "Result");
        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.len(), 1);
    }
}
