//! A tiny in-memory relational query engine.
//!
//! Tables hold text cells only. Queries come in through a restricted SQL
//! dialect (`SELECT`, `INSERT`, `UPDATE`, `DELETE` with a single-comparison
//! `WHERE`), and the [`Database`] additionally exposes equality joins,
//! aggregates and group-by as plain methods.
//!
//! ```
//! use minnow_db::{Database, Table};
//!
//! let mut db = Database::new();
//! db.create_table("people", Table::new("people", &["name", "age"]));
//!
//! db.execute_query("INSERT INTO people VALUES ('Alice', 30);").unwrap();
//! let result = db.execute_query("SELECT name FROM people WHERE age = 30;").unwrap();
//!
//! assert_eq!(result.rows()[0]["name"], "Alice");
//! ```

pub(crate) mod common;
pub(crate) mod db;
pub mod loader;
pub mod sql;

pub use common::error::DatabaseError;
pub use db::{
    aggregate::AggregateFunction,
    database::Database,
    table::{Record, Table},
};
pub use sql::{Condition, Operator, OrderBy, Query, QueryResult};
