use indexmap::IndexMap;
use strum::Display;

use crate::sql::{Keyword, ast::Condition};

/// The four statement shapes the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl TryFrom<Keyword> for StatementKind {
    type Error = ();

    fn try_from(kw: Keyword) -> Result<Self, Self::Error> {
        match kw {
            Keyword::Select => Ok(StatementKind::Select),
            Keyword::Insert => Ok(StatementKind::Insert),
            Keyword::Update => Ok(StatementKind::Update),
            Keyword::Delete => Ok(StatementKind::Delete),
            _ => Err(()), // Not a statement keyword
        }
    }
}

/// A parsed statement (top-level AST node).
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

impl Query {
    pub fn kind(&self) -> StatementKind {
        match self {
            Query::Select(_) => StatementKind::Select,
            Query::Insert(_) => StatementKind::Insert,
            Query::Update(_) => StatementKind::Update,
            Query::Delete(_) => StatementKind::Delete,
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            Query::Select(q) => &q.table_name,
            Query::Insert(q) => &q.table_name,
            Query::Update(q) => &q.table_name,
            Query::Delete(q) => &q.table_name,
        }
    }
}

/// Sort key of a SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn ascending(column: &str) -> Self {
        Self {
            column: crate::db::fold_identifier(column),
            descending: false,
        }
    }

    pub fn descending(column: &str) -> Self {
        Self {
            column: crate::db::fold_identifier(column),
            descending: true,
        }
    }
}

/// `"age"` sorts ascending, `"-age"` descending.
impl From<&str> for OrderBy {
    fn from(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(column) => Self::descending(column),
            None => Self::ascending(spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table_name: String,
    /// `None` selects every declared column.
    pub columns: Option<Vec<String>>,
    pub condition: Condition,
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table_name: String,
    /// Explicit target columns; values are positional when absent.
    pub columns: Option<Vec<String>>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table_name: String,
    pub assignments: IndexMap<String, String>,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub table_name: String,
    pub condition: Condition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_prefix() {
        assert_eq!(
            OrderBy::from("-age"),
            OrderBy {
                column: "age".into(),
                descending: true
            }
        );
        assert_eq!(OrderBy::from("Name"), OrderBy::ascending("name"));
    }

    #[test]
    fn test_statement_kind_from_keyword() {
        assert_eq!(
            StatementKind::try_from(Keyword::Delete),
            Ok(StatementKind::Delete)
        );
        assert!(StatementKind::try_from(Keyword::Where).is_err());
        assert_eq!(StatementKind::Update.to_string(), "UPDATE");
    }
}
