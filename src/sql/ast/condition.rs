use std::fmt;

use crate::{DatabaseError, Record, db::table::cell, sql::ast::Operator};

/// A row predicate.
///
/// Either matches every row, or compares one column against a literal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    All,

    Compare {
        column: String,
        op: Operator,
        literal: String,
    },
}

impl Condition {
    pub fn compare(column: &str, op: Operator, literal: impl Into<String>) -> Self {
        Self::Compare {
            column: crate::db::fold_identifier(column),
            op,
            literal: literal.into(),
        }
    }

    /// Shorthand for `column = literal`.
    pub fn eq(column: &str, literal: impl Into<String>) -> Self {
        Self::compare(column, Operator::Equal, literal)
    }

    /// Evaluates the predicate against a record.
    ///
    /// A column missing from the record is read as the empty string.
    pub fn matches(&self, record: &Record) -> Result<bool, DatabaseError> {
        match self {
            Condition::All => Ok(true),
            Condition::Compare {
                column,
                op,
                literal,
            } => op.apply(cell(record, column), literal),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All => write!(f, "TRUE"),
            Condition::Compare {
                column,
                op,
                literal,
            } => write!(f, "{column} {op} '{literal}'"),
        }
    }
}
