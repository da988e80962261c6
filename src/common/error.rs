use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::sql::StatementKind;

/// Errors produced by the storage layer, the parser and the loader.
///
/// Variants are split into two groups. Structural problems (missing table,
/// bad grammar, wrong value count) are *recoverable*: the query loop reports
/// them and keeps going. Data-integrity problems (a cell that is not a number,
/// an unknown aggregate) are hard failures, since skipping them would quietly
/// produce wrong results.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("Table '{0}' does not exist")]
    #[diagnostic(code(minnow::table_not_found), help("check the table name or load it first"))]
    TableNotFound(String),

    #[error("Column count mismatch for '{table}': expected {expected} values, got {actual}")]
    #[diagnostic(code(minnow::schema_mismatch))]
    SchemaMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Could not parse {kind} query: {reason}")]
    #[diagnostic(code(minnow::parse))]
    Parse { kind: StatementKind, reason: String },

    #[error("Unsupported SQL command: '{0}'")]
    #[diagnostic(
        code(minnow::unsupported_command),
        help("statements must start with SELECT, INSERT, UPDATE or DELETE")
    )]
    UnsupportedCommand(String),

    #[error("Cannot convert '{value}' to a number")]
    #[diagnostic(code(minnow::conversion))]
    Conversion { value: String },

    #[error("Unknown aggregation function: {0}")]
    #[diagnostic(
        code(minnow::unknown_function),
        help("supported functions are count, sum, avg, min and max")
    )]
    UnknownFunction(String),

    #[error("Invalid manifest line {line}: {reason}")]
    #[diagnostic(code(minnow::manifest))]
    Manifest { line: usize, reason: String },

    #[error("Failed to read {path}")]
    #[diagnostic(code(minnow::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}")]
    #[diagnostic(code(minnow::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl DatabaseError {
    /// Whether the query loop should report this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound(_)
                | Self::SchemaMismatch { .. }
                | Self::Parse { .. }
                | Self::UnsupportedCommand(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_split() {
        assert!(DatabaseError::TableNotFound("ghosts".into()).is_recoverable());
        assert!(DatabaseError::UnsupportedCommand("drop".into()).is_recoverable());
        assert!(
            DatabaseError::Parse {
                kind: StatementKind::Select,
                reason: "Unexpected end of input".into(),
            }
            .is_recoverable()
        );

        assert!(!DatabaseError::Conversion { value: "abc".into() }.is_recoverable());
        assert!(!DatabaseError::UnknownFunction("median".into()).is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = DatabaseError::Parse {
            kind: StatementKind::Insert,
            reason: "Expected VALUES".into(),
        };
        assert_eq!(err.to_string(), "Could not parse INSERT query: Expected VALUES");

        let err = DatabaseError::SchemaMismatch {
            table: "people".into(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column count mismatch for 'people': expected 2 values, got 3"
        );
    }
}
