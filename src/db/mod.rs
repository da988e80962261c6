use crate::DatabaseError;

pub mod aggregate;
pub mod database;
pub mod table;

/// Identifiers (table and column names) are case-insensitive at the query
/// boundary, so they are stored lowercased.
pub(crate) fn fold_identifier(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Coerces a cell to a number for ordering comparisons and aggregation.
pub(crate) fn coerce_number(text: &str) -> Result<f64, DatabaseError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| DatabaseError::Conversion {
            value: text.to_string(),
        })
}
