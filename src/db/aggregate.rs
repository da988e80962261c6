use std::str::FromStr;

use strum::{Display, EnumString};

use crate::DatabaseError;

/// Aggregate functions over a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Parses a function name, case-insensitively.
    pub fn parse(name: &str) -> Result<Self, DatabaseError> {
        Self::from_str(name.trim()).map_err(|_| DatabaseError::UnknownFunction(name.to_string()))
    }

    /// Folds the values into a single result.
    ///
    /// An empty input has no result for every function, `count` included.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        let sum = || values.iter().sum::<f64>();

        let result = match self {
            AggregateFunction::Count => values.len() as f64,
            AggregateFunction::Sum => sum(),
            AggregateFunction::Avg => sum() / values.len() as f64,
            AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        Some(result)
    }
}
