use std::fmt;

use crate::{DatabaseError, db::coerce_number};

/// Comparison operators usable in a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equality (=), compared as text
    Equal,
    /// Inequality (!=), compared as text
    NotEqual,

    /// Less than (<)
    LessThan,
    LessThanEqual,

    /// Greater than (>)
    GreaterThan,
    GreaterThanEqual,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_symbol())
    }
}

impl Operator {
    pub fn to_symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEqual => ">=",
        }
    }

    /// Applies the operator to a cell and a literal.
    ///
    /// Ordering operators coerce both sides to `f64` and fail if either side
    /// is not a number.
    pub fn apply(self, cell: &str, literal: &str) -> Result<bool, DatabaseError> {
        let numeric = |cmp: fn(&f64, &f64) -> bool| -> Result<bool, DatabaseError> {
            Ok(cmp(&coerce_number(cell)?, &coerce_number(literal)?))
        };

        match self {
            Operator::Equal => Ok(cell == literal),
            Operator::NotEqual => Ok(cell != literal),
            Operator::LessThan => numeric(f64::lt),
            Operator::LessThanEqual => numeric(f64::le),
            Operator::GreaterThan => numeric(f64::gt),
            Operator::GreaterThanEqual => numeric(f64::ge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_equality() {
        assert!(Operator::Equal.apply("Alice", "Alice").unwrap());
        assert!(!Operator::Equal.apply("Alice", "alice").unwrap());
        assert!(Operator::NotEqual.apply("30", "30.0").unwrap());
    }

    #[test]
    fn test_equality_never_coerces() {
        assert!(!Operator::Equal.apply("abc", "1").unwrap());
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(Operator::LessThan.apply("9", "10").unwrap());
        assert!(Operator::LessThanEqual.apply("10", "10.0").unwrap());
        assert!(Operator::GreaterThan.apply("2.5", "-1").unwrap());
        assert!(!Operator::GreaterThanEqual.apply("1", "2").unwrap());
    }

    #[test]
    fn test_ordering_rejects_text() {
        let err = Operator::LessThan.apply("thirty", "40").unwrap_err();
        assert!(matches!(err, DatabaseError::Conversion { value } if value == "thirty"));

        let err = Operator::GreaterThan.apply("", "40").unwrap_err();
        assert!(matches!(err, DatabaseError::Conversion { .. }));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Operator::GreaterThanEqual.to_string(), ">=");
        assert_eq!(Operator::NotEqual.to_symbol(), "!=");
    }
}
