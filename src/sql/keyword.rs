use strum::{Display, EnumString};

/// SQL keywords recognized by the parser.
///
/// Keywords are case-insensitive. Only those that open a statement or a
/// clause are reserved; the rest may also name tables and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Keyword {
    Select,
    Insert,
    Update,
    Delete,

    From,
    Into,
    Values,
    Set,
    Where,

    Order,
    By,
    Asc,
    Desc,
}

impl Keyword {
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Keyword::Select
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::From
                | Keyword::Values
                | Keyword::Where
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Keyword::from_str("select"), Ok(Keyword::Select));
        assert_eq!(Keyword::from_str("VaLuEs"), Ok(Keyword::Values));
        assert!(Keyword::from_str("people").is_err());
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(Keyword::Where.is_reserved());
        assert!(Keyword::Values.is_reserved());
        assert!(!Keyword::Order.is_reserved());
        assert_eq!(Keyword::Desc.to_string(), "desc");
    }
}
