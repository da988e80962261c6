use std::str::FromStr;

use miette::{Result, miette};

use crate::sql::Keyword;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    Identifier(&'a str),
    /// Numeric literal, kept as written so cells compare as text.
    Number(&'a str),
    /// Quoted literal with the quotes stripped.
    String(&'a str),
    /// Unquoted text in a value position, taken as written.
    Literal(&'a str),

    Comma,
    Asterisk,
    SemiColon,
    Minus,

    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,

    LeftParen,
    RightParen,
}

/// Splits query text into tokens.
///
/// Right after a comparison operator, and inside the parentheses following
/// `VALUES`, unquoted text is read raw as a [`Token::Literal`]. A literal
/// after an operator ends at whitespace; a literal in a value list runs to
/// the next `,` or `)`.
pub(crate) struct Lexer<'a> {
    pub rest: &'a str,
    pub position: usize,

    literal_next: bool,
    in_values: bool,
    after_values: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: 0,
            literal_next: false,
            in_values: false,
            after_values: false,
        }
    }

    fn advance(&mut self, len: usize) {
        self.position += len;
        self.rest = &self.rest[len..];
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn consume_word(&mut self) -> &'a str {
        let word_index = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest.len());

        let word = &self.rest[..word_index];
        self.advance(word_index);
        word
    }

    fn consume_string(&mut self, closing: char) -> Result<&'a str> {
        let start = self.position;
        let Some(end_index) = self.rest[1..].find(closing) else {
            return Err(miette!("Unterminated string starting at position {}", start));
        };

        let string_value = &self.rest[1..end_index + 1];
        self.advance(end_index + 2);

        Ok(string_value)
    }

    fn consume_number(&mut self) -> &'a str {
        let number_end = self
            .rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(self.rest.len());

        let number_str = &self.rest[..number_end];
        self.advance(number_end);
        number_str
    }

    fn consume_literal(&mut self) -> &'a str {
        let in_values = self.in_values;
        let end = self
            .rest
            .find(|c: char| matches!(c, ',' | ')' | ';') || (!in_values && c.is_whitespace()))
            .unwrap_or(self.rest.len());

        let literal = self.rest[..end].trim_end();
        self.advance(end);
        literal
    }

    /// Updates the value-position state from the token just produced.
    fn track(&mut self, token: &Token<'a>) {
        self.literal_next = match token {
            Token::Equal
            | Token::NotEqual
            | Token::LessThan
            | Token::LessThanEqual
            | Token::GreaterThan
            | Token::GreaterThanEqual => true,
            Token::LeftParen if self.after_values => {
                self.in_values = true;
                true
            }
            Token::Comma => self.in_values,
            _ => false,
        };

        if *token == Token::RightParen {
            self.in_values = false;
        }
        self.after_values = *token == Token::Keyword(Keyword::Values);
    }

    /// Consumes a one or two character operator, preferring the longer form.
    fn operator(&mut self, single: Token<'a>, pairs: &[(char, Token<'a>)]) -> Token<'a> {
        let second = self.rest.chars().nth(1);
        for (next, token) in pairs {
            if second == Some(*next) {
                self.advance(2);
                return token.clone();
            }
        }

        self.advance(1);
        single
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let char = self.rest.chars().next()?;

        let token = match char {
            _ if self.literal_next && !matches!(char, '\'' | '"' | ',' | ')' | ';') => {
                Ok(Token::Literal(self.consume_literal()))
            }
            ',' => {
                self.advance(1);
                Ok(Token::Comma)
            }
            '*' => {
                self.advance(1);
                Ok(Token::Asterisk)
            }
            ';' => {
                self.advance(1);
                Ok(Token::SemiColon)
            }
            '-' => {
                self.advance(1);
                Ok(Token::Minus)
            }
            '(' => {
                self.advance(1);
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance(1);
                Ok(Token::RightParen)
            }
            '=' => {
                self.advance(1);
                Ok(Token::Equal)
            }
            '<' => Ok(self.operator(
                Token::LessThan,
                &[('=', Token::LessThanEqual), ('>', Token::NotEqual)],
            )),
            '>' => Ok(self.operator(Token::GreaterThan, &[('=', Token::GreaterThanEqual)])),
            '!' => {
                if self.rest[1..].starts_with('=') {
                    self.advance(2);
                    Ok(Token::NotEqual)
                } else {
                    Err(miette!(
                        "Unexpected character '{}' at position {}",
                        char,
                        self.position
                    ))
                }
            }
            '\'' | '"' => self.consume_string(char).map(Token::String),
            _ if char.is_ascii_digit() || char == '.' => Ok(Token::Number(self.consume_number())),
            _ if char.is_alphabetic() || char == '_' => {
                let word = self.consume_word();

                match Keyword::from_str(word) {
                    Ok(keyword) => Ok(Token::Keyword(keyword)),
                    Err(_) => Ok(Token::Identifier(word)),
                }
            }
            _ => Err(miette!(
                "Unexpected character '{}' at position {}",
                char,
                self.position
            )),
        };

        if let Ok(token) = &token {
            self.track(token);
        }

        Some(token)
    }
}
