use std::{iter::Peekable, str::FromStr};

use indexmap::IndexMap;
use miette::{Result, miette};

use crate::{
    DatabaseError,
    db::fold_identifier,
    sql::{
        Keyword,
        ast::{
            Condition, DeleteQuery, InsertQuery, Operator, OrderBy, Query, SelectQuery,
            StatementKind, UpdateQuery,
        },
        lexer::{Lexer, Token},
    },
};

/// Trims the query and drops its trailing statement terminator.
///
/// Keywords and identifiers are case-folded during parsing; literal text is
/// left untouched.
pub fn normalize(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}

/// SQL parser that converts tokens into a [`Query`].
///
/// Uses recursive descent parsing with a peekable token stream.
pub struct SqlParser<'src> {
    /// The normalized query text
    query: &'src str,

    /// Token stream from the lexer
    lexer: Peekable<Lexer<'src>>,
}

impl<'src> SqlParser<'src> {
    /// Creates a new parser for the given SQL query string.
    pub fn new(query: &'src str) -> Self {
        let query = normalize(query);
        Self {
            query,
            lexer: Lexer::new(query).peekable(),
        }
    }

    /// Parses the query.
    ///
    /// The leading keyword picks the grammar. A mismatch inside that grammar
    /// is a [`DatabaseError::Parse`] for that statement kind; the other
    /// grammars are never tried.
    pub fn parse(&mut self) -> Result<Query, DatabaseError> {
        let kind = match self.lexer.peek() {
            Some(Ok(Token::Keyword(kw))) => StatementKind::try_from(*kw).ok(),
            _ => None,
        };

        let Some(kind) = kind else {
            let leading = self
                .query
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_lowercase();
            return Err(DatabaseError::UnsupportedCommand(leading));
        };

        let statement = match kind {
            StatementKind::Select => self.parse_select_statement(),
            StatementKind::Insert => self.parse_insert_statement(),
            StatementKind::Update => self.parse_update_statement(),
            StatementKind::Delete => self.parse_delete_statement(),
        };

        statement
            .and_then(|query| self.expect_end().map(|()| query))
            .map_err(|e| DatabaseError::Parse {
                kind,
                reason: e.to_string(),
            })
    }

    fn parse_select_statement(&mut self) -> Result<Query> {
        self.expect_keyword(Keyword::Select)?;

        let columns = if self.consume_if(Token::Asterisk) {
            None
        } else {
            Some(self.parse_identifier_list()?)
        };

        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_identifier()?;
        let condition = self.parse_where_clause()?;

        let order_by = if self.consume_if(Token::Keyword(Keyword::Order)) {
            self.expect_keyword(Keyword::By)?;
            Some(self.parse_order_by()?)
        } else {
            None
        };

        Ok(Query::Select(SelectQuery {
            table_name,
            columns,
            condition,
            order_by,
        }))
    }

    fn parse_insert_statement(&mut self) -> Result<Query> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table_name = self.expect_identifier()?;

        let columns = if self.consume_if(Token::LeftParen) {
            let columns = self.parse_identifier_list()?;
            self.expect_token(Token::RightParen)?;
            Some(columns)
        } else {
            None
        };

        self.expect_keyword(Keyword::Values)?;
        self.expect_token(Token::LeftParen)?;

        let mut values = vec![self.parse_literal()?];
        while self.consume_if(Token::Comma) {
            values.push(self.parse_literal()?);
        }

        self.expect_token(Token::RightParen)?;

        Ok(Query::Insert(InsertQuery {
            table_name,
            columns,
            values,
        }))
    }

    fn parse_update_statement(&mut self) -> Result<Query> {
        self.expect_keyword(Keyword::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect_keyword(Keyword::Set)?;

        let mut assignments = IndexMap::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect_token(Token::Equal)?;
            let value = self.parse_literal()?;
            assignments.insert(column, value);

            if !self.consume_if(Token::Comma) {
                break;
            }
        }

        let condition = self.parse_where_clause()?;

        Ok(Query::Update(UpdateQuery {
            table_name,
            assignments,
            condition,
        }))
    }

    fn parse_delete_statement(&mut self) -> Result<Query> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_identifier()?;
        let condition = self.parse_where_clause()?;

        Ok(Query::Delete(DeleteQuery {
            table_name,
            condition,
        }))
    }

    /// Parses an optional `WHERE column <op> literal`.
    fn parse_where_clause(&mut self) -> Result<Condition> {
        if !self.consume_if(Token::Keyword(Keyword::Where)) {
            return Ok(Condition::All);
        }

        let column = self.expect_identifier()?;

        let op = match self.next_token()? {
            Token::Equal => Operator::Equal,
            Token::NotEqual => Operator::NotEqual,
            Token::LessThan => Operator::LessThan,
            Token::LessThanEqual => Operator::LessThanEqual,
            Token::GreaterThan => Operator::GreaterThan,
            Token::GreaterThanEqual => Operator::GreaterThanEqual,
            t => return Err(miette!("Expected a comparison operator, found {:?}", t)),
        };

        let literal = self.parse_literal()?;

        Ok(Condition::Compare {
            column,
            op,
            literal,
        })
    }

    /// `[-]column [ASC | DESC]`
    fn parse_order_by(&mut self) -> Result<OrderBy> {
        let negated = self.consume_if(Token::Minus);
        let column = self.expect_identifier()?;

        let descending = if self.consume_if(Token::Keyword(Keyword::Desc)) {
            true
        } else {
            self.consume_if(Token::Keyword(Keyword::Asc));
            negated
        };

        Ok(OrderBy { column, descending })
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![self.expect_identifier()?];
        while self.consume_if(Token::Comma) {
            identifiers.push(self.expect_identifier()?);
        }

        Ok(identifiers)
    }

    /// A literal value: quoted text with the quotes stripped, or raw text.
    fn parse_literal(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::String(s) | Token::Literal(s) => Ok(s.to_string()),
            t => Err(miette!("Expected a literal value, found {:?}", t)),
        }
    }

    fn next_token(&mut self) -> Result<Token<'src>> {
        self.lexer
            .next()
            .transpose()?
            .ok_or_else(|| miette!("Unexpected end of input"))
    }

    fn expect_token(&mut self, expected: Token<'src>) -> Result<()> {
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(miette!("Expected {:?}, found {:?}", expected, token))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.lexer.next().transpose()? {
            None => Ok(()),
            Some(t) => Err(miette!("Unexpected trailing input {:?}", t)),
        }
    }

    fn peek_is(&mut self, expected: Token) -> bool {
        matches!(self.lexer.peek(), Some(Ok(token)) if *token == expected)
    }

    fn consume_if(&mut self, expected: Token) -> bool {
        if self.peek_is(expected) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    /// Reads an identifier, case-folded.
    ///
    /// Keywords that cannot start a clause are accepted as names.
    fn expect_identifier(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Identifier(ident) => Ok(fold_identifier(ident)),
            Token::Keyword(kw) if !kw.is_reserved() => Ok(kw.to_string()),
            got => Err(miette!("Expected IDENTIFIER, but found {:?}", got)),
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<()> {
        match self.next_token()? {
            Token::Keyword(kw) if kw == expected => Ok(()),
            other => Err(miette!("Expected {:?}, found {:?}", expected, other)),
        }
    }
}

impl FromStr for Query {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SqlParser::new(s).parse()
    }
}
