pub(crate) mod ast;
pub(crate) mod executor;
pub(crate) mod keyword;
pub(crate) mod lexer;
pub(crate) mod parser;

pub use ast::{
    Condition, DeleteQuery, InsertQuery, Operator, OrderBy, Query, SelectQuery, StatementKind,
    UpdateQuery,
};
pub use executor::{Executor, QueryResult};
pub(crate) use keyword::Keyword;
pub use parser::{SqlParser, normalize};
