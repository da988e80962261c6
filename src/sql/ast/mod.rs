pub(crate) mod condition;
pub(crate) mod operator;
pub(crate) mod query;

pub use condition::Condition;
pub use operator::Operator;
pub use query::{
    DeleteQuery, InsertQuery, OrderBy, Query, SelectQuery, StatementKind, UpdateQuery,
};
