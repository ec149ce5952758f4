//! SQL generation module.
//!
//! Frames lower to the metamodel in [`query`] and [`expr`]; [`emit`] writes
//! it out for a [`Dialect`].
//!
//! - [`query`] - query specifications, select lists, relations
//! - [`expr`] - SQL expression nodes
//! - [`emit`] - metamodel to text
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod emit;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use emit::{expr_to_sql_string, to_sql_string};
pub use expr::{
    ArithmeticOp, ComparisonOp, DatePartField, DateTruncUnit, LogicalOp, NamePart, SortItem,
    SqlExpr, SqlLiteral, Window, WindowFrame, WindowFrameBound, WindowFrameMode,
};
pub use query::{JoinKind, QuerySpecification, Relation, Select, SingleColumn};
pub use token::{Token, TokenStream};
