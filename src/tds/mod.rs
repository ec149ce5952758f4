//! Tabular data set (TDS) schema: primitive types, columns, row handles
//! and the cast matrix.

mod cast;
mod column;
mod row;
mod types;

pub use cast::{is_cast_allowed, validate_and_build_cast_columns, CastTarget};
pub use column::{
    column_names, ensure_unique_names, name_list, tds_columns_from_json, ColumnType, TdsColumn,
};
pub use row::TdsRow;
pub use types::{PrimitiveType, TypeFamily};
