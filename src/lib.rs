//! # frameql
//!
//! A dataframe-to-query compiler. Pipelines of tabular data set (TDS)
//! frame operations are built as an immutable DAG and lowered to SQL (for
//! a chosen dialect) or to Pure query text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │      Frame DAG (inputs + applied functions)              │
//! │  (filter, extend, group_by, join, window_extend, ...)    │
//! └─────────────────────────────────────────────────────────┘
//!             │ user closures over TdsRow        │
//!             ▼                                  │
//! ┌──────────────────────────────┐               │
//! │   Typed expression algebra   │               │
//! └──────────────────────────────┘               │
//!             │                                  │
//!      ┌──────┴─────────────┐                    │
//!      ▼ [to_sql]           ▼ [to_pure]          ▼ [compose]
//! ┌──────────────────┐  ┌──────────────┐  ┌──────────────────┐
//! │  SQL metamodel   │  │  Pure text   │  │ subquery nesting │
//! └──────────────────┘  └──────────────┘  └──────────────────┘
//!      │
//!      ▼ [emit, dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 SQL text (Postgres, TSql)                │
//! └─────────────────────────────────────────────────────────┘
//!      │
//!      ▼ [execution]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Execution server + result handlers                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use frameql::prelude::*;
//!
//! let frame = TdsFrame::table(
//!     ["test_schema", "test_table"],
//!     vec![TdsColumn::integer("col1"), TdsColumn::string("col2")],
//! )?
//! .filter(|r| r.get_integer("col1")?.gt(10))?
//! .head(5)?;
//!
//! let sql = frame.to_sql_query(&FrameToSqlConfig::default())?;
//! let pure = frame.to_pure_query(&FrameToPureConfig::default());
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod expr;
pub mod frame;
pub mod pure;
pub mod sql;
pub mod tds;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{FrameToPureConfig, FrameToSqlConfig, Settings};
    pub use crate::error::{ErrorKind, FrameError, FrameResult};
    pub use crate::execution::{
        HttpLegendClient, JsonFileResultHandler, LegendClient, ResultHandler, ResultTable,
        StringResultHandler, TableResultHandler,
    };
    pub use crate::expr::{
        Collection, DurationUnit, Expr, FrameBound, PartialFrame, SortDirection, SortInfo, Window,
        WindowFrame, WindowRef,
    };
    pub use crate::frame::{
        AggOp, AggregateFunc, AggregateSpec, Axis, ColumnFilter, ColumnSpec, DropNaHow, FillValue,
        GroupByFrame, JoinKind, RankMethod, SortKey, TdsFrame, WindowColumnSpec,
    };
    pub use crate::sql::Dialect;
    pub use crate::tds::{CastTarget, PrimitiveType, TdsColumn, TdsRow};
}

pub use error::{FrameError, FrameResult};
pub use frame::TdsFrame;
pub use sql::Dialect;
