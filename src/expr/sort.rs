//! Sort keys.

use std::fmt;
use std::str::FromStr;

use super::Expr;
use crate::error::{FrameError, FrameResult};
use crate::pure::escape_column_name;
use crate::sql::SortItem;
use crate::sql::SqlExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn pure_name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(FrameError::validation(format!(
                "Unknown sort direction - {s}"
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ASC"),
            SortDirection::Descending => f.write_str("DESC"),
        }
    }
}

/// A column plus a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortInfo {
    pub column: String,
    pub direction: SortDirection,
}

impl SortInfo {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    /// `ascending(~col)`
    pub fn to_pure(&self) -> String {
        format!(
            "{}(~{})",
            self.direction.pure_name(),
            escape_column_name(&self.column)
        )
    }

    /// Sort item over `key`, the already-resolved column expression.
    pub fn to_sql(&self, key: SqlExpr) -> SortItem {
        match self.direction {
            SortDirection::Ascending => SortItem::asc(key),
            SortDirection::Descending => SortItem::desc(key),
        }
    }
}

impl Expr {
    pub fn ascending(&self) -> FrameResult<SortInfo> {
        self.sort_info(SortDirection::Ascending)
    }

    pub fn descending(&self) -> FrameResult<SortInfo> {
        self.sort_info(SortDirection::Descending)
    }

    fn sort_info(&self, direction: SortDirection) -> FrameResult<SortInfo> {
        match self.as_column() {
            Some(col) => Ok(SortInfo::new(col.name.clone(), direction)),
            None => Err(FrameError::type_error(format!(
                "'{}' function can only be called on column expressions. \
                 E.g. - r.get(\"col1\")?.{}()\n.Found expression type - {}",
                direction.pure_name(),
                direction.pure_name(),
                self.ty()
            ))),
        }
    }
}
