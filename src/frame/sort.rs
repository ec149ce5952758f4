//! `sort`.

use super::compose::{prepare, Operation};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{Expr, SortDirection, SortInfo};
use crate::sql::QuerySpecification;
use crate::tds::{TdsColumn, TdsRow};

/// Row alias for sort lambdas.
const SORT_ROW_VAR: &str = "frame";

#[derive(Debug)]
struct Sort {
    base: TdsFrame,
    sorts: Vec<SortInfo>,
}

impl AppliedFunction for Sort {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self.base.columns().to_vec())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = prepare(self.base.to_sql_spec()?, Operation::Sort);
        let order_by = self
            .sorts
            .iter()
            .map(|s| {
                let key = spec
                    .select
                    .item(&s.column)
                    .map(|item| item.expression.clone())
                    .ok_or_else(|| FrameError::schema(format!("Cannot find column: {}", s.column)))?;
                Ok(s.to_sql(key))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        spec.order_by = order_by;
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let sorts: Vec<String> = self.sorts.iter().map(SortInfo::to_pure).collect();
        format!(
            "{}{}->sort([{}])",
            self.base.to_pure(config),
            config.separator(1),
            sorts.join(", ")
        )
    }
}

/// One element of a sort lambda's result: a column name, a column
/// reference (ascending) or an explicit [`SortInfo`].
#[derive(Debug, Clone)]
pub enum SortKey {
    Name(String),
    Column(Expr),
    Info(SortInfo),
}

impl From<&str> for SortKey {
    fn from(name: &str) -> Self {
        SortKey::Name(name.to_string())
    }
}

impl From<String> for SortKey {
    fn from(name: String) -> Self {
        SortKey::Name(name)
    }
}

impl From<Expr> for SortKey {
    fn from(expr: Expr) -> Self {
        SortKey::Column(expr)
    }
}

impl From<SortInfo> for SortKey {
    fn from(info: SortInfo) -> Self {
        SortKey::Info(info)
    }
}

impl TdsFrame {
    /// Sort by `columns`, ascending unless `directions` says otherwise.
    ///
    /// Directions are `ASC`/`DESC` or `ascending`/`descending`, matched
    /// case-insensitively. An empty direction list means all ascending.
    pub fn sort<S: AsRef<str>>(&self, columns: &[S], directions: &[&str]) -> FrameResult<TdsFrame> {
        self.require_columns(columns, "sort columns list")?;
        if !directions.is_empty() && directions.len() != columns.len() {
            let cols: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
            return Err(FrameError::validation(format!(
                "Sort directions (ASC/DESC) provided need to be in sync with columns or left empty to \
                 choose defaults. Passed column list: {cols:?}, directions: {directions:?}"
            )));
        }
        let sorts = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let direction = match directions.get(i) {
                    Some(d) => d.parse::<SortDirection>()?,
                    None => SortDirection::Ascending,
                };
                Ok(SortInfo::new(c.as_ref(), direction))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        self.sort_by(sorts)
    }

    /// Sort by explicit sort items.
    pub fn sort_by(&self, sorts: Vec<SortInfo>) -> FrameResult<TdsFrame> {
        if sorts.is_empty() {
            return Err(FrameError::validation(
                "'sort' function sort_infos argument should not be empty",
            ));
        }
        let names: Vec<&str> = sorts.iter().map(|s| s.column.as_str()).collect();
        self.require_columns(&names, "sort columns list")?;
        TdsFrame::applied(Sort {
            base: self.clone(),
            sorts,
        })
    }

    /// Sort by the keys a lambda picks from the row:
    /// `|r| Ok(vec![r.get("a")?.into(), r.get("b")?.descending()?.into()])`.
    pub fn sort_with<F>(&self, keys: F) -> FrameResult<TdsFrame>
    where
        F: FnOnce(&TdsRow) -> FrameResult<Vec<SortKey>>,
    {
        let row = self.row(SORT_ROW_VAR);
        let keys = keys(&row).map_err(|e| {
            FrameError::Binding(format!(
                "Sort lambda incompatible. Error occurred while evaluating. Message: {e}"
            ))
        })?;
        let sorts = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| match key {
                SortKey::Name(name) => Ok(SortInfo::asc(name)),
                SortKey::Info(info) => Ok(info),
                SortKey::Column(expr) => match expr.as_column() {
                    Some(col) => Ok(SortInfo::asc(col.name.clone())),
                    None => Err(FrameError::type_error(format!(
                        "Sort lambda incompatible. Columns can either be strings, simple column \
                         expressions or sort infos. Element at index {i} in the list is incompatible."
                    ))),
                },
            })
            .collect::<FrameResult<Vec<_>>>()?;
        self.sort_by(sorts)
    }
}
