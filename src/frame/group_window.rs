//! `rank` and `shift` on a [`GroupByFrame`]: per-column window functions
//! partitioned by the grouping keys.
//!
//! Only the transformed columns are kept, in frame order. In Pure each
//! column is computed under a temporary name by its own `extend` and the
//! final `project` restores the names.

use std::str::FromStr;

use super::compose::{create_sub_query, ROOT_ALIAS};
use super::{AppliedFunction, GroupByFrame, TdsFrame, ROW_VAR};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{
    Expr, PartialFrame, SortDirection, SortInfo, SqlContext, Window, WindowRef, PARTIAL_FRAME_VAR,
    WINDOW_VAR,
};
use crate::pure::{escape_column_name, lambda};
use crate::sql::{QuerySpecification, SingleColumn};
use crate::tds::TdsColumn;

const TEMP_COLUMN_SUFFIX: &str = "__internal_pure_col_name__";

/// How ties are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMethod {
    /// Lowest rank in the group of ties (`rank`).
    Min,
    /// Order of appearance (`row_number`).
    First,
    /// Like `Min` without gaps (`dense_rank`).
    Dense,
}

impl FromStr for RankMethod {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(RankMethod::Min),
            "first" => Ok(RankMethod::First),
            "dense" => Ok(RankMethod::Dense),
            _ => Err(FrameError::unsupported(format!(
                "The 'method' parameter of the rank function must be one of \
                 ['min', 'first', 'dense'], but got: method={s}"
            ))),
        }
    }
}

#[derive(Debug)]
struct WindowedColumn {
    column: TdsColumn,
    window: Window,
    value: Expr,
}

#[derive(Debug)]
struct GroupWindow {
    name: &'static str,
    base: TdsFrame,
    columns: Vec<WindowedColumn>,
}

impl AppliedFunction for GroupWindow {
    fn name(&self) -> &'static str {
        self.name
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self.columns.iter().map(|c| c.column.clone()).collect())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = create_sub_query(self.base.to_sql_spec()?, ROOT_ALIAS, None);
        let items = self
            .columns
            .iter()
            .map(|c| {
                let window = c.window.to_sql(&spec)?;
                let ctx = SqlContext::new(ROW_VAR, &spec).with_window(&window);
                Ok(SingleColumn::new(c.column.name(), c.value.to_sql(&ctx)?))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        spec.select.items = items;
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let params = format!("{PARTIAL_FRAME_VAR},{WINDOW_VAR},{ROW_VAR}");
        let mut out = self.base.to_pure(config);
        let mut projections = Vec::with_capacity(self.columns.len());
        for c in &self.columns {
            let temp = escape_column_name(&format!("{}{}", c.column.name(), TEMP_COLUMN_SUFFIX));
            out.push_str(&format!(
                "{}->extend({}, ~{}:{})",
                config.separator(1),
                c.window.to_pure(config),
                temp,
                lambda(&params, &c.value.to_pure(config))
            ));
            projections.push(format!(
                "{}:{}",
                escape_column_name(c.column.name()),
                lambda(ROW_VAR, &format!("${ROW_VAR}.{temp}"))
            ));
        }
        format!(
            "{}{}->project(~[{}])",
            out,
            config.separator(1),
            projections.join(", ")
        )
    }
}

impl GroupByFrame {
    fn windowed(
        &self,
        name: &'static str,
        columns: Vec<WindowedColumn>,
    ) -> FrameResult<TdsFrame> {
        TdsFrame::applied(GroupWindow {
            name,
            base: self.base_frame().clone(),
            columns,
        })
    }

    fn rank_columns(
        &self,
        ascending: bool,
        value: impl Fn(&PartialFrame, &WindowRef, &crate::tds::TdsRow) -> Expr,
    ) -> FrameResult<Vec<WindowedColumn>> {
        let row = self.base_frame().row(ROW_VAR);
        let direction = if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        self.value_columns()
            .into_iter()
            .map(|name| {
                let window = Window::new()
                    .partition_by(self.grouping_columns())
                    .order_by([SortInfo::new(name.clone(), direction)]);
                let value = value(&PartialFrame, &WindowRef, &row);
                Ok(WindowedColumn {
                    column: TdsColumn::primitive(name, value.ty()),
                    window,
                    value,
                })
            })
            .collect()
    }

    /// Rank each value column within its group, ordered by its own
    /// values. Ranks are integers starting at 1.
    pub fn rank(&self, method: RankMethod, ascending: bool) -> FrameResult<TdsFrame> {
        let columns = self.rank_columns(ascending, |p, w, r| match method {
            RankMethod::Min => p.rank(w, r),
            RankMethod::First => p.row_number(r),
            RankMethod::Dense => p.dense_rank(w, r),
        })?;
        self.windowed("rank", columns)
    }

    /// Percentage rank (`min` ties) of each value column within its group.
    pub fn rank_pct(&self, ascending: bool) -> FrameResult<TdsFrame> {
        let columns = self.rank_columns(ascending, |p, w, r| p.percent_rank(w, r))?;
        self.windowed("rank", columns)
    }

    /// Each value column taken from the previous (`1`) or next (`-1`) row
    /// of its group.
    pub fn shift(&self, periods: i64) -> FrameResult<TdsFrame> {
        let row = self.base_frame().row(ROW_VAR);
        let shifted = match periods {
            1 => PartialFrame.lag(&row),
            -1 => PartialFrame.lead(&row),
            _ => {
                return Err(FrameError::unsupported(format!(
                    "The 'periods' argument of the shift function must be 1 or -1, but got: periods={periods}"
                )))
            }
        };
        let columns = self
            .value_columns()
            .into_iter()
            .map(|name| {
                let column = self
                    .base_frame()
                    .column(&name)
                    .cloned()
                    .ok_or_else(|| FrameError::schema(format!("Cannot find column: {name}")))?;
                Ok(WindowedColumn {
                    column,
                    window: Window::new().partition_by(self.grouping_columns()),
                    value: shifted.get_any(&name)?,
                })
            })
            .collect::<FrameResult<Vec<_>>>()?;
        self.windowed("shift", columns)
    }
}
