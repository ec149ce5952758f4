//! Window specifications and window functions.
//!
//! A `window_extend` lambda receives three handles: the partial frame `p`
//! (row-valued window functions), the window reference `w` and the current
//! row `r`. Window functions are ordinary [`Expr`] nodes; the `OVER`
//! clause is attached when the expression is lowered inside a window
//! (see [`SqlContext::with_window`](super::SqlContext::with_window)).

use super::{DurationUnit, Expr, ExprKind, RowAccess, SortInfo};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::pure::escape_column_name;
use crate::sql::{self, QuerySpecification, SqlExpr, WindowFrameBound};
use crate::tds::{PrimitiveType, TdsRow};

/// Pure variable of the partial frame in a window lambda.
pub const PARTIAL_FRAME_VAR: &str = "p";
/// Pure variable of the window reference in a window lambda.
pub const WINDOW_VAR: &str = "w";

// =============================================================================
// Frame Bounds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBoundType {
    Unbounded,
    Preceding,
    CurrentRow,
    Following,
}

impl FrameBoundType {
    fn name(&self) -> &'static str {
        match self {
            FrameBoundType::Unbounded => "UNBOUNDED",
            FrameBoundType::Preceding => "PRECEDING",
            FrameBoundType::CurrentRow => "CURRENT_ROW",
            FrameBoundType::Following => "FOLLOWING",
        }
    }
}

/// One end of a window frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBound {
    bound_type: FrameBoundType,
    offset: Option<i64>,
    unit: Option<DurationUnit>,
}

impl FrameBound {
    /// `PRECEDING`/`FOLLOWING` need an offset; the other bound types take none.
    pub fn new(
        bound_type: FrameBoundType,
        offset: Option<i64>,
        unit: Option<DurationUnit>,
    ) -> FrameResult<Self> {
        let needs_offset = matches!(
            bound_type,
            FrameBoundType::Preceding | FrameBoundType::Following
        );
        if needs_offset && offset.is_none() {
            return Err(FrameError::validation(format!(
                "row_offset must be provided for bound_type {}",
                bound_type.name()
            )));
        }
        if !needs_offset && offset.is_some() {
            return Err(FrameError::validation(format!(
                "row_offset is not allowed for bound_type {}",
                bound_type.name()
            )));
        }
        Ok(Self {
            bound_type,
            offset,
            unit,
        })
    }

    pub fn unbounded() -> Self {
        Self {
            bound_type: FrameBoundType::Unbounded,
            offset: None,
            unit: None,
        }
    }

    pub fn current_row() -> Self {
        Self {
            bound_type: FrameBoundType::CurrentRow,
            offset: None,
            unit: None,
        }
    }

    /// Negative is preceding, positive following, zero the current row.
    pub fn offset(offset: i64) -> Self {
        let bound_type = match offset {
            0 => return Self::current_row(),
            n if n < 0 => FrameBoundType::Preceding,
            _ => FrameBoundType::Following,
        };
        Self {
            bound_type,
            offset: Some(offset),
            unit: None,
        }
    }

    /// Offset measured in `unit`s, for range frames over dates.
    pub fn duration(offset: i64, unit: DurationUnit) -> Self {
        Self {
            unit: Some(unit),
            ..Self::offset(offset)
        }
    }

    pub fn bound_type(&self) -> FrameBoundType {
        self.bound_type
    }

    fn is_bounded(&self) -> bool {
        self.bound_type != FrameBoundType::Unbounded
    }

    fn to_pure(&self) -> String {
        let mut text = match self.bound_type {
            FrameBoundType::Unbounded => return "unbounded()".to_string(),
            FrameBoundType::CurrentRow => "0".to_string(),
            _ => self.offset.map(|o| o.to_string()).unwrap_or_default(),
        };
        if let Some(unit) = self.unit {
            text.push_str(", ");
            text.push_str(&unit.to_pure());
        }
        text
    }

    fn to_sql(&self, is_start: bool) -> WindowFrameBound {
        let amount = self.offset.map(i64::abs).unwrap_or(0);
        let value = || match self.unit {
            Some(unit) => SqlExpr::Interval { amount, unit },
            None => SqlExpr::integer(amount),
        };
        match self.bound_type {
            FrameBoundType::Unbounded if is_start => WindowFrameBound::UnboundedPreceding,
            FrameBoundType::Unbounded => WindowFrameBound::UnboundedFollowing,
            FrameBoundType::CurrentRow => WindowFrameBound::CurrentRow,
            FrameBoundType::Preceding => WindowFrameBound::Preceding(value()),
            FrameBoundType::Following => WindowFrameBound::Following(value()),
        }
    }
}

// =============================================================================
// Window Frame and Window
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFrameMode {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFrame {
    mode: WindowFrameMode,
    start: FrameBound,
    end: FrameBound,
}

impl WindowFrame {
    /// Row-offset frame.
    pub fn rows(start: FrameBound, end: FrameBound) -> FrameResult<Self> {
        if start.unit.is_some() || end.unit.is_some() {
            return Err(FrameError::validation(
                "Duration units are only allowed in range frames",
            ));
        }
        Ok(Self {
            mode: WindowFrameMode::Rows,
            start,
            end,
        })
    }

    /// Value-range frame. When either bound carries a duration unit, every
    /// bounded end must carry one.
    pub fn range(start: FrameBound, end: FrameBound) -> FrameResult<Self> {
        let uses_duration = start.unit.is_some() || end.unit.is_some();
        if uses_duration {
            for (bound, name) in [(&start, "start"), (&end, "end")] {
                if bound.is_bounded() && bound.unit.is_none() {
                    return Err(FrameError::validation(format!(
                        "duration_{name}_unit is required for bounded duration_{name}."
                    )));
                }
            }
        }
        Ok(Self {
            mode: WindowFrameMode::Range,
            start,
            end,
        })
    }

    pub fn mode(&self) -> WindowFrameMode {
        self.mode
    }

    fn to_pure(&self) -> String {
        let mode = match self.mode {
            WindowFrameMode::Rows => "rows",
            WindowFrameMode::Range => "_range",
        };
        format!("{}({}, {})", mode, self.start.to_pure(), self.end.to_pure())
    }

    fn to_sql(&self) -> sql::WindowFrame {
        sql::WindowFrame {
            mode: match self.mode {
                WindowFrameMode::Rows => sql::WindowFrameMode::Rows,
                WindowFrameMode::Range => sql::WindowFrameMode::Range,
            },
            start: self.start.to_sql(true),
            end: self.end.to_sql(false),
        }
    }
}

/// `(partition_by, order_by, frame?)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Window {
    partition_by: Vec<String>,
    order_by: Vec<SortInfo>,
    frame: Option<WindowFrame>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = SortInfo>) -> Self {
        self.order_by = sorts.into_iter().collect();
        self
    }

    pub fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn partitions(&self) -> &[String] {
        &self.partition_by
    }

    pub fn sorts(&self) -> &[SortInfo] {
        &self.order_by
    }

    /// Every column the window names, partitions first.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.partition_by
            .iter()
            .map(String::as_str)
            .chain(self.order_by.iter().map(|s| s.column.as_str()))
    }

    /// `over(~[a, b], [ascending(~c)], rows(unbounded(), 0))`
    pub fn to_pure(&self, _config: &FrameToPureConfig) -> String {
        let partitions = if self.partition_by.is_empty() {
            "[]".to_string()
        } else {
            let cols: Vec<String> = self
                .partition_by
                .iter()
                .map(|c| escape_column_name(c))
                .collect();
            format!("~[{}]", cols.join(", "))
        };
        let sorts = if self.order_by.is_empty() {
            "[]".to_string()
        } else {
            let sorts: Vec<String> = self.order_by.iter().map(SortInfo::to_pure).collect();
            format!("[{}]", sorts.join(", "))
        };
        let frame = self
            .frame
            .as_ref()
            .map(|f| format!(", {}", f.to_pure()))
            .unwrap_or_default();
        format!("over({partitions}, {sorts}{frame})")
    }

    /// Resolve the named columns against `query`'s select list.
    pub fn to_sql(&self, query: &QuerySpecification) -> FrameResult<sql::Window> {
        let find = |col: &str| -> FrameResult<SqlExpr> {
            query
                .select
                .item(col)
                .map(|item| item.expression.clone())
                .ok_or_else(|| FrameError::schema(format!("Cannot find column: {col}")))
        };
        let partitions = self
            .partition_by
            .iter()
            .map(|c| find(c))
            .collect::<FrameResult<Vec<_>>>()?;
        let order_by = self
            .order_by
            .iter()
            .map(|s| Ok(s.to_sql(find(&s.column)?)))
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(sql::Window {
            partitions,
            order_by,
            frame: self.frame.as_ref().map(WindowFrame::to_sql),
        })
    }
}

// =============================================================================
// Window Functions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankFunction {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    Ntile(i64),
}

impl RankFunction {
    pub fn sql_name(&self) -> &'static str {
        match self {
            RankFunction::RowNumber => "row_number",
            RankFunction::Rank => "rank",
            RankFunction::DenseRank => "dense_rank",
            RankFunction::PercentRank => "percent_rank",
            RankFunction::CumeDist => "cume_dist",
            RankFunction::Ntile(_) => "ntile",
        }
    }

    pub fn return_type(&self) -> PrimitiveType {
        match self {
            RankFunction::PercentRank | RankFunction::CumeDist => PrimitiveType::Float,
            _ => PrimitiveType::Integer,
        }
    }

    /// `$p->rank($w, $r)`
    pub(crate) fn to_pure(&self, row: &str) -> String {
        let p = PARTIAL_FRAME_VAR;
        let w = WINDOW_VAR;
        match self {
            RankFunction::RowNumber => format!("${p}->rowNumber(${row})"),
            RankFunction::Rank => format!("${p}->rank(${w}, ${row})"),
            RankFunction::DenseRank => format!("${p}->denseRank(${w}, ${row})"),
            RankFunction::PercentRank => format!("${p}->percentRank(${w}, ${row})"),
            RankFunction::CumeDist => format!("${p}->cumulativeDistribution(${w}, ${row})"),
            RankFunction::Ntile(n) => format!("${p}->ntile(${row}, {n})"),
        }
    }
}

impl RowAccess {
    /// `$p->lead($r)` prefix for a column read through this access.
    pub(crate) fn pure_row(&self, row: &str) -> String {
        let p = PARTIAL_FRAME_VAR;
        let w = WINDOW_VAR;
        match self {
            RowAccess::Current => format!("${row}"),
            RowAccess::Lead => format!("${p}->lead(${row})"),
            RowAccess::Lag => format!("${p}->lag(${row})"),
            RowAccess::First => format!("${p}->first(${w}, ${row})"),
            RowAccess::Last => format!("${p}->last(${w}, ${row})"),
            RowAccess::Nth(k) => format!("${p}->nth(${w}, ${row}, {k})"),
        }
    }

    /// SQL window function reading `value` through this access.
    pub(crate) fn sql_function(&self, value: SqlExpr) -> Option<SqlExpr> {
        let call = match self {
            RowAccess::Current => return None,
            RowAccess::Lead => SqlExpr::function("lead", vec![value]),
            RowAccess::Lag => SqlExpr::function("lag", vec![value]),
            RowAccess::First => SqlExpr::function("first_value", vec![value]),
            RowAccess::Last => SqlExpr::function("last_value", vec![value]),
            RowAccess::Nth(k) => SqlExpr::function("nth_value", vec![value, SqlExpr::integer(*k)]),
        };
        Some(call)
    }
}

/// The window reference `w` handed to window lambdas.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRef;

/// The partial frame `p` handed to window lambdas.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialFrame;

impl PartialFrame {
    fn rank_expr(function: RankFunction, row: &TdsRow) -> Expr {
        Expr::new(
            ExprKind::Rank {
                function,
                row: row.alias().to_string(),
            },
            function.return_type(),
            false,
        )
    }

    pub fn row_number(&self, row: &TdsRow) -> Expr {
        Self::rank_expr(RankFunction::RowNumber, row)
    }

    pub fn rank(&self, _window: &WindowRef, row: &TdsRow) -> Expr {
        Self::rank_expr(RankFunction::Rank, row)
    }

    pub fn dense_rank(&self, _window: &WindowRef, row: &TdsRow) -> Expr {
        Self::rank_expr(RankFunction::DenseRank, row)
    }

    pub fn percent_rank(&self, _window: &WindowRef, row: &TdsRow) -> Expr {
        Self::rank_expr(RankFunction::PercentRank, row)
    }

    pub fn cume_dist(&self, _window: &WindowRef, row: &TdsRow) -> Expr {
        Self::rank_expr(RankFunction::CumeDist, row)
    }

    pub fn ntile(&self, row: &TdsRow, buckets: i64) -> FrameResult<Expr> {
        if buckets <= 0 {
            return Err(FrameError::validation(format!(
                "ntile bucket count should be a positive integer. Got {buckets}"
            )));
        }
        Ok(Self::rank_expr(RankFunction::Ntile(buckets), row))
    }

    /// The next row; columns read from it lower to `lead(col)`.
    pub fn lead(&self, row: &TdsRow) -> TdsRow {
        row.with_access(RowAccess::Lead)
    }

    pub fn lag(&self, row: &TdsRow) -> TdsRow {
        row.with_access(RowAccess::Lag)
    }

    pub fn first(&self, _window: &WindowRef, row: &TdsRow) -> TdsRow {
        row.with_access(RowAccess::First)
    }

    pub fn last(&self, _window: &WindowRef, row: &TdsRow) -> TdsRow {
        row.with_access(RowAccess::Last)
    }

    /// The `n`-th (1-based) row of the frame.
    pub fn nth(&self, _window: &WindowRef, row: &TdsRow, n: i64) -> FrameResult<TdsRow> {
        if n <= 0 {
            return Err(FrameError::validation(format!(
                "nth row offset should be a positive integer. Got {n}"
            )));
        }
        Ok(row.with_access(RowAccess::Nth(n)))
    }
}
