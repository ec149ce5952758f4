//! Row-range functions: `head`, `slice` and `truncate`.

use super::compose::{prepare, Operation};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::sql::QuerySpecification;
use crate::tds::TdsColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRange {
    /// First `n` rows.
    Head(u64),
    /// Rows `start..end`.
    Slice { start: u64, end: u64 },
    /// Every row after the first `n`.
    Drop(u64),
}

#[derive(Debug)]
struct Limit {
    base: TdsFrame,
    range: RowRange,
}

impl AppliedFunction for Limit {
    fn name(&self) -> &'static str {
        match self.range {
            RowRange::Head(_) => "head",
            RowRange::Slice { .. } => "slice",
            RowRange::Drop(_) => "drop",
        }
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self.base.columns().to_vec())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = prepare(self.base.to_sql_spec()?, Operation::Head);
        match self.range {
            RowRange::Head(n) => spec.limit = Some(n),
            RowRange::Slice { start, end } => {
                spec.offset = Some(start);
                spec.limit = Some(end - start);
            }
            RowRange::Drop(n) => spec.offset = Some(n),
        }
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let op = match self.range {
            RowRange::Head(n) => format!("->limit({n})"),
            RowRange::Slice { start, end } => format!("->slice({start}, {end})"),
            RowRange::Drop(n) => format!("->drop({n})"),
        };
        format!("{}{}{}", self.base.to_pure(config), config.separator(1), op)
    }
}

impl TdsFrame {
    /// The first `row_count` rows.
    pub fn head(&self, row_count: i64) -> FrameResult<TdsFrame> {
        let n = u64::try_from(row_count).map_err(|_| {
            FrameError::validation(format!(
                "Row count argument of head function cannot be negative. Row count: {row_count}"
            ))
        })?;
        TdsFrame::applied(Limit {
            base: self.clone(),
            range: RowRange::Head(n),
        })
    }

    /// Alias of [`head`](Self::head).
    pub fn limit(&self, row_count: i64) -> FrameResult<TdsFrame> {
        self.head(row_count)
    }

    /// Rows `start_row` (inclusive) to `end_row` (exclusive).
    pub fn slice(&self, start_row: i64, end_row: i64) -> FrameResult<TdsFrame> {
        if start_row < 0 {
            return Err(FrameError::validation(format!(
                "Start row argument of slice function cannot be negative. Start row: {start_row}"
            )));
        }
        if end_row <= start_row {
            return Err(FrameError::validation(format!(
                "End row argument of slice function cannot be less than or equal to start row argument. \
                 Start row: {start_row}, End row: {end_row}"
            )));
        }
        TdsFrame::applied(Limit {
            base: self.clone(),
            range: RowRange::Slice {
                start: start_row as u64,
                end: end_row as u64,
            },
        })
    }

    /// Rows `before..=after` by position. Missing bounds are open; negative
    /// bounds are clamped the way pandas clamps them on a default index.
    pub fn truncate(&self, before: Option<i64>, after: Option<i64>) -> FrameResult<TdsFrame> {
        if let (Some(b), Some(a)) = (before, after) {
            if b > a {
                return Err(FrameError::validation(format!(
                    "The 'before' parameter of the truncate function must be less than or equal to \
                     the 'after' parameter, but got: before={b}, after={a}"
                )));
            }
        }
        let start = before.unwrap_or(0).max(0) as u64;
        let range = match after {
            None => RowRange::Drop(start),
            Some(a) if a < 0 => RowRange::Slice { start: 0, end: 0 },
            Some(a) => RowRange::Slice {
                start,
                end: a as u64 + 1,
            },
        };
        TdsFrame::applied(Limit {
            base: self.clone(),
            range,
        })
    }
}
