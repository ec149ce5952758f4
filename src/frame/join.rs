//! Two-frame joins: `join`, `cross_join`, `join_by_columns` and
//! `as_of_join`.
//!
//! Both sides are nested as `"left"` and `"right"` subqueries, the outer
//! block projects their columns and is nested again as `"root"`:
//!
//! ```text
//!   SELECT "root"."col1" AS "col1", ... FROM (
//!       SELECT "left"."col1" AS "col1", ..., "right"."col4" AS "col4"
//!       FROM (...) AS "left" LEFT OUTER JOIN (...) AS "right"
//!       ON ("left"."col2" = "right"."col4")
//!   ) AS "root"
//! ```

use std::fmt;
use std::str::FromStr;

use super::compose::{create_sub_query, project_all, ROOT_ALIAS};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{Expr, SqlContext};
use crate::pure::{escape_column_name, lambda};
use crate::sql::{self, ComparisonOp, LogicalOp, QuerySpecification, Relation, SqlExpr};
use crate::tds::{name_list, TdsColumn, TdsRow};

const LEFT_ALIAS: &str = "left";
const RIGHT_ALIAS: &str = "right";
/// Row variables in join lambdas.
const LEFT_ROW_VAR: &str = "l";
const RIGHT_ROW_VAR: &str = "r";
/// Suffix given to same-name right keys in the Pure of `join_by_columns`.
const GENERATED_RIGHT_SUFFIX: &str = "_gen_r";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinKind {
    fn pure_name(&self) -> &'static str {
        match self {
            JoinKind::Inner | JoinKind::Cross => "INNER",
            JoinKind::LeftOuter => "LEFT",
            JoinKind::RightOuter => "RIGHT",
            JoinKind::FullOuter => "FULL",
        }
    }

    fn to_sql(self) -> sql::JoinKind {
        match self {
            JoinKind::Inner => sql::JoinKind::Inner,
            JoinKind::LeftOuter => sql::JoinKind::LeftOuter,
            JoinKind::RightOuter => sql::JoinKind::RightOuter,
            JoinKind::FullOuter => sql::JoinKind::FullOuter,
            JoinKind::Cross => sql::JoinKind::Cross,
        }
    }
}

impl FromStr for JoinKind {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" | "left_outer" | "leftouter" => Ok(JoinKind::LeftOuter),
            "right" | "right_outer" | "rightouter" => Ok(JoinKind::RightOuter),
            "outer" | "full" | "full_outer" | "fullouter" => Ok(JoinKind::FullOuter),
            "cross" => Ok(JoinKind::Cross),
            _ => Err(FrameError::validation(format!(
                "Unknown join type - {s}. Supported types are - INNER, LEFT_OUTER, RIGHT_OUTER, \
                 FULL_OUTER, CROSS"
            ))),
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinKind::Inner => "INNER",
            JoinKind::LeftOuter => "LEFT_OUTER",
            JoinKind::RightOuter => "RIGHT_OUTER",
            JoinKind::FullOuter => "FULL_OUTER",
            JoinKind::Cross => "CROSS",
        })
    }
}

/// The join block over `"left"` and `"right"`, nested as `"root"`.
fn join_query(
    left: QuerySpecification,
    right: QuerySpecification,
    kind: JoinKind,
    criteria: Option<SqlExpr>,
    items: Vec<sql::SingleColumn>,
) -> QuerySpecification {
    let join = Relation::Join {
        kind: kind.to_sql(),
        left: Box::new(Relation::subquery(left).aliased(LEFT_ALIAS)),
        right: Box::new(Relation::subquery(right).aliased(RIGHT_ALIAS)),
        criteria,
    };
    create_sub_query(
        QuerySpecification::select_from(items, join),
        ROOT_ALIAS,
        None,
    )
}

/// `->join(other, JoinKind.X, {l, r | condition})`
fn pure_join(
    base: &str,
    other: &TdsFrame,
    kind: JoinKind,
    condition: &str,
    config: &FrameToPureConfig,
) -> String {
    format!(
        "{}{}->join({}{},{}JoinKind.{},{}{}{})",
        base,
        config.separator(1),
        config.separator(2),
        other.to_pure(&config.push_indent(2)),
        config.separator_or_space(2),
        kind.pure_name(),
        config.separator_or_space(2),
        lambda(&format!("{LEFT_ROW_VAR}, {RIGHT_ROW_VAR}"), condition),
        config.separator(1)
    )
}

fn ensure_disjoint(left: &TdsFrame, right: &TdsFrame) -> FrameResult<()> {
    let left_cols = left.column_names();
    let right_cols = right.column_names();
    if left_cols.iter().any(|c| right_cols.contains(c)) {
        return Err(FrameError::validation(format!(
            "Found duplicate columns in joined frames. Use rename function to ensure there are no \
             duplicate columns in joined frames. Columns - Left Frame: {}, Right Frame: {}",
            name_list(&left_cols),
            name_list(&right_cols)
        )));
    }
    Ok(())
}

/// Evaluate a two-row predicate and check that it is boolean.
fn bind_predicate<F>(left: &TdsFrame, right: &TdsFrame, what: &str, predicate: F) -> FrameResult<Expr>
where
    F: FnOnce(&TdsRow, &TdsRow) -> FrameResult<Expr>,
{
    let l = left.row(LEFT_ROW_VAR);
    let r = right.row(RIGHT_ROW_VAR);
    let expr = predicate(&l, &r).map_err(|e| {
        FrameError::Binding(format!(
            "{what} incompatible. Error occurred while evaluating. Message: {e}"
        ))
    })?;
    if !expr.ty().is_boolean() {
        return Err(FrameError::type_error(format!(
            "{what} incompatible. Returns non boolean - {}",
            expr.ty()
        )));
    }
    Ok(expr)
}

// =============================================================================
// Join
// =============================================================================

#[derive(Debug)]
struct Join {
    base: TdsFrame,
    other: TdsFrame,
    kind: JoinKind,
    /// `None` for a cross join.
    condition: Option<Expr>,
}

impl AppliedFunction for Join {
    fn name(&self) -> &'static str {
        "join"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn tds_frame_parameters(&self) -> Vec<&TdsFrame> {
        vec![&self.other]
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        let mut columns = self.base.columns().to_vec();
        columns.extend_from_slice(self.other.columns());
        Ok(columns)
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let left_inner = self.base.to_sql_spec()?;
        let right_inner = self.other.to_sql_spec()?;
        let criteria = match &self.condition {
            Some(condition) => {
                // Views of both sides as seen through their join aliases.
                let left = create_sub_query(left_inner.clone(), LEFT_ALIAS, None);
                let right = create_sub_query(right_inner.clone(), RIGHT_ALIAS, None);
                let ctx = SqlContext::new(LEFT_ROW_VAR, &left).with_frame(RIGHT_ROW_VAR, &right);
                Some(condition.to_sql(&ctx)?)
            }
            None => None,
        };
        let mut items = project_all(LEFT_ALIAS, &self.base.column_names());
        items.extend(project_all(RIGHT_ALIAS, &self.other.column_names()));
        Ok(join_query(left_inner, right_inner, self.kind, criteria, items))
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let condition = match &self.condition {
            Some(condition) => condition.to_pure(&config.push_indent(2)),
            None => "true".to_string(),
        };
        pure_join(&self.base.to_pure(config), &self.other, self.kind, &condition, config)
    }
}

// =============================================================================
// Join By Columns
// =============================================================================

#[derive(Debug)]
struct JoinByColumns {
    base: TdsFrame,
    other: TdsFrame,
    left_keys: Vec<String>,
    right_keys: Vec<String>,
    kind: JoinKind,
    /// Keys named the same on both sides, in left frame order.
    common: Vec<String>,
    /// `other` with the common keys renamed, for the Pure rendering.
    pure_other: TdsFrame,
}

impl JoinByColumns {
    fn is_common(&self, name: &str) -> bool {
        self.common.iter().any(|c| c == name)
    }
}

impl AppliedFunction for JoinByColumns {
    fn name(&self) -> &'static str {
        "join_by_columns"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn tds_frame_parameters(&self) -> Vec<&TdsFrame> {
        vec![&self.other]
    }

    /// Left non-key columns, then the shared keys, then right columns.
    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        let base = self.base.columns();
        let mut columns: Vec<TdsColumn> = base
            .iter()
            .filter(|c| !self.is_common(c.name()))
            .cloned()
            .collect();
        columns.extend(base.iter().filter(|c| self.is_common(c.name())).cloned());
        columns.extend(
            self.other
                .columns()
                .iter()
                .filter(|c| !self.is_common(c.name()))
                .cloned(),
        );
        Ok(columns)
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let criteria = SqlExpr::fold(
            LogicalOp::And,
            self.left_keys
                .iter()
                .zip(&self.right_keys)
                .map(|(l, r)| {
                    SqlExpr::comparison(
                        ComparisonOp::Eq,
                        SqlExpr::projected_column(LEFT_ALIAS, l),
                        SqlExpr::projected_column(RIGHT_ALIAS, r),
                    )
                })
                .collect(),
        );
        let common_side = if self.kind == JoinKind::RightOuter {
            RIGHT_ALIAS
        } else {
            LEFT_ALIAS
        };
        let base_names = self.base.column_names();
        let (shared, own): (Vec<String>, Vec<String>) =
            base_names.into_iter().partition(|c| self.is_common(c));
        let mut items = project_all(LEFT_ALIAS, &own);
        items.extend(project_all(common_side, &shared));
        let right_own: Vec<String> = self
            .other
            .column_names()
            .into_iter()
            .filter(|c| !self.is_common(c))
            .collect();
        items.extend(project_all(RIGHT_ALIAS, &right_own));
        Ok(join_query(
            self.base.to_sql_spec()?,
            self.other.to_sql_spec()?,
            self.kind,
            criteria,
            items,
        ))
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let condition: Vec<String> = self
            .left_keys
            .iter()
            .zip(&self.right_keys)
            .map(|(l, r)| {
                let r = if self.is_common(r) {
                    format!("{r}{GENERATED_RIGHT_SUFFIX}")
                } else {
                    r.clone()
                };
                format!(
                    "(${LEFT_ROW_VAR}.{} == ${RIGHT_ROW_VAR}.{})",
                    escape_column_name(l),
                    escape_column_name(&r)
                )
            })
            .collect();
        let joined = pure_join(
            &self.base.to_pure(config),
            &self.pure_other,
            self.kind,
            &condition.join(" && "),
            config,
        );
        if self.common.is_empty() {
            return joined;
        }
        // Drop the renamed right keys and restore the declared order.
        let columns: Vec<String> = self
            .calculate_columns()
            .unwrap_or_default()
            .iter()
            .map(|c| escape_column_name(c.name()))
            .collect();
        format!(
            "{}{}->select(~[{}])",
            joined,
            config.separator(1),
            columns.join(", ")
        )
    }
}

// =============================================================================
// As-Of Join
// =============================================================================

#[derive(Debug)]
struct AsOfJoin {
    base: TdsFrame,
    other: TdsFrame,
    matcher: Expr,
    condition: Option<Expr>,
}

impl AppliedFunction for AsOfJoin {
    fn name(&self) -> &'static str {
        "as_of_join"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn tds_frame_parameters(&self) -> Vec<&TdsFrame> {
        vec![&self.other]
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        let mut columns = self.base.columns().to_vec();
        columns.extend_from_slice(self.other.columns());
        Ok(columns)
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        Err(FrameError::unsupported(
            "AsOfJoin SQL translation not supported yet",
        ))
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let params = format!("{LEFT_ROW_VAR}, {RIGHT_ROW_VAR}");
        let nested = config.push_indent(2);
        let join_arg = match &self.condition {
            Some(condition) => format!(
                ",{}{}{}",
                config.separator_or_space(2),
                lambda(&params, &condition.to_pure(&nested)),
                config.separator(1)
            ),
            None => config.separator(1),
        };
        format!(
            "{}{}->asOfJoin({}{},{}{}{})",
            self.base.to_pure(config),
            config.separator(1),
            config.separator(2),
            self.other.to_pure(&nested),
            config.separator_or_space(2),
            lambda(&params, &self.matcher.to_pure(&nested)),
            join_arg
        )
    }
}

// =============================================================================
// Frame Methods
// =============================================================================

impl TdsFrame {
    /// Join with `other` on a predicate over the left row `l` and the
    /// right row `r`. Column names must not overlap.
    pub fn join<F>(&self, other: &TdsFrame, kind: JoinKind, condition: F) -> FrameResult<TdsFrame>
    where
        F: FnOnce(&TdsRow, &TdsRow) -> FrameResult<Expr>,
    {
        if kind == JoinKind::Cross {
            return Err(FrameError::validation(
                "A CROSS join takes no join condition. Use cross_join instead",
            ));
        }
        let condition = bind_predicate(self, other, "Join condition function", condition)?;
        ensure_disjoint(self, other)?;
        TdsFrame::applied(Join {
            base: self.clone(),
            other: other.clone(),
            kind,
            condition: Some(condition),
        })
    }

    /// Every pairing of a row of this frame with a row of `other`.
    pub fn cross_join(&self, other: &TdsFrame) -> FrameResult<TdsFrame> {
        ensure_disjoint(self, other)?;
        TdsFrame::applied(Join {
            base: self.clone(),
            other: other.clone(),
            kind: JoinKind::Cross,
            condition: None,
        })
    }

    /// Equi-join on pairs of key columns. A key named the same on both
    /// sides appears once in the output.
    pub fn join_by_columns<S: AsRef<str>, T: AsRef<str>>(
        &self,
        other: &TdsFrame,
        left_keys: &[S],
        right_keys: &[T],
        kind: JoinKind,
    ) -> FrameResult<TdsFrame> {
        let left_keys: Vec<String> = left_keys.iter().map(|k| k.as_ref().to_string()).collect();
        let right_keys: Vec<String> = right_keys.iter().map(|k| k.as_ref().to_string()).collect();
        let left_cols = self.column_names();
        let right_cols = other.column_names();

        if let Some(c) = left_keys.iter().find(|c| !left_cols.contains(c)) {
            return Err(FrameError::validation(format!(
                "Column - '{}' in join columns list doesn't exist in the left frame being joined. \
                 Current left frame columns: {}",
                c,
                name_list(&left_cols)
            )));
        }
        if let Some(c) = right_keys.iter().find(|c| !right_cols.contains(c)) {
            return Err(FrameError::validation(format!(
                "Column - '{}' in join columns list doesn't exist in the right frame being joined. \
                 Current right frame columns: {}",
                c,
                name_list(&right_cols)
            )));
        }
        if left_keys.len() != right_keys.len() {
            return Err(FrameError::validation(format!(
                "For join_by_columns function, column lists should be of same size. \
                 Passed column list sizes -  Left: {}, Right: {}",
                left_keys.len(),
                right_keys.len()
            )));
        }
        if left_keys.is_empty() {
            return Err(FrameError::validation(
                "For join_by_columns function, column lists should not be empty",
            ));
        }
        if kind == JoinKind::Cross {
            return Err(FrameError::validation(
                "A CROSS join takes no join columns. Use cross_join instead",
            ));
        }

        let mut common = Vec::new();
        for (l, r) in left_keys.iter().zip(&right_keys) {
            let (Some(left_col), Some(right_col)) = (self.column(l), other.column(r)) else {
                continue;
            };
            if left_col.column_type() != right_col.column_type() {
                return Err(FrameError::type_error(format!(
                    "Trying to join on columns with different types -  Left Col: {left_col}, \
                     Right Col: {right_col}"
                )));
            }
            if l == r {
                common.push(l.clone());
            }
        }
        common.sort();

        let final_cols: Vec<&String> = left_cols
            .iter()
            .chain(right_cols.iter())
            .filter(|c| !common.contains(c))
            .chain(common.iter())
            .collect();
        let mut seen = std::collections::HashSet::new();
        if !final_cols.iter().all(|c| seen.insert(c.as_str())) {
            return Err(FrameError::validation(format!(
                "Found duplicate columns in joined frames (which are not join keys). \
                 Columns -  Left Frame: {}, Right Frame: {}, Common Join Keys: {}",
                name_list(&left_cols),
                name_list(&right_cols),
                name_list(&common)
            )));
        }

        let pure_other = if common.is_empty() {
            other.clone()
        } else {
            let renames: Vec<(String, String)> = common
                .iter()
                .map(|c| (c.clone(), format!("{c}{GENERATED_RIGHT_SUFFIX}")))
                .collect();
            other.rename(&renames)?
        };
        TdsFrame::applied(JoinByColumns {
            base: self.clone(),
            other: other.clone(),
            left_keys,
            right_keys,
            kind,
            common,
            pure_other,
        })
    }

    /// As-of join: each left row is matched with the right row that best
    /// satisfies `matcher`, optionally restricted by `condition`.
    ///
    /// Only the Pure rendering is available; SQL lowering fails with an
    /// unsupported error.
    pub fn as_of_join<M, F>(
        &self,
        other: &TdsFrame,
        matcher: M,
        condition: Option<F>,
    ) -> FrameResult<TdsFrame>
    where
        M: FnOnce(&TdsRow, &TdsRow) -> FrameResult<Expr>,
        F: FnOnce(&TdsRow, &TdsRow) -> FrameResult<Expr>,
    {
        let matcher = bind_predicate(self, other, "AsOfJoin match function", matcher)?;
        let condition = condition
            .map(|c| bind_predicate(self, other, "AsOfJoin join function", c))
            .transpose()?;
        ensure_disjoint(self, other)?;
        TdsFrame::applied(AsOfJoin {
            base: self.clone(),
            other: other.clone(),
            matcher,
            condition,
        })
    }
}
