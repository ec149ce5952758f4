//! Subquery composition.
//!
//! Each applied function receives the query specification of its base
//! frame and either edits it in place or nests it first:
//!
//! ```text
//!   SELECT "root".col1 AS "col1"          SELECT "root"."col1" AS "col1"
//!   FROM t AS "root"            ──wrap──▶ FROM (SELECT "root".col1 AS "col1"
//!   LIMIT 10                                    FROM t AS "root"
//!                                               LIMIT 10) AS "root"
//! ```
//!
//! Whether to nest depends on the clauses already present in the incoming
//! query and on the operation about to be applied; see [`wrap_reason`].

use tracing::debug;

use crate::sql::{QuerySpecification, Relation, SingleColumn, SqlExpr};

/// Alias of the relation every frame query selects from.
pub const ROOT_ALIAS: &str = "root";

/// The kinds of edits an applied function makes to its base query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Head,
    Filter,
    Sort,
    Distinct,
    GroupBy,
    Extend,
    Project,
    WindowExtend,
    Aggregate,
    Cast,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Head => "head",
            Operation::Filter => "filter",
            Operation::Sort => "sort",
            Operation::Distinct => "distinct",
            Operation::GroupBy => "group_by",
            Operation::Extend => "extend",
            Operation::Project => "project",
            Operation::WindowExtend => "window_extend",
            Operation::Aggregate => "aggregate",
            Operation::Cast => "cast",
        }
    }
}

/// Why `spec` has to be nested before `op` can edit it, or `None` when it
/// can be edited in place.
pub(crate) fn wrap_reason(spec: &QuerySpecification, op: Operation) -> Option<&'static str> {
    use Operation::*;

    if !spec.group_by.is_empty() && op != Sort {
        return Some("group by");
    }
    let sees_distinct_rows = matches!(
        op,
        Head | GroupBy | Extend | Project | WindowExtend | Aggregate | Cast
    );
    if spec.select.distinct && sees_distinct_rows {
        return Some("distinct");
    }
    if spec.has_limit_or_offset() && !matches!(op, Extend | Project | WindowExtend | Cast) {
        return Some("limit/offset");
    }
    // Window results cannot be filtered, grouped or windowed again in the
    // same block.
    let windowed = spec
        .select
        .items
        .iter()
        .any(|item| item.expression.contains_window());
    if windowed && matches!(op, Filter | GroupBy | WindowExtend | Aggregate) {
        return Some("window function");
    }
    if !spec.order_by.is_empty() && matches!(op, GroupBy | Aggregate) {
        return Some("order by");
    }
    None
}

/// The spec `op` should edit: `spec` itself, or `spec` nested as `"root"`.
pub(crate) fn prepare(spec: QuerySpecification, op: Operation) -> QuerySpecification {
    match wrap_reason(&spec, op) {
        Some(reason) => {
            debug!(operation = op.name(), reason, "nesting query as subquery");
            create_sub_query(spec, ROOT_ALIAS, None)
        }
        None => spec,
    }
}

/// Nest `spec` as `( spec ) AS "alias"` and re-project its columns by
/// qualified reference.
///
/// With `retain`, only those columns are projected, in the order given.
pub(crate) fn create_sub_query(
    spec: QuerySpecification,
    alias: &str,
    retain: Option<&[String]>,
) -> QuerySpecification {
    let names: Vec<String> = match retain {
        Some(names) => names.to_vec(),
        None => spec.column_names().iter().map(|c| c.to_string()).collect(),
    };
    let items = names
        .iter()
        .map(|name| SingleColumn::new(name.clone(), SqlExpr::projected_column(alias, name)))
        .collect();
    QuerySpecification::select_from(items, Relation::subquery(spec).aliased(alias))
}

/// Select list that re-projects the columns of a relation aliased `alias`.
pub(crate) fn project_all(alias: &str, names: &[String]) -> Vec<SingleColumn> {
    names
        .iter()
        .map(|name| SingleColumn::new(name.clone(), SqlExpr::projected_column(alias, name)))
        .collect()
}
