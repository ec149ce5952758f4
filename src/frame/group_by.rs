//! Grouping: `group_by`, whole-frame `aggregate` and the pandas-style
//! [`GroupByFrame`].
//!
//! Every form lowers to the same applied function: the grouping keys
//! followed by one aggregated column per aggregation.
//!
//! ```text
//!   SELECT "root".col1 AS "col1", COUNT("root".col2) AS "Count"
//!   FROM test_schema.test_table AS "root"
//!   GROUP BY "root".col1
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;

use super::compose::{prepare, Operation};
use super::{
    bind, bind_aggregate, ensure_distinct_names, AppliedFunction, BoundColumn, CollectionFn,
    ColumnSpec, TdsFrame, ROW_VAR,
};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{Collection, Expr, SortInfo, SqlContext};
use crate::pure::escape_column_name;
use crate::sql::{QuerySpecification, SingleColumn};
use crate::tds::{name_list, TdsColumn, TdsRow};

// =============================================================================
// GroupBy
// =============================================================================

#[derive(Debug)]
struct GroupBy {
    base: TdsFrame,
    keys: Vec<String>,
    aggregates: Vec<BoundColumn>,
}

impl AppliedFunction for GroupBy {
    fn name(&self) -> &'static str {
        if self.keys.is_empty() {
            "aggregate"
        } else {
            "group_by"
        }
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        let mut columns = self
            .keys
            .iter()
            .map(|k| {
                self.base
                    .column(k)
                    .cloned()
                    .ok_or_else(|| FrameError::schema(format!("Cannot find column: {k}")))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        columns.extend(self.aggregates.iter().map(BoundColumn::tds_column));
        Ok(columns)
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let op = if self.keys.is_empty() {
            Operation::Aggregate
        } else {
            Operation::GroupBy
        };
        let mut spec = prepare(self.base.to_sql_spec()?, op);

        let key_items = self
            .keys
            .iter()
            .map(|k| {
                spec.select
                    .item(k)
                    .cloned()
                    .ok_or_else(|| FrameError::schema(format!("Cannot find column: {k}")))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        let agg_items = {
            let ctx = SqlContext::new(ROW_VAR, &spec);
            self.aggregates
                .iter()
                .map(|a| Ok(SingleColumn::new(a.name.clone(), a.value().to_sql(&ctx)?)))
                .collect::<FrameResult<Vec<_>>>()?
        };

        spec.group_by = key_items.iter().map(|i| i.expression.clone()).collect();
        spec.select.items = key_items;
        spec.select.items.extend(agg_items);
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let base = self.base.to_pure(config);
        let aggs: Vec<String> = self
            .aggregates
            .iter()
            .map(|a| a.to_pure(ROW_VAR, config))
            .collect();
        if self.keys.is_empty() {
            return format!(
                "{}{}->aggregate(~[{}])",
                base,
                config.separator(1),
                aggs.join(", ")
            );
        }
        let keys: Vec<String> = self.keys.iter().map(|k| escape_column_name(k)).collect();
        format!(
            "{}{}->groupBy({}~[{}],{}~[{}]{})",
            base,
            config.separator(1),
            config.separator(2),
            keys.join(", "),
            config.separator_or_space(2),
            aggs.join(", "),
            config.separator(1)
        )
    }
}

/// An aggregation column: `name: {r | map}: {c | aggregate}`.
pub struct AggregateSpec<'a>(ColumnSpec<'a>);

impl<'a> AggregateSpec<'a> {
    pub fn new(
        name: impl Into<String>,
        map: impl Fn(&TdsRow) -> FrameResult<Expr> + 'a,
        aggregate: impl Fn(&Collection) -> FrameResult<Expr> + 'a,
    ) -> Self {
        Self(ColumnSpec::aggregated(name, map, aggregate))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}

impl fmt::Debug for AggregateSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AggregateSpec").field(&self.0.name()).finish()
    }
}

impl TdsFrame {
    /// Group by `keys` and compute `aggregates` per group.
    pub fn group_by<S: AsRef<str>>(
        &self,
        keys: &[S],
        aggregates: Vec<AggregateSpec<'_>>,
    ) -> FrameResult<TdsFrame> {
        if keys.is_empty() && aggregates.is_empty() {
            return Err(FrameError::validation(
                "At-least one grouping column or aggregate specification must be provided \
                 when using group_by function",
            ));
        }
        self.require_columns(keys, "group_by columns list")?;
        let row = self.row(ROW_VAR);
        let aggregates = aggregates
            .iter()
            .enumerate()
            .map(|(i, a)| a.0.bind(&row, "group_by", "aggregate_specifications", i))
            .collect::<FrameResult<Vec<_>>>()?;
        self.grouped(
            keys.iter().map(|k| k.as_ref().to_string()).collect(),
            aggregates,
        )
    }

    /// [`group_by`](Self::group_by) with the keys picked by a lambda that
    /// returns column references.
    pub fn group_by_with<F>(&self, keys: F, aggregates: Vec<AggregateSpec<'_>>) -> FrameResult<TdsFrame>
    where
        F: FnOnce(&TdsRow) -> FrameResult<Vec<Expr>>,
    {
        let row = self.row(ROW_VAR);
        let exprs = bind("group_by", "grouping_columns", 0, keys(&row))?;
        let names = exprs
            .iter()
            .enumerate()
            .map(|(i, e)| {
                e.as_column().map(|c| c.name.clone()).ok_or_else(|| {
                    FrameError::type_error(format!(
                        "'group_by' function grouping_columns argument incompatible. \
                         Element at index {} (0-indexed) is not a column reference - {}",
                        i,
                        e.pure_text()
                    ))
                })
            })
            .collect::<FrameResult<Vec<_>>>()?;
        self.group_by(&names, aggregates)
    }

    /// Aggregate every column of the frame into a single row.
    pub fn aggregate<'a>(&self, func: impl Into<AggregateFunc<'a>>) -> FrameResult<TdsFrame> {
        let columns = self.column_names();
        aggregate_over(self, Vec::new(), &columns, &func.into())
    }

    fn grouped(&self, keys: Vec<String>, aggregates: Vec<BoundColumn>) -> FrameResult<TdsFrame> {
        let agg_names: Vec<String> = aggregates.iter().map(|a| a.name.clone()).collect();
        let mut seen = HashSet::new();
        if !keys.iter().chain(agg_names.iter()).all(|n| seen.insert(n.as_str())) {
            return Err(FrameError::validation(format!(
                "Found duplicate column names in grouping columns and aggregation columns. \
                 Grouping columns - {}, Aggregation columns - {}",
                name_list(&keys),
                name_list(&agg_names)
            )));
        }
        TdsFrame::applied(GroupBy {
            base: self.clone(),
            keys,
            aggregates,
        })
    }
}

// =============================================================================
// Aggregation Functions
// =============================================================================

type NamedAggregate = fn(&Collection) -> FrameResult<Expr>;

fn count(c: &Collection) -> FrameResult<Expr> {
    Ok(c.count())
}

fn distinct_count(c: &Collection) -> FrameResult<Expr> {
    Ok(c.distinct_count())
}

/// Aggregation names accepted by [`AggOp::Named`], numpy spellings included.
static AGGREGATE_SYNONYMS: Lazy<HashMap<&'static str, NamedAggregate>> = Lazy::new(|| {
    let groups: [(&[&'static str], NamedAggregate); 8] = [
        (&["count", "size", "len", "length"], count),
        (&["nunique"], distinct_count),
        (&["sum", "nansum"], Collection::sum),
        (&["mean", "average", "nanmean", "avg"], Collection::average),
        (&["min", "nanmin", "amin"], Collection::min),
        (&["max", "nanmax", "amax"], Collection::max),
        (&["std", "std_dev", "nanstd"], Collection::std_dev_sample),
        (&["var", "variance", "nanvar"], Collection::variance_sample),
    ];
    groups
        .iter()
        .flat_map(|(names, f)| names.iter().map(move |n| (*n, *f)))
        .collect()
});

/// One aggregation applied to a column.
pub enum AggOp<'a> {
    /// A named aggregation such as `"sum"` or `"nanmean"`.
    Named(String),
    /// A collection lambda. Unnamed lambdas produce `lambda_k(col)`
    /// columns, numbered from 1 in the order they are given. The count
    /// runs over the op list, not the output columns: a list applied to
    /// several columns gives its first lambda the label `lambda_1` on
    /// every one of them.
    Function {
        name: Option<String>,
        func: CollectionFn<'a>,
    },
}

impl<'a> AggOp<'a> {
    pub fn named(name: impl Into<String>) -> Self {
        AggOp::Named(name.into())
    }

    pub fn function(
        name: impl Into<String>,
        func: impl Fn(&Collection) -> FrameResult<Expr> + 'a,
    ) -> Self {
        AggOp::Function {
            name: Some(name.into()),
            func: Box::new(func),
        }
    }

    pub fn lambda(func: impl Fn(&Collection) -> FrameResult<Expr> + 'a) -> Self {
        AggOp::Function {
            name: None,
            func: Box::new(func),
        }
    }

    fn apply(&self, map: &Expr) -> FrameResult<Expr> {
        match self {
            AggOp::Named(name) => {
                let f = AGGREGATE_SYNONYMS.get(name.as_str()).ok_or_else(|| {
                    FrameError::validation(format!(
                        "Invalid `func` argument for the aggregate function.\n\
                         The string '{name}' does not correspond to any supported aggregation."
                    ))
                })?;
                f(&Collection::new(map.clone()))
            }
            AggOp::Function { func, .. } => bind_aggregate(map, func.as_ref()),
        }
    }
}

impl fmt::Debug for AggOp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggOp::Named(name) => f.debug_tuple("Named").field(name).finish(),
            AggOp::Function { name, .. } => f.debug_struct("Function").field("name", name).finish(),
        }
    }
}

impl From<&str> for AggOp<'_> {
    fn from(name: &str) -> Self {
        AggOp::Named(name.to_string())
    }
}

/// The `func` argument of `aggregate`.
#[derive(Debug)]
pub enum AggregateFunc<'a> {
    /// One aggregation over every value column.
    One(AggOp<'a>),
    /// Each aggregation over every value column.
    List(Vec<AggOp<'a>>),
    /// Aggregations per column, in the order given.
    PerColumn(Vec<(String, Vec<AggOp<'a>>)>),
}

impl<'a> From<AggOp<'a>> for AggregateFunc<'a> {
    fn from(op: AggOp<'a>) -> Self {
        AggregateFunc::One(op)
    }
}

impl From<&str> for AggregateFunc<'_> {
    fn from(name: &str) -> Self {
        AggregateFunc::One(AggOp::from(name))
    }
}

impl<'a> From<Vec<AggOp<'a>>> for AggregateFunc<'a> {
    fn from(ops: Vec<AggOp<'a>>) -> Self {
        AggregateFunc::List(ops)
    }
}

type AggregatePlan<'f, 'a> = Vec<(String, Vec<(String, &'f AggOp<'a>)>)>;

impl<'a> AggregateFunc<'a> {
    /// Normalize to `column -> [(label, op)]`. Labels are computed once
    /// per op, so a shared op keeps one label across columns.
    fn plan<'f>(&'f self, frame: &TdsFrame, value_columns: &[String]) -> FrameResult<AggregatePlan<'f, 'a>> {
        let mut lambdas = 0;
        let mut label = |op: &AggOp<'_>| match op {
            AggOp::Named(name) | AggOp::Function { name: Some(name), .. } => name.clone(),
            AggOp::Function { name: None, .. } => {
                lambdas += 1;
                format!("lambda_{lambdas}")
            }
        };

        match self {
            AggregateFunc::One(op) => {
                let labelled = vec![(label(op), op)];
                Ok(value_columns
                    .iter()
                    .map(|c| (c.clone(), labelled.clone()))
                    .collect())
            }
            AggregateFunc::List(ops) => {
                if ops.is_empty() {
                    return Err(FrameError::validation(
                        "Invalid `func` argument for the aggregate function.\n\
                         The list of aggregations should not be empty.",
                    ));
                }
                let labelled: Vec<_> = ops.iter().map(|op| (label(op), op)).collect();
                Ok(value_columns
                    .iter()
                    .map(|c| (c.clone(), labelled.clone()))
                    .collect())
            }
            AggregateFunc::PerColumn(entries) => {
                let mut plan = Vec::with_capacity(entries.len());
                for (column, ops) in entries {
                    if frame.column(column).is_none() {
                        let mut available = frame.column_names();
                        available.sort();
                        return Err(FrameError::validation(format!(
                            "Invalid `func` argument for the aggregate function.\n\
                             When a dictionary is provided, all keys must be column names.\n\
                             Available columns are: {}\n\
                             But got key: '{}'",
                            name_list(&available),
                            column
                        )));
                    }
                    if ops.is_empty() {
                        return Err(FrameError::validation(format!(
                            "Invalid `func` argument for the aggregate function.\n\
                             The list of aggregations for column '{column}' should not be empty."
                        )));
                    }
                    plan.push((column.clone(), ops.iter().map(|op| (label(op), op)).collect()));
                }
                Ok(plan)
            }
        }
    }
}

/// Group `base` by `keys` and aggregate `value_columns` per `func`.
/// Output columns are named `label(column)`.
fn aggregate_over(
    base: &TdsFrame,
    keys: Vec<String>,
    value_columns: &[String],
    func: &AggregateFunc<'_>,
) -> FrameResult<TdsFrame> {
    let plan = func.plan(base, value_columns)?;
    let row = base.row(ROW_VAR);
    let mut aggregates = Vec::new();
    for (column, ops) in plan {
        let map = row.get_any(&column)?;
        for (label, op) in ops {
            let index = aggregates.len();
            let aggregate = bind("aggregate", "func", index, op.apply(&map))?;
            aggregates.push(BoundColumn {
                name: format!("{label}({column})"),
                map: map.clone(),
                aggregate: Some(aggregate),
            });
        }
    }
    base.grouped(keys, aggregates)
}

// =============================================================================
// GroupByFrame
// =============================================================================

/// The result of [`TdsFrame::groupby`]: a grouping waiting for an
/// aggregation, rank or shift to close it.
#[derive(Debug, Clone)]
pub struct GroupByFrame {
    base: TdsFrame,
    keys: Vec<String>,
    selected: Option<Vec<String>>,
    sort: bool,
}

impl TdsFrame {
    /// Start a pandas-style grouping on `by`.
    pub fn groupby<S: AsRef<str>>(&self, by: &[S]) -> FrameResult<GroupByFrame> {
        if by.is_empty() {
            return Err(FrameError::validation(
                "The 'by' parameter in groupby function must contain at least one column name.",
            ));
        }
        let keys: Vec<String> = by.iter().map(|k| k.as_ref().to_string()).collect();
        let missing: Vec<&String> = keys.iter().filter(|k| self.column(k).is_none()).collect();
        if !missing.is_empty() {
            let mut available = self.column_names();
            available.sort();
            return Err(FrameError::schema(format!(
                "Column(s) {} in groupby function's provided columns list do not exist in the \
                 current frame. Current frame columns: {}",
                name_list(&missing),
                name_list(&available)
            )));
        }
        ensure_distinct_names(&keys, "Grouping columns list has duplicates")?;
        Ok(GroupByFrame {
            base: self.clone(),
            keys,
            selected: None,
            sort: true,
        })
    }
}

impl GroupByFrame {
    pub fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    pub fn grouping_columns(&self) -> &[String] {
        &self.keys
    }

    pub fn selected_columns(&self) -> Option<&[String]> {
        self.selected.as_deref()
    }

    /// Whether aggregated results are sorted by the grouping keys
    /// (the default).
    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Restrict the columns the closing operation applies to.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> FrameResult<GroupByFrame> {
        if columns.is_empty() {
            return Err(FrameError::validation(
                "When performing column selection after groupby, at least one column must be selected.",
            ));
        }
        let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let missing: Vec<&String> = names.iter().filter(|c| self.base.column(c).is_none()).collect();
        if !missing.is_empty() {
            let mut available = self.base.column_names();
            available.sort();
            return Err(FrameError::schema(format!(
                "Column(s) {} selected after groupby do not exist in the current frame. \
                 Current frame columns: {}",
                name_list(&missing),
                name_list(&available)
            )));
        }
        // Frame order, not selection order.
        let selected = self
            .base
            .column_names()
            .into_iter()
            .filter(|c| names.contains(c))
            .collect();
        Ok(GroupByFrame {
            selected: Some(selected),
            ..self.clone()
        })
    }

    /// The selected columns, or every non-key column.
    pub fn value_columns(&self) -> Vec<String> {
        match &self.selected {
            Some(selected) => selected.clone(),
            None => self
                .base
                .column_names()
                .into_iter()
                .filter(|c| !self.keys.contains(c))
                .collect(),
        }
    }

    /// Aggregate the value columns per group: the keys first, then one
    /// `label(column)` column per aggregation.
    pub fn aggregate<'a>(&self, func: impl Into<AggregateFunc<'a>>) -> FrameResult<TdsFrame> {
        let frame = aggregate_over(&self.base, self.keys.clone(), &self.value_columns(), &func.into())?;
        if self.sort {
            frame.sort_by(self.keys.iter().map(SortInfo::asc).collect())
        } else {
            Ok(frame)
        }
    }

    pub fn sum(&self) -> FrameResult<TdsFrame> {
        self.aggregate("sum")
    }

    pub fn mean(&self) -> FrameResult<TdsFrame> {
        self.aggregate("mean")
    }

    pub fn min(&self) -> FrameResult<TdsFrame> {
        self.aggregate("min")
    }

    pub fn max(&self) -> FrameResult<TdsFrame> {
        self.aggregate("max")
    }

    pub fn count(&self) -> FrameResult<TdsFrame> {
        self.aggregate("count")
    }

    /// Sample standard deviation.
    pub fn std(&self) -> FrameResult<TdsFrame> {
        self.aggregate("std")
    }

    /// Sample variance.
    pub fn var(&self) -> FrameResult<TdsFrame> {
        self.aggregate("var")
    }
}
