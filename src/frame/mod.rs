//! The frame DAG.
//!
//! A [`TdsFrame`] is an immutable handle on one node of a directed acyclic
//! graph. Leaves are [`InputFrame`]s; every other node is an applied
//! function wrapping the frame(s) it was built from. Each transformation
//! returns a new frame, so a base frame can be shared by any number of
//! downstream frames.
//!
//! ```text
//!   TdsFrame::table(["db", "t"], cols)       (InputFrame)
//!        │
//!        ├──▶ .filter(|r| ...)               (Filter)
//!        │        │
//!        │        └──▶ .head(10)             (Limit)
//!        │
//!        └──▶ .extend(vec![...])             (Extend)
//! ```
//!
//! User closures are evaluated once, when the frame is built, against a
//! [`TdsRow`] of the base frame. The resulting expression trees are kept
//! by the applied function and lowered on demand to SQL or Pure.

mod cast;
mod columns;
mod compose;
mod concatenate;
mod distinct;
mod extend;
mod filter;
mod group_by;
mod group_window;
mod head;
mod input;
mod join;
mod nulls;
mod sort;
mod window_extend;

pub use columns::{Axis, ColumnFilter};
pub use compose::ROOT_ALIAS;
pub use group_by::{AggOp, AggregateFunc, AggregateSpec, GroupByFrame};
pub use group_window::RankMethod;
pub use input::InputFrame;
pub use join::JoinKind;
pub use nulls::{DropNaHow, FillValue};
pub use sort::SortKey;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{FrameToPureConfig, FrameToSqlConfig};
use crate::error::{FrameError, FrameResult};
use crate::expr::{Collection, Expr, PartialFrame, WindowRef};
use crate::sql::{to_sql_string, QuerySpecification};
use crate::tds::{column_names, ensure_unique_names, name_list, TdsColumn, TdsRow};

/// Row alias bound to the base frame in single-frame lambdas.
pub(crate) const ROW_VAR: &str = "r";

// =============================================================================
// Applied Functions
// =============================================================================

/// An operation applied to one base frame (and, for joins and unions, to
/// further frame parameters).
pub(crate) trait AppliedFunction: fmt::Debug + Send + Sync {
    /// Operation name, used in logs and error messages.
    fn name(&self) -> &'static str;

    fn base_frame(&self) -> &TdsFrame;

    /// Frames other than the base that feed this operation.
    fn tds_frame_parameters(&self) -> Vec<&TdsFrame> {
        Vec::new()
    }

    /// Output schema. Called exactly once, when the frame is built.
    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>>;

    fn to_sql(&self) -> FrameResult<QuerySpecification>;

    fn to_pure(&self, config: &FrameToPureConfig) -> String;
}

#[derive(Debug)]
enum FrameNode {
    Input(InputFrame),
    Applied {
        function: Box<dyn AppliedFunction>,
        columns: Vec<TdsColumn>,
    },
}

// =============================================================================
// TdsFrame
// =============================================================================

/// A typed tabular data set: an ordered schema plus the recipe that
/// produces its rows.
#[derive(Debug, Clone)]
pub struct TdsFrame {
    node: Arc<FrameNode>,
}

impl TdsFrame {
    pub(crate) fn from_input(input: InputFrame) -> FrameResult<Self> {
        ensure_unique_names(input.columns())?;
        Ok(Self {
            node: Arc::new(FrameNode::Input(input)),
        })
    }

    pub(crate) fn applied(function: impl AppliedFunction + 'static) -> FrameResult<Self> {
        let columns = function.calculate_columns()?;
        ensure_unique_names(&columns)?;
        debug!(
            function = function.name(),
            columns = columns.len(),
            "applied function to frame"
        );
        Ok(Self {
            node: Arc::new(FrameNode::Applied {
                function: Box::new(function),
                columns,
            }),
        })
    }

    /// The frame's columns, in order.
    pub fn columns(&self) -> &[TdsColumn] {
        match self.node.as_ref() {
            FrameNode::Input(input) => input.columns(),
            FrameNode::Applied { columns, .. } => columns,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(self.columns())
    }

    /// Whether both handles point at the same DAG node.
    pub fn ptr_eq(&self, other: &TdsFrame) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn row(&self, alias: &str) -> TdsRow {
        TdsRow::new(alias, self.columns())
    }

    pub(crate) fn column(&self, name: &str) -> Option<&TdsColumn> {
        self.columns().iter().find(|c| c.name() == name)
    }

    /// Fail with `"Column - 'x' in <context> doesn't exist in the current frame..."`
    /// unless every name is a column of this frame.
    pub(crate) fn require_columns<S: AsRef<str>>(&self, names: &[S], context: &str) -> FrameResult<()> {
        for name in names {
            let name = name.as_ref();
            if self.column(name).is_none() {
                return Err(FrameError::validation(format!(
                    "Column - '{}' in {} doesn't exist in the current frame. Current frame columns: {}",
                    name,
                    context,
                    name_list(&self.column_names())
                )));
            }
        }
        Ok(())
    }

    /// The query specification for this frame.
    pub(crate) fn to_sql_spec(&self) -> FrameResult<QuerySpecification> {
        match self.node.as_ref() {
            FrameNode::Input(input) => input.to_sql(),
            FrameNode::Applied { function, .. } => function.to_sql(),
        }
    }

    pub(crate) fn to_pure(&self, config: &FrameToPureConfig) -> String {
        match self.node.as_ref() {
            FrameNode::Input(input) => input.to_pure(config),
            FrameNode::Applied { function, .. } => function.to_pure(config),
        }
    }

    /// Render the frame as SQL text.
    pub fn to_sql_query(&self, config: &FrameToSqlConfig) -> FrameResult<String> {
        debug!(
            dialect = %config.dialect,
            depth = self.depth(),
            "generating sql"
        );
        to_sql_string(&self.to_sql_spec()?, config)
    }

    /// Render the frame as a Pure query.
    pub fn to_pure_query(&self, config: &FrameToPureConfig) -> String {
        debug!(depth = self.depth(), pretty = config.pretty, "generating pure");
        self.to_pure(config)
    }

    /// Every input frame reachable from this frame, depth first, base
    /// before parameters.
    pub fn input_frames(&self) -> Vec<&InputFrame> {
        let mut inputs = Vec::new();
        self.collect_inputs(&mut inputs);
        inputs
    }

    fn collect_inputs<'a>(&'a self, out: &mut Vec<&'a InputFrame>) {
        match self.node.as_ref() {
            FrameNode::Input(input) => out.push(input),
            FrameNode::Applied { function, .. } => {
                function.base_frame().collect_inputs(out);
                for param in function.tds_frame_parameters() {
                    param.collect_inputs(out);
                }
            }
        }
    }

    /// Length of the longest path to an input frame.
    pub fn depth(&self) -> usize {
        match self.node.as_ref() {
            FrameNode::Input(_) => 0,
            FrameNode::Applied { function, .. } => {
                let base = function.base_frame().depth();
                let params = function
                    .tds_frame_parameters()
                    .iter()
                    .map(|f| f.depth())
                    .max()
                    .unwrap_or(0);
                1 + base.max(params)
            }
        }
    }
}

// =============================================================================
// Lambda Specifications
// =============================================================================

type RowFn<'a> = Box<dyn Fn(&TdsRow) -> FrameResult<Expr> + 'a>;
type CollectionFn<'a> = Box<dyn Fn(&Collection) -> FrameResult<Expr> + 'a>;
type WindowRowFn<'a> = Box<dyn Fn(&PartialFrame, &WindowRef, &TdsRow) -> FrameResult<Expr> + 'a>;

/// Re-wrap a failure from a user lambda with its position.
pub(crate) fn bind<T>(
    function: &str,
    argument: &str,
    index: usize,
    result: FrameResult<T>,
) -> FrameResult<T> {
    result.map_err(|e| FrameError::binding(function, argument, index, &e))
}

/// A new column computed from each row: `name: {r | expr}`.
pub struct ColumnSpec<'a> {
    name: String,
    map: RowFn<'a>,
    aggregate: Option<CollectionFn<'a>>,
}

impl<'a> ColumnSpec<'a> {
    pub fn new(
        name: impl Into<String>,
        map: impl Fn(&TdsRow) -> FrameResult<Expr> + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            map: Box::new(map),
            aggregate: None,
        }
    }

    /// A column holding an aggregate of `map` over the whole frame:
    /// `name: {r | map}: {c | aggregate}`.
    pub fn aggregated(
        name: impl Into<String>,
        map: impl Fn(&TdsRow) -> FrameResult<Expr> + 'a,
        aggregate: impl Fn(&Collection) -> FrameResult<Expr> + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            map: Box::new(map),
            aggregate: Some(Box::new(aggregate)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ColumnSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("aggregated", &self.aggregate.is_some())
            .finish()
    }
}

/// A window column: `name: {p,w,r | expr}` with an optional aggregate.
pub struct WindowColumnSpec<'a> {
    name: String,
    map: WindowRowFn<'a>,
    aggregate: Option<CollectionFn<'a>>,
}

impl<'a> WindowColumnSpec<'a> {
    pub fn new(
        name: impl Into<String>,
        map: impl Fn(&PartialFrame, &WindowRef, &TdsRow) -> FrameResult<Expr> + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            map: Box::new(map),
            aggregate: None,
        }
    }

    pub fn aggregated(
        name: impl Into<String>,
        map: impl Fn(&PartialFrame, &WindowRef, &TdsRow) -> FrameResult<Expr> + 'a,
        aggregate: impl Fn(&Collection) -> FrameResult<Expr> + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            map: Box::new(map),
            aggregate: Some(Box::new(aggregate)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for WindowColumnSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowColumnSpec")
            .field("name", &self.name)
            .field("aggregated", &self.aggregate.is_some())
            .finish()
    }
}

/// A column spec after its lambdas have been evaluated.
///
/// For aggregated columns `aggregate` is the full tree (its operand is
/// the mapped expression) and `map` is kept for the Pure rendering.
#[derive(Debug, Clone)]
pub(crate) struct BoundColumn {
    pub name: String,
    pub map: Expr,
    pub aggregate: Option<Expr>,
}

impl BoundColumn {
    /// The expression that produces the column's values.
    pub fn value(&self) -> &Expr {
        self.aggregate.as_ref().unwrap_or(&self.map)
    }

    pub fn tds_column(&self) -> TdsColumn {
        TdsColumn::primitive(self.name.clone(), self.value().ty())
    }

    /// `name:{params | map}` or `name:{params | map}:{c | aggregate}`.
    pub fn to_pure(&self, params: &str, config: &FrameToPureConfig) -> String {
        let map = crate::pure::lambda(params, &self.map.to_pure(config));
        let name = crate::pure::escape_column_name(&self.name);
        match &self.aggregate {
            None => format!("{name}:{map}"),
            Some(agg) => format!(
                "{name}:{map}:{}",
                crate::pure::lambda(crate::expr::COLLECTION_VAR, &agg.to_pure(config))
            ),
        }
    }
}

/// Evaluate an aggregate lambda over the collection produced by `map`.
pub(crate) fn bind_aggregate(
    map: &Expr,
    aggregate: &dyn Fn(&Collection) -> FrameResult<Expr>,
) -> FrameResult<Expr> {
    let agg = aggregate(&Collection::new(map.clone()))?;
    if !agg.contains_aggregate() {
        return Err(FrameError::type_error(format!(
            "Aggregate lambda should return an aggregate over the collection. Got - {}",
            agg.pure_text()
        )));
    }
    Ok(agg)
}

impl ColumnSpec<'_> {
    pub(crate) fn bind(
        &self,
        row: &TdsRow,
        function: &str,
        argument: &str,
        index: usize,
    ) -> FrameResult<BoundColumn> {
        bind(function, argument, index, (|| -> FrameResult<BoundColumn> {
            let map = (self.map)(row)?;
            let aggregate = match &self.aggregate {
                Some(agg) => Some(bind_aggregate(&map, agg.as_ref())?),
                None => None,
            };
            Ok(BoundColumn {
                name: self.name.clone(),
                map,
                aggregate,
            })
        })())
    }
}

impl WindowColumnSpec<'_> {
    pub(crate) fn bind(&self, row: &TdsRow, index: usize) -> FrameResult<BoundColumn> {
        bind("window_extend", "window_columns", index, (|| -> FrameResult<BoundColumn> {
            let map = (self.map)(&PartialFrame, &WindowRef, row)?;
            let aggregate = match &self.aggregate {
                Some(agg) => Some(bind_aggregate(&map, agg.as_ref())?),
                None => None,
            };
            Ok(BoundColumn {
                name: self.name.clone(),
                map,
                aggregate,
            })
        })())
    }
}

/// Reject a list of new column names that repeats a name.
pub(crate) fn ensure_distinct_names(names: &[String], message: &str) -> FrameResult<()> {
    let mut seen = std::collections::HashSet::new();
    if names.iter().all(|n| seen.insert(n.as_str())) {
        Ok(())
    } else {
        Err(FrameError::validation(format!("{}: {}", message, name_list(names))))
    }
}

/// `"->extend(~a:{..})"` for one column, the bracketed list form for more.
pub(crate) fn pure_column_list(items: &[String], config: &FrameToPureConfig) -> String {
    if items.len() == 1 {
        format!("~{}", items[0])
    } else {
        format!(
            "~[{}{}{}]",
            config.separator(2),
            items.join(&format!(",{}", config.separator_or_space(2))),
            config.separator(1)
        )
    }
}
