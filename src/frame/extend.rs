//! Computed columns: `extend`, `project` and `assign`.

use super::compose::{create_sub_query, prepare, Operation, ROOT_ALIAS};
use super::{
    ensure_distinct_names, pure_column_list, AppliedFunction, BoundColumn, ColumnSpec, TdsFrame,
    ROW_VAR,
};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::SqlContext;
use crate::sql::{self, QuerySpecification, SingleColumn};
use crate::tds::TdsColumn;

/// Lower `column` against the row alias bound to `spec`. Aggregated
/// columns run over the whole frame: `SUM(x) OVER ()`.
fn column_sql(column: &BoundColumn, spec: &QuerySpecification) -> FrameResult<SingleColumn> {
    let whole_frame = sql::Window::default();
    let ctx = SqlContext::new(ROW_VAR, spec);
    let ctx = if column.aggregate.is_some() {
        ctx.with_window(&whole_frame)
    } else {
        ctx
    };
    Ok(SingleColumn::new(
        column.name.clone(),
        column.value().to_sql(&ctx)?,
    ))
}

// =============================================================================
// Extend
// =============================================================================

#[derive(Debug)]
struct Extend {
    base: TdsFrame,
    columns: Vec<BoundColumn>,
}

impl AppliedFunction for Extend {
    fn name(&self) -> &'static str {
        "extend"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        let mut columns = self.base.columns().to_vec();
        columns.extend(self.columns.iter().map(BoundColumn::tds_column));
        Ok(columns)
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        // A whole-frame aggregate must see the rows after any limit.
        let op = if self.columns.iter().any(|c| c.aggregate.is_some()) {
            Operation::Aggregate
        } else {
            Operation::Extend
        };
        let mut spec = prepare(self.base.to_sql_spec()?, op);
        let items = self
            .columns
            .iter()
            .map(|c| column_sql(c, &spec))
            .collect::<FrameResult<Vec<_>>>()?;
        spec.select.items.extend(items);
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let base = self.base.to_pure(config);
        let rendered: Vec<String> = self.columns.iter().map(|c| c.to_pure(ROW_VAR, config)).collect();
        let uniform = self.columns.iter().all(|c| c.aggregate.is_some())
            || self.columns.iter().all(|c| c.aggregate.is_none());
        if uniform {
            format!(
                "{}{}->extend({})",
                base,
                config.separator(1),
                pure_column_list(&rendered, config)
            )
        } else {
            rendered.iter().fold(base, |acc, c| {
                format!("{}{}->extend(~{})", acc, config.separator(1), c)
            })
        }
    }
}

// =============================================================================
// Project
// =============================================================================

/// Replaces the select list with the given columns, evaluated over the
/// base query nested as `"root"`.
#[derive(Debug)]
pub(crate) struct Project {
    base: TdsFrame,
    columns: Vec<BoundColumn>,
}

impl Project {
    pub(crate) fn new(base: TdsFrame, columns: Vec<BoundColumn>) -> Self {
        Self { base, columns }
    }
}

impl AppliedFunction for Project {
    fn name(&self) -> &'static str {
        "project"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        // A bare column keeps its declared type, enumerations included.
        Ok(self
            .columns
            .iter()
            .map(|c| {
                c.map
                    .as_column()
                    .filter(|_| c.aggregate.is_none())
                    .and_then(|col| self.base.column(&col.name))
                    .map(|col| col.renamed(c.name.clone()))
                    .unwrap_or_else(|| c.tds_column())
            })
            .collect())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = create_sub_query(self.base.to_sql_spec()?, ROOT_ALIAS, None);
        let items = self
            .columns
            .iter()
            .map(|c| column_sql(c, &spec))
            .collect::<FrameResult<Vec<_>>>()?;
        spec.select.items = items;
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let rendered: Vec<String> = self.columns.iter().map(|c| c.to_pure(ROW_VAR, config)).collect();
        format!(
            "{}{}->project(~[{}{}{}])",
            self.base.to_pure(config),
            config.separator(1),
            config.separator(2),
            rendered.join(&format!(",{}", config.separator_or_space(2))),
            config.separator(1)
        )
    }
}

// =============================================================================
// Frame Methods
// =============================================================================

impl TdsFrame {
    fn bind_columns(
        &self,
        columns: &[ColumnSpec<'_>],
        function: &str,
        argument: &str,
    ) -> FrameResult<Vec<BoundColumn>> {
        let row = self.row(ROW_VAR);
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.bind(&row, function, argument, i))
            .collect()
    }

    /// Append computed columns. Names must be new to the frame.
    pub fn extend(&self, columns: Vec<ColumnSpec<'_>>) -> FrameResult<TdsFrame> {
        if columns.is_empty() {
            return Err(FrameError::validation(
                "'extend' function extend_columns argument should not be empty",
            ));
        }
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        ensure_distinct_names(&names, "Extend column names list has duplicates")?;
        if let Some(existing) = names.iter().find(|n| self.column(n).is_some()) {
            return Err(FrameError::validation(format!(
                "Extend column name - '{existing}' already exists in base frame"
            )));
        }
        let columns = self.bind_columns(&columns, "extend", "extend_columns")?;
        TdsFrame::applied(Extend {
            base: self.clone(),
            columns,
        })
    }

    /// A frame made of exactly these computed columns.
    pub fn project(&self, columns: Vec<ColumnSpec<'_>>) -> FrameResult<TdsFrame> {
        if columns.is_empty() {
            return Err(FrameError::validation(
                "'project' function project_columns argument should not be empty",
            ));
        }
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        ensure_distinct_names(&names, "Project column names list has duplicates")?;
        let columns = self.bind_columns(&columns, "project", "project_columns")?;
        if let Some(c) = columns.iter().find(|c| c.aggregate.is_some()) {
            return Err(FrameError::validation(format!(
                "Project column '{}' cannot carry an aggregation. Use extend or group_by instead",
                c.name
            )));
        }
        TdsFrame::applied(Project::new(self.clone(), columns))
    }

    /// Set columns the pandas way: an existing name is replaced where it
    /// stands, a new name is appended.
    pub fn assign(&self, columns: Vec<ColumnSpec<'_>>) -> FrameResult<TdsFrame> {
        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        ensure_distinct_names(&names, "Assign column names list has duplicates")?;
        let mut assigned = self.bind_columns(&columns, "assign", "col_definitions")?;
        if let Some(c) = assigned.iter().find(|c| c.aggregate.is_some()) {
            return Err(FrameError::validation(format!(
                "Assign column '{}' cannot carry an aggregation. Use extend or group_by instead",
                c.name
            )));
        }

        let row = self.row(ROW_VAR);
        let mut output = Vec::with_capacity(self.columns().len() + assigned.len());
        for name in self.column_names() {
            match assigned.iter().position(|c| c.name == name) {
                Some(i) => output.push(assigned.remove(i)),
                None => output.push(BoundColumn {
                    map: row.get_any(&name)?,
                    name,
                    aggregate: None,
                }),
            }
        }
        output.extend(assigned);
        TdsFrame::applied(Project::new(self.clone(), output))
    }
}
