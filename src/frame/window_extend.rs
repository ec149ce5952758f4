//! `window_extend`: columns computed over a window.

use super::compose::{prepare, Operation};
use super::{ensure_distinct_names, pure_column_list, AppliedFunction, BoundColumn, TdsFrame, WindowColumnSpec, ROW_VAR};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{SqlContext, Window, PARTIAL_FRAME_VAR, WINDOW_VAR};
use crate::sql::{QuerySpecification, SingleColumn};
use crate::tds::TdsColumn;

#[derive(Debug)]
struct WindowExtend {
    base: TdsFrame,
    window: Window,
    columns: Vec<BoundColumn>,
}

fn lambda_params() -> String {
    format!("{PARTIAL_FRAME_VAR},{WINDOW_VAR},{ROW_VAR}")
}

impl AppliedFunction for WindowExtend {
    fn name(&self) -> &'static str {
        "window_extend"
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
        let mut spec = prepare(self.base.to_sql_spec()?, Operation::WindowExtend);
        let window = self.window.to_sql(&spec)?;
        let items = self
            .columns
            .iter()
            .map(|c| {
                let ctx = SqlContext::new(ROW_VAR, &spec).with_window(&window);
                Ok(SingleColumn::new(c.name.clone(), c.value().to_sql(&ctx)?))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        spec.select.items.extend(items);
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let base = self.base.to_pure(config);
        let window = self.window.to_pure(config);
        let params = lambda_params();
        let rendered: Vec<String> = self.columns.iter().map(|c| c.to_pure(&params, config)).collect();
        let uniform = self.columns.iter().all(|c| c.aggregate.is_some())
            || self.columns.iter().all(|c| c.aggregate.is_none());
        if uniform {
            format!(
                "{}{}->extend({}, {})",
                base,
                config.separator(1),
                window,
                pure_column_list(&rendered, config)
            )
        } else {
            rendered.iter().fold(base, |acc, c| {
                format!("{}{}->extend({}, ~{})", acc, config.separator(1), window, c)
            })
        }
    }
}

impl TdsFrame {
    /// Append columns computed over `window`.
    ///
    /// Each lambda receives the partial frame `p` (row-valued window
    /// functions), the window `w` and the current row `r`.
    pub fn window_extend(
        &self,
        window: Window,
        columns: Vec<WindowColumnSpec<'_>>,
    ) -> FrameResult<TdsFrame> {
        if columns.is_empty() {
            return Err(FrameError::validation(
                "'window_extend' function window_columns argument should not be empty",
            ));
        }
        let referenced: Vec<&str> = window.referenced_columns().collect();
        self.require_columns(&referenced, "window specification")?;

        let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        ensure_distinct_names(&names, "Extend column names list has duplicates")?;
        if let Some(existing) = names.iter().find(|n| self.column(n).is_some()) {
            return Err(FrameError::validation(format!(
                "Extend column name - '{existing}' already exists in base frame"
            )));
        }

        let row = self.row(ROW_VAR);
        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.bind(&row, i))
            .collect::<FrameResult<Vec<_>>>()?;
        TdsFrame::applied(WindowExtend {
            base: self.clone(),
            window,
            columns,
        })
    }
}
