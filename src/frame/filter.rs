//! `filter`.

use super::compose::{prepare, Operation};
use super::{bind, AppliedFunction, TdsFrame, ROW_VAR};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::expr::{Expr, SqlContext};
use crate::pure::lambda;
use crate::sql::QuerySpecification;
use crate::tds::{TdsColumn, TdsRow};

#[derive(Debug)]
struct Filter {
    base: TdsFrame,
    predicate: Expr,
}

impl AppliedFunction for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self.base.columns().to_vec())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = prepare(self.base.to_sql_spec()?, Operation::Filter);
        let predicate = self.predicate.to_sql(&SqlContext::new(ROW_VAR, &spec))?;
        spec.add_where(predicate);
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        format!(
            "{}{}->filter({})",
            self.base.to_pure(config),
            config.separator(1),
            lambda(ROW_VAR, &self.predicate.to_pure(config))
        )
    }
}

impl TdsFrame {
    /// Keep the rows for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> FrameResult<TdsFrame>
    where
        F: FnOnce(&TdsRow) -> FrameResult<Expr>,
    {
        let row = self.row(ROW_VAR);
        let predicate = bind("filter", "filter_function", 0, predicate(&row))?;
        if !predicate.ty().is_boolean() {
            return Err(FrameError::type_error(format!(
                "Filter function incompatible. Returns non boolean - {}",
                predicate.ty()
            )));
        }
        TdsFrame::applied(Filter {
            base: self.clone(),
            predicate,
        })
    }
}
