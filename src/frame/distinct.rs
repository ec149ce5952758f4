//! `distinct`.

use super::compose::{create_sub_query, prepare, Operation, ROOT_ALIAS};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::FrameResult;
use crate::pure::escape_column_name;
use crate::sql::QuerySpecification;
use crate::tds::TdsColumn;

#[derive(Debug)]
struct Distinct {
    base: TdsFrame,
    /// Restrict the output to these columns first.
    columns: Option<Vec<String>>,
}

impl AppliedFunction for Distinct {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        match &self.columns {
            None => Ok(self.base.columns().to_vec()),
            Some(names) => {
                self.base.require_columns(names, "distinct columns list")?;
                Ok(names
                    .iter()
                    .filter_map(|n| self.base.column(n).cloned())
                    .collect())
            }
        }
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let base = self.base.to_sql_spec()?;
        let mut spec = match &self.columns {
            None => prepare(base, Operation::Distinct),
            Some(names) => create_sub_query(base, ROOT_ALIAS, Some(names)),
        };
        spec.select.distinct = true;
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let select = match &self.columns {
            None => String::new(),
            Some(names) => {
                let cols: Vec<String> = names.iter().map(|n| escape_column_name(n)).collect();
                format!("->select(~[{}])", cols.join(", "))
            }
        };
        format!(
            "{}{}{}->distinct()",
            self.base.to_pure(config),
            config.separator(1),
            select
        )
    }
}

impl TdsFrame {
    /// Drop duplicate rows.
    pub fn distinct(&self) -> FrameResult<TdsFrame> {
        TdsFrame::applied(Distinct {
            base: self.clone(),
            columns: None,
        })
    }

    /// The distinct combinations of `columns`.
    pub fn distinct_columns<S: AsRef<str>>(&self, columns: &[S]) -> FrameResult<TdsFrame> {
        TdsFrame::applied(Distinct {
            base: self.clone(),
            columns: Some(columns.iter().map(|c| c.as_ref().to_string()).collect()),
        })
    }
}
