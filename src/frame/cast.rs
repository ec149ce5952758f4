//! `cast`: change the declared type of columns.

use super::compose::{prepare, Operation};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::FrameResult;
use crate::pure::escape_column_name;
use crate::sql::QuerySpecification;
use crate::tds::{validate_and_build_cast_columns, CastTarget, TdsColumn};

#[derive(Debug)]
struct Cast {
    base: TdsFrame,
    casts: Vec<(String, CastTarget)>,
}

impl Cast {
    fn target(&self, name: &str) -> Option<&CastTarget> {
        self.casts.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

impl AppliedFunction for Cast {
    fn name(&self) -> &'static str {
        "cast"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        validate_and_build_cast_columns(self.base.columns(), &self.casts)
    }

    /// Casts rewrite the select items. A distinct or grouped base is
    /// nested first so the cast applies to its finished rows.
    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = prepare(self.base.to_sql_spec()?, Operation::Cast);
        for item in &mut spec.select.items {
            if let Some(target) = self.target(&item.alias) {
                item.expression = item.expression.clone().cast(target.clone());
            }
        }
        Ok(spec)
    }

    /// `->cast(@meta::pure::metamodel::relation::Relation<(a:Integer, ...)>)`
    /// listing every column with its resulting type.
    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let columns: Vec<String> = self
            .base
            .columns()
            .iter()
            .map(|c| {
                let ty = match self.target(c.name()) {
                    Some(target) => target.pure_spec(),
                    None => c.column_type().to_string(),
                };
                format!("{}:{}", escape_column_name(c.name()), ty)
            })
            .collect();
        format!(
            "{}{}->cast(@meta::pure::metamodel::relation::Relation<({})>)",
            self.base.to_pure(config),
            config.separator(1),
            columns.join(", ")
        )
    }
}

impl TdsFrame {
    /// Cast columns to new primitive types; other columns pass through.
    ///
    /// Casts are checked against the cast matrix: numeric to numeric or
    /// string, and within the string and date families.
    pub fn cast<S, T>(&self, casts: &[(S, T)]) -> FrameResult<TdsFrame>
    where
        S: AsRef<str>,
        T: Clone + Into<CastTarget>,
    {
        let casts: Vec<(String, CastTarget)> = casts
            .iter()
            .map(|(name, target)| (name.as_ref().to_string(), target.clone().into()))
            .collect();
        TdsFrame::applied(Cast {
            base: self.clone(),
            casts,
        })
    }
}
