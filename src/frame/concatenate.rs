//! `concatenate`: the rows of two frames with matching schemas, as a
//! `UNION ALL`.

use super::compose::{project_all, ROOT_ALIAS};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::sql::{QuerySpecification, Relation};
use crate::tds::{ColumnType, PrimitiveType, TdsColumn, TypeFamily};

#[derive(Debug)]
struct Concatenate {
    base: TdsFrame,
    other: TdsFrame,
    columns: Vec<TdsColumn>,
}

impl AppliedFunction for Concatenate {
    fn name(&self) -> &'static str {
        "concatenate"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn tds_frame_parameters(&self) -> Vec<&TdsFrame> {
        vec![&self.other]
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self.columns.clone())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let union = Relation::Union {
            left: Box::new(self.base.to_sql_spec()?),
            right: Box::new(self.other.to_sql_spec()?),
        };
        Ok(QuerySpecification::select_from(
            project_all(ROOT_ALIAS, &self.base.column_names()),
            union.aliased(ROOT_ALIAS),
        ))
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        format!(
            "{}{}->concatenate({}{}{})",
            self.base.to_pure(config),
            config.separator(1),
            config.separator(2),
            self.other.to_pure(&config.push_indent(2)),
            config.separator(1)
        )
    }
}

/// The column both sides agree on, or `None` on a name or type mismatch.
/// Numeric columns of different types widen to their common supertype.
fn unify(left: &TdsColumn, right: &TdsColumn) -> Option<TdsColumn> {
    if left.name() != right.name() {
        return None;
    }
    if left.column_type() == right.column_type() {
        return Some(left.clone());
    }
    match (left.column_type(), right.column_type()) {
        (ColumnType::Primitive(l), ColumnType::Primitive(r))
            if l.family() == TypeFamily::Numeric && r.family() == TypeFamily::Numeric =>
        {
            Some(TdsColumn::primitive(left.name(), PrimitiveType::numeric_join(*l, *r)))
        }
        _ => None,
    }
}

impl TdsFrame {
    /// Append the rows of `other`. Both frames must have the same column
    /// names in the same order, with compatible types.
    pub fn concatenate(&self, other: &TdsFrame) -> FrameResult<TdsFrame> {
        let left = self.columns();
        let right = other.columns();
        if left.len() != right.len() {
            let render = |cols: &[TdsColumn]| {
                let rendered: Vec<String> = cols.iter().map(TdsColumn::to_string).collect();
                format!("(Count: {}) - [{}]", cols.len(), rendered.join(", "))
            };
            return Err(FrameError::schema(format!(
                "Cannot concatenate two Tds Frames with different column counts. \n\
                 Frame 1 cols - {} \n\
                 Frame 2 cols - {} \n",
                render(left),
                render(right)
            )));
        }
        let columns = left
            .iter()
            .zip(right)
            .enumerate()
            .map(|(i, (l, r))| {
                unify(l, r).ok_or_else(|| {
                    FrameError::schema(format!(
                        "Column name/type mismatch when concatenating Tds Frames at index {i}. \
                         Frame 1 column - {l}, Frame 2 column - {r}"
                    ))
                })
            })
            .collect::<FrameResult<Vec<_>>>()?;
        TdsFrame::applied(Concatenate {
            base: self.clone(),
            other: other.clone(),
            columns,
        })
    }
}
