//! Null handling: `fillna` and `dropna`.

use std::str::FromStr;

use super::extend::Project;
use super::{BoundColumn, TdsFrame, ROW_VAR};
use crate::error::{FrameError, FrameResult};
use crate::expr::Expr;
use crate::tds::name_list;

/// Replacement for nulls: one value for every column of a compatible
/// type, or a value per named column.
#[derive(Debug, Clone)]
pub enum FillValue {
    All(Expr),
    PerColumn(Vec<(String, Expr)>),
}

macro_rules! fill_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FillValue {
                fn from(value: $t) -> Self {
                    FillValue::All(value.into())
                }
            }
        )*
    };
}

fill_value_from!(Expr, i64, i32, f64, bool, &str, String);

impl FillValue {
    pub fn per_column<S, V>(values: impl IntoIterator<Item = (S, V)>) -> Self
    where
        S: Into<String>,
        V: Into<Expr>,
    {
        FillValue::PerColumn(
            values
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Which rows `dropna` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropNaHow {
    /// Rows with a null in any of the columns.
    #[default]
    Any,
    /// Rows whose columns are all null.
    All,
}

impl FromStr for DropNaHow {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(DropNaHow::Any),
            "all" => Ok(DropNaHow::All),
            _ => Err(FrameError::validation(format!(
                "invalid how option: {s}. Must be one of ['any', 'all']"
            ))),
        }
    }
}

impl TdsFrame {
    /// Replace nulls. With a single value, only columns whose type family
    /// matches the value are filled; a per-column value must match its
    /// column.
    pub fn fillna(&self, value: impl Into<FillValue>) -> FrameResult<TdsFrame> {
        let fills: Vec<(String, Expr)> = match value.into() {
            FillValue::All(value) => self
                .columns()
                .iter()
                .filter(|c| {
                    c.primitive_type()
                        .is_some_and(|ty| ty.family() == value.ty().family())
                })
                .map(|c| (c.name().to_string(), value.clone()))
                .collect(),
            FillValue::PerColumn(values) => {
                let names: Vec<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
                self.require_columns(&names, "fillna value mapping")?;
                values
            }
        };

        let row = self.row(ROW_VAR);
        let columns = self
            .column_names()
            .into_iter()
            .map(|name| {
                let current = row.get_any(&name)?;
                let map = match fills.iter().find(|(n, _)| *n == name) {
                    Some((_, fill)) => {
                        if current.ty().family() != fill.ty().family() {
                            return Err(FrameError::type_error(format!(
                                "Invalid fill value for column '{}' of type {}. Got value {} of type: {}",
                                name,
                                current.ty(),
                                fill.pure_text(),
                                fill.ty()
                            )));
                        }
                        Expr::if_else(current.is_not_null(), &current, fill)?
                    }
                    None => current,
                };
                Ok(BoundColumn {
                    name,
                    map,
                    aggregate: None,
                })
            })
            .collect::<FrameResult<Vec<_>>>()?;
        TdsFrame::applied(Project::new(self.clone(), columns))
    }

    /// Remove rows with nulls in `subset` (every column when `None`).
    pub fn dropna<S: AsRef<str>>(&self, subset: Option<&[S]>, how: DropNaHow) -> FrameResult<TdsFrame> {
        let names: Vec<String> = match subset {
            Some(subset) => {
                self.require_columns(subset, "dropna subset list")?;
                subset.iter().map(|s| s.as_ref().to_string()).collect()
            }
            None => self.column_names(),
        };
        if names.is_empty() {
            return match how {
                DropNaHow::Any => Ok(self.clone()),
                DropNaHow::All => self.filter(|_| Ok(Expr::from(false))),
            };
        }
        self.filter(|r| {
            let mut checks = names
                .iter()
                .map(|n| Ok(r.get_any(n)?.is_not_null()))
                .collect::<FrameResult<Vec<_>>>()?
                .into_iter();
            let first = checks.next().ok_or_else(|| {
                FrameError::validation(format!("dropna subset is empty: {}", name_list(&names)))
            })?;
            checks.try_fold(first, |acc, check| match how {
                DropNaHow::Any => acc.and(check),
                DropNaHow::All => acc.or(check),
            })
        })
    }
}
