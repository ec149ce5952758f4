//! Column selection and renaming: `select`, `filter_columns`, `drop`
//! and `rename`.

use std::str::FromStr;

use regex::Regex;

use super::compose::{create_sub_query, ROOT_ALIAS};
use super::{AppliedFunction, TdsFrame};
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::pure::escape_column_name;
use crate::sql::QuerySpecification;
use crate::tds::{name_list, TdsColumn};

/// Frame axis argument of the pandas-style functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rows (`0` / `"index"`)
    Index,
    /// Columns (`1` / `"columns"`)
    Columns,
}

impl FromStr for Axis {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "index" => Ok(Axis::Index),
            "1" | "columns" => Ok(Axis::Columns),
            other => Err(FrameError::validation(format!(
                "No axis named {other} for object type TdsFrame"
            ))),
        }
    }
}

/// Selects columns by name. The selectors are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Exactly these columns, in this order.
    Items(Vec<String>),
    /// Columns whose name contains the substring.
    Like(String),
    /// Columns whose name matches the regular expression anywhere.
    Regex(String),
}

// =============================================================================
// Select
// =============================================================================

#[derive(Debug)]
struct Select {
    base: TdsFrame,
    columns: Vec<String>,
}

impl AppliedFunction for Select {
    fn name(&self) -> &'static str {
        "select"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        self.base.require_columns(&self.columns, "select columns list")?;
        Ok(self
            .columns
            .iter()
            .filter_map(|c| self.base.column(c).cloned())
            .collect())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let base = self.base.to_sql_spec()?;
        let nest = !base.group_by.is_empty()
            || !base.order_by.is_empty()
            || base.having.is_some()
            || base.select.distinct;
        if nest {
            return Ok(create_sub_query(base, ROOT_ALIAS, Some(&self.columns)));
        }
        let mut spec = base;
        let items = self
            .columns
            .iter()
            .filter_map(|c| spec.select.item(c).cloned())
            .collect();
        spec.select.items = items;
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| escape_column_name(c)).collect();
        format!(
            "{}{}->select(~[{}])",
            self.base.to_pure(config),
            config.separator(1),
            cols.join(", ")
        )
    }
}

// =============================================================================
// Rename
// =============================================================================

#[derive(Debug)]
struct Rename {
    base: TdsFrame,
    renames: Vec<(String, String)>,
}

impl Rename {
    fn target(&self, name: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|(old, _)| old == name)
            .map(|(_, new)| new.as_str())
    }
}

impl AppliedFunction for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn base_frame(&self) -> &TdsFrame {
        &self.base
    }

    fn calculate_columns(&self) -> FrameResult<Vec<TdsColumn>> {
        Ok(self
            .base
            .columns()
            .iter()
            .map(|c| match self.target(c.name()) {
                Some(new) => c.renamed(new),
                None => c.clone(),
            })
            .collect())
    }

    fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let mut spec = self.base.to_sql_spec()?;
        for item in &mut spec.select.items {
            if let Some(new) = self.target(&item.alias) {
                item.alias = new.to_string();
            }
        }
        Ok(spec)
    }

    fn to_pure(&self, config: &FrameToPureConfig) -> String {
        let renames: Vec<String> = self
            .renames
            .iter()
            .map(|(old, new)| {
                format!(
                    "->rename(~{}, ~{})",
                    escape_column_name(old),
                    escape_column_name(new)
                )
            })
            .collect();
        format!(
            "{}{}{}",
            self.base.to_pure(config),
            config.separator(1),
            renames.join(&config.separator(1))
        )
    }
}

// =============================================================================
// Frame Methods
// =============================================================================

fn has_duplicates(names: &[String]) -> bool {
    let mut seen = std::collections::HashSet::new();
    !names.iter().all(|n| seen.insert(n))
}

impl TdsFrame {
    /// Keep `columns`, in the order given.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> FrameResult<TdsFrame> {
        TdsFrame::applied(Select {
            base: self.clone(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }

    /// Keep the columns picked out by `filter`.
    pub fn filter_columns(&self, filter: ColumnFilter) -> FrameResult<TdsFrame> {
        let available = self.column_names();
        let columns: Vec<String> = match &filter {
            ColumnFilter::Items(items) => {
                let missing: Vec<&String> =
                    items.iter().filter(|c| !available.contains(c)).collect();
                if !missing.is_empty() {
                    return Err(FrameError::validation(format!(
                        "Columns {} in `filter` items list do not exist. Available: {}",
                        name_list(&missing),
                        name_list(&available)
                    )));
                }
                items.clone()
            }
            ColumnFilter::Like(pattern) => {
                let matched: Vec<String> = available
                    .iter()
                    .filter(|c| c.contains(pattern.as_str()))
                    .cloned()
                    .collect();
                if matched.is_empty() {
                    return Err(FrameError::validation(format!(
                        "No columns match the pattern '{}'. Available: {}",
                        pattern,
                        name_list(&available)
                    )));
                }
                matched
            }
            ColumnFilter::Regex(pattern) => {
                let re = Regex::new(pattern).map_err(|e| {
                    FrameError::validation(format!("Invalid regex pattern '{pattern}': {e}"))
                })?;
                let matched: Vec<String> =
                    available.iter().filter(|c| re.is_match(c)).cloned().collect();
                if matched.is_empty() {
                    return Err(FrameError::validation(format!(
                        "No columns match the regex '{}'. Available: {}",
                        pattern,
                        name_list(&available)
                    )));
                }
                matched
            }
        };
        self.select(&columns)
    }

    /// Remove `columns`. Only [`Axis::Columns`] is supported.
    pub fn drop<S: AsRef<str>>(&self, columns: &[S], axis: Axis) -> FrameResult<TdsFrame> {
        if axis == Axis::Index {
            return Err(FrameError::unsupported(
                "Axis 0 is not supported for 'drop' function",
            ));
        }
        let dropped: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        let available = self.column_names();
        let missing: Vec<&str> = dropped
            .iter()
            .copied()
            .filter(|c| !available.iter().any(|a| a == c))
            .collect();
        if !missing.is_empty() {
            return Err(FrameError::schema(format!(
                "{} not found in axis",
                name_list(&missing)
            )));
        }
        let retained: Vec<String> = available
            .into_iter()
            .filter(|c| !dropped.contains(&c.as_str()))
            .collect();
        self.select(&retained)
    }

    /// Rename columns; each pair is `(old, new)`.
    pub fn rename<S, T>(&self, renames: &[(S, T)]) -> FrameResult<TdsFrame>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let renames: Vec<(String, String)> = renames
            .iter()
            .map(|(o, n)| (o.as_ref().to_string(), n.as_ref().to_string()))
            .collect();
        let old: Vec<String> = renames.iter().map(|(o, _)| o.clone()).collect();
        let new: Vec<String> = renames.iter().map(|(_, n)| n.clone()).collect();
        if has_duplicates(&old) {
            return Err(FrameError::validation(format!(
                "column_names list shouldn't have duplicates when renaming columns.\n\
                 column_names list - (Count: {}) - {}\n",
                old.len(),
                name_list(&old)
            )));
        }
        if has_duplicates(&new) {
            return Err(FrameError::validation(format!(
                "renamed_column_names_list list shouldn't have duplicates when renaming columns.\n\
                 renamed_column_names_list - (Count: {}) - {}\n",
                new.len(),
                name_list(&new)
            )));
        }
        self.require_columns(&old, "rename columns list")?;
        TdsFrame::applied(Rename {
            base: self.clone(),
            renames,
        })
    }

    /// Rename every column through `mapper`; unchanged names are skipped.
    pub fn rename_with(&self, mapper: impl Fn(&str) -> String) -> FrameResult<TdsFrame> {
        let renames: Vec<(String, String)> = self
            .column_names()
            .into_iter()
            .filter_map(|c| {
                let new = mapper(&c);
                (new != c).then_some((c, new))
            })
            .collect();
        self.rename(&renames)
    }
}
