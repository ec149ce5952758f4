//! TDS columns and server schema parsing.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use super::types::PrimitiveType;
use crate::error::{FrameError, FrameResult};

/// Declared type of a column: a primitive or an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Primitive(PrimitiveType),
    Enum { path: String, values: Vec<String> },
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Primitive(t) => write!(f, "{t}"),
            ColumnType::Enum { path, .. } => f.write_str(path),
        }
    }
}

/// A named, typed column of a TDS frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TdsColumn {
    name: String,
    ty: ColumnType,
}

impl TdsColumn {
    pub fn primitive(name: impl Into<String>, ty: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            ty: ColumnType::Primitive(ty),
        }
    }

    pub fn enumeration(
        name: impl Into<String>,
        path: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ColumnType::Enum {
                path: path.into(),
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Boolean)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Float)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::DateTime)
    }

    pub fn strict_date(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveType::StrictDate)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    /// The primitive type, or `None` for enum columns.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match &self.ty {
            ColumnType::Primitive(t) => Some(*t),
            ColumnType::Enum { .. } => None,
        }
    }

    /// Copy of this column under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: self.ty.clone(),
        }
    }
}

impl fmt::Display for TdsColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TdsColumn(Name: {}, Type: {})", self.name, self.ty)
    }
}

/// Render names the way validation messages list them: `['a', 'b']`.
pub fn name_list<S: AsRef<str>>(names: &[S]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

/// Names of the given columns, in order.
pub fn column_names(columns: &[TdsColumn]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// Reject a column list that repeats a name.
pub fn ensure_unique_names(columns: &[TdsColumn]) -> FrameResult<()> {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = columns
        .iter()
        .map(TdsColumn::name)
        .filter(|n| !seen.insert(*n))
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(FrameError::schema(format!(
            "Found duplicate column names in frame: {}",
            name_list(&duplicates)
        )))
    }
}

// =============================================================================
// Server schema JSON
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(t) => vec![t],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Deserialize)]
struct SchemaDoc {
    columns: OneOrMany<SchemaColumn>,
    #[serde(default)]
    enums: Option<OneOrMany<SchemaEnum>>,
}

#[derive(Deserialize)]
struct SchemaColumn {
    #[serde(rename = "_type")]
    kind: String,
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Deserialize)]
struct SchemaEnum {
    #[serde(rename = "type")]
    ty: String,
    values: OneOrMany<String>,
}

/// Parse the column list returned by the server's schema endpoint.
///
/// `primitiveSchemaColumn` entries map to primitive columns; any other
/// column kind is an enum whose values are looked up in `enums`.
pub fn tds_columns_from_json(s: &str) -> FrameResult<Vec<TdsColumn>> {
    let wrap = |msg: String| FrameError::schema(format!("Unable to parse tds columns from schema: \n{s}\n{msg}"));

    let doc: SchemaDoc = serde_json::from_str(s).map_err(|e| wrap(e.to_string()))?;
    let enums = doc.enums.map(OneOrMany::into_vec).unwrap_or_default();

    let mut columns = Vec::new();
    for col in doc.columns.into_vec() {
        if col.kind == "primitiveSchemaColumn" {
            let ty = col.ty.parse::<PrimitiveType>().map_err(|e| wrap(e.to_string()))?;
            columns.push(TdsColumn::primitive(col.name, ty));
        } else {
            let values = enums
                .iter()
                .find(|e| e.ty == col.ty)
                .map(|e| match &e.values {
                    OneOrMany::One(v) => vec![v.clone()],
                    OneOrMany::Many(v) => v.clone(),
                })
                .ok_or_else(|| wrap(format!("Unknown enum type: {}", col.ty)))?;
            columns.push(TdsColumn::enumeration(col.name, col.ty, values));
        }
    }
    Ok(columns)
}
