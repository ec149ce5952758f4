//! Row handles passed to user closures.

use super::column::{column_names, name_list, ColumnType, TdsColumn};
use super::types::PrimitiveType;
use crate::error::{FrameError, FrameResult};
use crate::expr::{Expr, RowAccess};

/// A row of the frame bound to `alias`.
///
/// Accessors build column expressions scoped to the alias, so two rows of
/// a join can be told apart. Typed accessors check the declared column
/// type against the one requested.
#[derive(Debug, Clone)]
pub struct TdsRow {
    alias: String,
    columns: Vec<TdsColumn>,
    access: RowAccess,
}

impl TdsRow {
    pub fn new(alias: impl Into<String>, columns: &[TdsColumn]) -> Self {
        Self {
            alias: alias.into(),
            columns: columns.to_vec(),
            access: RowAccess::Current,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn columns(&self) -> &[TdsColumn] {
        &self.columns
    }

    /// The same row read through a window function (`lead`, `first`, ...).
    pub(crate) fn with_access(&self, access: RowAccess) -> Self {
        Self {
            access,
            ..self.clone()
        }
    }

    fn find(&self, name: &str) -> FrameResult<&TdsColumn> {
        self.columns.iter().find(|c| c.name() == name).ok_or_else(|| {
            FrameError::schema(format!(
                "Column - '{}' doesn't exist in the current frame. Current frame columns: {}",
                name,
                name_list(&column_names(&self.columns))
            ))
        })
    }

    fn reference(&self, name: &str, ty: PrimitiveType) -> Expr {
        Expr::column(&self.alias, name, ty, self.access)
    }

    /// The column with its most precise core type.
    pub fn get(&self, name: &str) -> FrameResult<Expr> {
        let column = self.find(name)?;
        match column.column_type() {
            ColumnType::Primitive(ty) => Ok(self.reference(name, ty.core())),
            ColumnType::Enum { path, .. } => Err(FrameError::schema(format!(
                "Column expression for '{name}' is of enumeration type '{path}'. \
                 Only primitive columns can be used in expressions."
            ))),
        }
    }

    /// The column whatever its type; enumeration values read as strings.
    pub(crate) fn get_any(&self, name: &str) -> FrameResult<Expr> {
        let column = self.find(name)?;
        let ty = column
            .primitive_type()
            .map_or(PrimitiveType::String, |t| t.core());
        Ok(self.reference(name, ty))
    }

    fn get_typed(&self, name: &str, requested: PrimitiveType, method: &str) -> FrameResult<Expr> {
        let column = self.find(name)?;
        match column.primitive_type() {
            Some(ty) if ty.is_subtype_of(requested) => Ok(self.reference(name, requested)),
            _ => Err(FrameError::type_error(format!(
                "Column expression for '{}' is of type '{}'. {} method is not valid on this column.",
                name,
                column.column_type(),
                method
            ))),
        }
    }

    pub fn get_boolean(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::Boolean, "get_boolean")
    }

    pub fn get_string(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::String, "get_string")
    }

    pub fn get_integer(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::Integer, "get_integer")
    }

    pub fn get_float(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::Float, "get_float")
    }

    pub fn get_number(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::Number, "get_number")
    }

    pub fn get_date(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::Date, "get_date")
    }

    pub fn get_datetime(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::DateTime, "get_datetime")
    }

    pub fn get_strict_date(&self, name: &str) -> FrameResult<Expr> {
        self.get_typed(name, PrimitiveType::StrictDate, "get_strict_date")
    }
}
