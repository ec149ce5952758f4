//! Cast targets and the cast validation matrix.

use std::collections::BTreeSet;
use std::fmt;

use super::column::TdsColumn;
use super::types::{PrimitiveType, TypeFamily};
use crate::error::{FrameError, FrameResult};

/// A cast target type with its optional parameters
/// (`Numeric(10, 2)`, `Varchar(200)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastTarget {
    pub ty: PrimitiveType,
    pub params: Vec<u32>,
}

impl CastTarget {
    pub fn new(ty: PrimitiveType) -> Self {
        Self { ty, params: vec![] }
    }

    pub fn with_params(ty: PrimitiveType, params: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ty,
            params: params.into_iter().collect(),
        }
    }

    /// Pure type spelling, e.g. `Integer`, `Numeric(10, 2)`.
    pub fn pure_spec(&self) -> String {
        self.to_string()
    }
}

impl From<PrimitiveType> for CastTarget {
    fn from(ty: PrimitiveType) -> Self {
        Self::new(ty)
    }
}

impl fmt::Display for CastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(self.ty.name())
        } else {
            let params: Vec<String> = self.params.iter().map(u32::to_string).collect();
            write!(f, "{}({})", self.ty.name(), params.join(", "))
        }
    }
}

/// Whether `source` may be cast to `target`.
pub fn is_cast_allowed(source: PrimitiveType, target: PrimitiveType) -> bool {
    source.family().cast_targets().contains(&target.family())
}

/// Validate a cast request against the current columns and compute the
/// resulting column list. Columns not named in `casts` pass through.
pub fn validate_and_build_cast_columns(
    current: &[TdsColumn],
    casts: &[(String, CastTarget)],
) -> FrameResult<Vec<TdsColumn>> {
    let available: BTreeSet<&str> = current.iter().map(TdsColumn::name).collect();
    let unknown: BTreeSet<&str> = casts
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|n| !available.contains(n))
        .collect();
    if !unknown.is_empty() {
        return Err(FrameError::validation(format!(
            "Column(s) not found in frame: {}. Available columns: {}",
            super::column::name_list(&unknown.into_iter().collect::<Vec<_>>()),
            super::column::name_list(&available.into_iter().collect::<Vec<_>>()),
        )));
    }

    current
        .iter()
        .map(|col| {
            let Some((_, target)) = casts.iter().find(|(name, _)| name == col.name()) else {
                return Ok(col.clone());
            };
            let Some(source) = col.primitive_type() else {
                return Err(FrameError::type_error(format!(
                    "Cannot cast non-primitive column '{}' (type: {}). Only PrimitiveTdsColumn can be cast.",
                    col.name(),
                    col.column_type()
                )));
            };
            if target.ty.requires_parameters() && target.params.is_empty() {
                return Err(FrameError::validation(format!(
                    "Cast to {0} requires parameters. Use a parameterised target, e.g. \
                     CastTarget::with_params(PrimitiveType::{0}, ..) instead of PrimitiveType::{0}",
                    target.ty.name()
                )));
            }
            if !is_cast_allowed(source, target.ty) {
                let family = source.family();
                let allowed: BTreeSet<TypeFamily> = family.cast_targets().iter().copied().collect();
                let allowed: Vec<&str> = allowed.iter().map(TypeFamily::name).collect();
                return Err(FrameError::validation(format!(
                    "Cannot cast column '{}' from {} to {}. {} types can only be cast to: {}",
                    col.name(),
                    source.name(),
                    target.ty.name(),
                    capitalize(family.name()),
                    super::column::name_list(&allowed),
                )));
            }
            Ok(TdsColumn::primitive(col.name(), target.ty))
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
