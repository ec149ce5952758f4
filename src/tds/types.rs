//! Primitive column types and the subtype lattice.
//!
//! The expression algebra works on the eight core types (`Boolean`,
//! `String`, `Integer`, `Float`, `Number`, `Date`, `DateTime`,
//! `StrictDate`). The precise storage types (`TinyInt`, `Varchar`, ...)
//! only appear as cast targets and as the columns a cast produces; each of
//! them collapses to one core type through [`PrimitiveType::core`].
//!
//! ```text
//!            Number                    Date               String   Boolean
//!        ┌─────┼───────┐          ┌──────┴──────┐            │
//!     Integer Float Decimal   StrictDate    DateTime      Varchar
//!        │      │   Numeric                     │
//!   TinyInt..  Float4                       Timestamp
//!   UBigInt    Double
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// A primitive column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    String,
    Integer,
    Float,
    Number,
    Date,
    DateTime,
    StrictDate,

    // Precise types
    TinyInt,
    UTinyInt,
    SmallInt,
    USmallInt,
    Int,
    UInt,
    BigInt,
    UBigInt,
    Float4,
    Double,
    Decimal,
    Numeric,
    Varchar,
    Timestamp,
}

/// Cast/comparison family of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeFamily {
    Boolean,
    Date,
    Numeric,
    String,
}

impl TypeFamily {
    /// Lower-case family name, as used in validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeFamily::Boolean => "boolean",
            TypeFamily::Date => "date",
            TypeFamily::Numeric => "numeric",
            TypeFamily::String => "string",
        }
    }

    /// Families a value of this family may be cast into.
    pub fn cast_targets(&self) -> &'static [TypeFamily] {
        match self {
            TypeFamily::Numeric => &[TypeFamily::Numeric, TypeFamily::String],
            TypeFamily::String => &[TypeFamily::String],
            TypeFamily::Date => &[TypeFamily::Date],
            TypeFamily::Boolean => &[TypeFamily::Boolean],
        }
    }
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 22] = [
        PrimitiveType::Boolean,
        PrimitiveType::String,
        PrimitiveType::Integer,
        PrimitiveType::Float,
        PrimitiveType::Number,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
        PrimitiveType::StrictDate,
        PrimitiveType::TinyInt,
        PrimitiveType::UTinyInt,
        PrimitiveType::SmallInt,
        PrimitiveType::USmallInt,
        PrimitiveType::Int,
        PrimitiveType::UInt,
        PrimitiveType::BigInt,
        PrimitiveType::UBigInt,
        PrimitiveType::Float4,
        PrimitiveType::Double,
        PrimitiveType::Decimal,
        PrimitiveType::Numeric,
        PrimitiveType::Varchar,
        PrimitiveType::Timestamp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
            PrimitiveType::Integer => "Integer",
            PrimitiveType::Float => "Float",
            PrimitiveType::Number => "Number",
            PrimitiveType::Date => "Date",
            PrimitiveType::DateTime => "DateTime",
            PrimitiveType::StrictDate => "StrictDate",
            PrimitiveType::TinyInt => "TinyInt",
            PrimitiveType::UTinyInt => "UTinyInt",
            PrimitiveType::SmallInt => "SmallInt",
            PrimitiveType::USmallInt => "USmallInt",
            PrimitiveType::Int => "Int",
            PrimitiveType::UInt => "UInt",
            PrimitiveType::BigInt => "BigInt",
            PrimitiveType::UBigInt => "UBigInt",
            PrimitiveType::Float4 => "Float4",
            PrimitiveType::Double => "Double",
            PrimitiveType::Decimal => "Decimal",
            PrimitiveType::Numeric => "Numeric",
            PrimitiveType::Varchar => "Varchar",
            PrimitiveType::Timestamp => "Timestamp",
        }
    }

    /// The core type the expression algebra uses for this type.
    pub fn core(&self) -> PrimitiveType {
        match self {
            PrimitiveType::TinyInt
            | PrimitiveType::UTinyInt
            | PrimitiveType::SmallInt
            | PrimitiveType::USmallInt
            | PrimitiveType::Int
            | PrimitiveType::UInt
            | PrimitiveType::BigInt
            | PrimitiveType::UBigInt => PrimitiveType::Integer,
            PrimitiveType::Float4 | PrimitiveType::Double => PrimitiveType::Float,
            PrimitiveType::Decimal | PrimitiveType::Numeric => PrimitiveType::Number,
            PrimitiveType::Varchar => PrimitiveType::String,
            PrimitiveType::Timestamp => PrimitiveType::DateTime,
            other => *other,
        }
    }

    /// Immediate supertype in the lattice, `None` at a root.
    fn parent(&self) -> Option<PrimitiveType> {
        match self.core() {
            core if core != *self => Some(core),
            PrimitiveType::Integer | PrimitiveType::Float => Some(PrimitiveType::Number),
            PrimitiveType::StrictDate | PrimitiveType::DateTime => Some(PrimitiveType::Date),
            _ => None,
        }
    }

    /// `self <: other` in the subtype lattice (reflexive).
    pub fn is_subtype_of(&self, other: PrimitiveType) -> bool {
        let mut current = Some(*self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }

    pub fn family(&self) -> TypeFamily {
        match self.core() {
            PrimitiveType::Boolean => TypeFamily::Boolean,
            PrimitiveType::String => TypeFamily::String,
            PrimitiveType::Date | PrimitiveType::DateTime | PrimitiveType::StrictDate => {
                TypeFamily::Date
            }
            _ => TypeFamily::Numeric,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.family() == TypeFamily::Numeric
    }

    pub fn is_string(&self) -> bool {
        self.family() == TypeFamily::String
    }

    pub fn is_date(&self) -> bool {
        self.family() == TypeFamily::Date
    }

    pub fn is_boolean(&self) -> bool {
        self.family() == TypeFamily::Boolean
    }

    /// Whether a cast target needs explicit parameters (`Numeric(p, s)`,
    /// `Varchar(n)`).
    pub fn requires_parameters(&self) -> bool {
        matches!(self, PrimitiveType::Numeric | PrimitiveType::Varchar)
    }

    /// Least common supertype of two numeric types.
    pub fn numeric_join(a: PrimitiveType, b: PrimitiveType) -> PrimitiveType {
        match (a.core(), b.core()) {
            (PrimitiveType::Integer, PrimitiveType::Integer) => PrimitiveType::Integer,
            (PrimitiveType::Float, PrimitiveType::Float) => PrimitiveType::Float,
            _ => PrimitiveType::Number,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveType {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveType::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| FrameError::schema(format!("Unknown primitive type: {s}")))
    }
}
