//! Typed column-expression algebra.
//!
//! Every expression is an [`Expr`]: a node kind plus its declared
//! [`PrimitiveType`] and whether it can evaluate to null. Expressions are
//! built by user closures through [`TdsRow`](crate::tds::TdsRow) accessors
//! and the operator methods in [`ops`], then lowered twice from the same
//! tree: to the SQL metamodel ([`to_sql`]) and to Pure text ([`to_pure`]).
//!
//! ```text
//!   row.get_integer("col1")?.add(1)?.gt(10)?
//!              │
//!              ▼
//!   Binary(Gt, Binary(Add, Column(r.col1), Literal(1)), Literal(10))
//!        │                                   │
//!        ▼ to_sql                            ▼ to_pure
//!   (("root".col1 + 1) > 10)            (($r.col1 + 1) > 10)
//! ```

mod aggregate;
mod duration;
mod ops;
mod sort;
mod to_pure;
mod to_sql;
mod window;

pub use aggregate::{AggregateOp, Collection, COLLECTION_VAR};
pub use duration::DurationUnit;
pub use sort::{SortDirection, SortInfo};
pub use to_sql::SqlContext;
pub use window::{
    FrameBound, FrameBoundType, PartialFrame, RankFunction, Window, WindowFrame, WindowFrameMode,
    WindowRef, PARTIAL_FRAME_VAR, WINDOW_VAR,
};

use chrono::{NaiveDate, NaiveDateTime};

use crate::tds::{CastTarget, PrimitiveType};

// =============================================================================
// Expression Tree
// =============================================================================

/// A typed expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    kind: ExprKind,
    ty: PrimitiveType,
    non_nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Column(ColumnRef),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Nary {
        op: NaryOp,
        operands: Vec<Expr>,
    },
    Today,
    Now,
    /// `if c1 then v1 else if ... else otherwise`
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Box<Expr>,
    },
    /// Aggregate over the collection produced by `operand`.
    Aggregate {
        op: AggregateOp,
        operand: Box<Expr>,
    },
    /// Ranking function evaluated for `row` over the current window.
    Rank { function: RankFunction, row: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    StrictDate(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Literal {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Literal::Boolean(_) => PrimitiveType::Boolean,
            Literal::Integer(_) => PrimitiveType::Integer,
            Literal::Float(_) => PrimitiveType::Float,
            Literal::String(_) => PrimitiveType::String,
            Literal::StrictDate(_) => PrimitiveType::StrictDate,
            Literal::DateTime(_) => PrimitiveType::DateTime,
        }
    }
}

/// Which row of the window a column reference reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAccess {
    Current,
    Lead,
    Lag,
    First,
    Last,
    /// 1-based row of the window frame
    Nth(i64),
}

/// A column of the frame bound to the row alias `frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub frame: String,
    pub name: String,
    pub access: RowAccess,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    // Numeric
    Negate,
    Abs,
    Ceiling,
    Floor,
    Sign,
    Sqrt,
    Cbrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Cot,
    Round,

    Not,

    // String
    Upper,
    Lower,
    LTrim,
    RTrim,
    Trim,
    Length,
    ParseInteger,
    ParseFloat,
    ParseBoolean,
    ParseDateTime,
    Ascii,
    Reverse,
    LowerFirst,
    UpperFirst,

    IsEmpty,
    IsNotEmpty,

    // Date truncation
    FirstDayOfYear,
    FirstDayOfQuarter,
    FirstDayOfMonth,
    FirstDayOfWeek,
    FirstHourOfDay,
    FirstMinuteOfHour,
    FirstSecondOfMinute,
    FirstMillisecondOfSecond,

    // Date parts
    Year,
    Quarter,
    Month,
    WeekOfYear,
    DayOfYear,
    DayOfMonth,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    EpochValue,
    DatePart,

    Cast(CastTarget),
}

impl UnaryOp {
    /// Pure function name.
    pub fn pure_name(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "minus",
            UnaryOp::Abs => "abs",
            UnaryOp::Ceiling => "ceiling",
            UnaryOp::Floor => "floor",
            UnaryOp::Sign => "sign",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Cbrt => "cbrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "log",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Cot => "cot",
            UnaryOp::Round => "round",
            UnaryOp::Not => "not",
            UnaryOp::Upper => "toUpper",
            UnaryOp::Lower => "toLower",
            UnaryOp::LTrim => "ltrim",
            UnaryOp::RTrim => "rtrim",
            UnaryOp::Trim => "trim",
            UnaryOp::Length => "length",
            UnaryOp::ParseInteger => "parseInteger",
            UnaryOp::ParseFloat => "parseFloat",
            UnaryOp::ParseBoolean => "parseBoolean",
            UnaryOp::ParseDateTime => "parseDate",
            UnaryOp::Ascii => "ascii",
            UnaryOp::Reverse => "reverseString",
            UnaryOp::LowerFirst => "toLowerFirstCharacter",
            UnaryOp::UpperFirst => "toUpperFirstCharacter",
            UnaryOp::IsEmpty => "isEmpty",
            UnaryOp::IsNotEmpty => "isNotEmpty",
            UnaryOp::FirstDayOfYear => "firstDayOfYear",
            UnaryOp::FirstDayOfQuarter => "firstDayOfQuarter",
            UnaryOp::FirstDayOfMonth => "firstDayOfMonth",
            UnaryOp::FirstDayOfWeek => "firstDayOfWeek",
            UnaryOp::FirstHourOfDay => "firstHourOfDay",
            UnaryOp::FirstMinuteOfHour => "firstMinuteOfHour",
            UnaryOp::FirstSecondOfMinute => "firstSecondOfMinute",
            UnaryOp::FirstMillisecondOfSecond => "firstMillisecondOfSecond",
            UnaryOp::Year => "year",
            UnaryOp::Quarter => "quarter",
            UnaryOp::Month => "month",
            UnaryOp::WeekOfYear => "weekOfYear",
            UnaryOp::DayOfYear => "dayOfYear",
            UnaryOp::DayOfMonth => "dayOfMonth",
            UnaryOp::DayOfWeek => "dayOfWeekNumber",
            UnaryOp::Hour => "hour",
            UnaryOp::Minute => "minute",
            UnaryOp::Second => "second",
            UnaryOp::EpochValue => "toEpochValue",
            UnaryOp::DatePart => "datePart",
            UnaryOp::Cast(_) => "cast",
        }
    }

    /// Whether the Pure function needs a single (non-null) operand.
    fn operand_must_be_non_nullable(&self) -> bool {
        !matches!(
            self,
            UnaryOp::IsEmpty | UnaryOp::IsNotEmpty | UnaryOp::Cast(_)
        )
    }

    fn result_non_nullable(&self) -> bool {
        !matches!(self, UnaryOp::Cast(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Positive remainder
    Mod,
    /// Remainder with the sign of the dividend
    Rem,
    Pow,
    Atan2,
    /// Round to `right` decimal places
    Round,

    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,

    And,
    Or,

    Concat,
    StartsWith,
    EndsWith,
    Contains,
    Left,
    Right,
    Substring,
    IndexOf,

    DateDiff(DurationUnit),
    DateAdd(DurationUnit),
    TimeBucket(DurationUnit),
}

impl BinaryOp {
    /// Name used in operand type errors.
    pub fn describe(&self) -> &'static str {
        match self {
            BinaryOp::Add | BinaryOp::Concat => "plus (+)",
            BinaryOp::Sub => "minus (-)",
            BinaryOp::Mul => "multiply (*)",
            BinaryOp::Div => "divide (/)",
            BinaryOp::Mod => "mod (%)",
            BinaryOp::Rem => "rem",
            BinaryOp::Pow => "power (**)",
            BinaryOp::Atan2 => "atan2",
            BinaryOp::Round => "round",
            BinaryOp::Lt => "less than (<)",
            BinaryOp::Lte => "less than equal (<=)",
            BinaryOp::Gt => "greater than (>)",
            BinaryOp::Gte => "greater than equal (>=)",
            BinaryOp::Eq => "equals (==)",
            BinaryOp::Ne => "not equals (!=)",
            BinaryOp::And => "and (&)",
            BinaryOp::Or => "or (|)",
            BinaryOp::StartsWith => "startswith",
            BinaryOp::EndsWith => "endswith",
            BinaryOp::Contains => "contains",
            BinaryOp::Left => "left",
            BinaryOp::Right => "right",
            BinaryOp::Substring => "substring",
            BinaryOp::IndexOf => "index_of",
            BinaryOp::DateDiff(_) => "date_diff",
            BinaryOp::DateAdd(_) => "adjust",
            BinaryOp::TimeBucket(_) => "time_bucket",
        }
    }

    fn operands_must_be_non_nullable(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Lte
                | BinaryOp::Gt
                | BinaryOp::Gte
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::StartsWith
                | BinaryOp::EndsWith
                | BinaryOp::Contains
                | BinaryOp::Left
                | BinaryOp::Right
                | BinaryOp::Substring
        )
    }

    fn result_non_nullable(&self) -> bool {
        !matches!(
            self,
            BinaryOp::StartsWith
                | BinaryOp::EndsWith
                | BinaryOp::Contains
                | BinaryOp::Left
                | BinaryOp::Right
                | BinaryOp::Substring
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
    /// `replace(value, from, to)`
    Replace,
    /// `lpad(value, length, fill)`
    Lpad,
    /// `rpad(value, length, fill)`
    Rpad,
    /// `split_part(value, delimiter, index)`
    SplitPart,
}

impl NaryOp {
    pub fn pure_name(&self) -> &'static str {
        match self {
            NaryOp::Replace => "replace",
            NaryOp::Lpad => "lpad",
            NaryOp::Rpad => "rpad",
            NaryOp::SplitPart => "splitPart",
        }
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            NaryOp::Replace => "REPLACE",
            NaryOp::Lpad => "LPAD",
            NaryOp::Rpad => "RPAD",
            NaryOp::SplitPart => "SPLIT_PART",
        }
    }
}

// =============================================================================
// Construction
// =============================================================================

impl Expr {
    pub(crate) fn new(kind: ExprKind, ty: PrimitiveType, non_nullable: bool) -> Self {
        Self {
            kind,
            ty,
            non_nullable,
        }
    }

    /// Reference to `name` in the frame bound to `frame`.
    pub(crate) fn column(frame: &str, name: &str, ty: PrimitiveType, access: RowAccess) -> Self {
        Self::new(
            ExprKind::Column(ColumnRef {
                frame: frame.to_string(),
                name: name.to_string(),
                access,
            }),
            ty,
            false,
        )
    }

    pub fn literal(value: Literal) -> Self {
        let ty = value.primitive_type();
        Self::new(ExprKind::Literal(value), ty, true)
    }

    /// Current date.
    pub fn today() -> Self {
        Self::new(ExprKind::Today, PrimitiveType::StrictDate, true)
    }

    /// Current timestamp.
    pub fn now() -> Self {
        Self::new(ExprKind::Now, PrimitiveType::DateTime, true)
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    pub fn is_non_nullable(&self) -> bool {
        self.non_nullable
    }

    /// The column reference, when this is a bare column of the current row.
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match &self.kind {
            ExprKind::Column(col) if col.access == RowAccess::Current => Some(col),
            _ => None,
        }
    }

    /// Whether the tree contains an aggregate anywhere.
    pub fn contains_aggregate(&self) -> bool {
        match &self.kind {
            ExprKind::Aggregate { .. } => true,
            ExprKind::Literal(_)
            | ExprKind::Column(_)
            | ExprKind::Today
            | ExprKind::Now
            | ExprKind::Rank { .. } => false,
            ExprKind::Unary { operand, .. } => operand.contains_aggregate(),
            ExprKind::Binary { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            ExprKind::Nary { operands, .. } => operands.iter().any(Expr::contains_aggregate),
            ExprKind::Case {
                branches,
                otherwise,
            } => {
                branches
                    .iter()
                    .any(|(c, v)| c.contains_aggregate() || v.contains_aggregate())
                    || otherwise.contains_aggregate()
            }
        }
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::literal(Literal::Integer(v))
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::literal(Literal::Integer(i64::from(v)))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::literal(Literal::Float(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::literal(Literal::Boolean(v))
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Expr::literal(Literal::String(v.to_string()))
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Expr::literal(Literal::String(v))
    }
}

impl From<NaiveDate> for Expr {
    fn from(v: NaiveDate) -> Self {
        Expr::literal(Literal::StrictDate(v))
    }
}

impl From<NaiveDateTime> for Expr {
    fn from(v: NaiveDateTime) -> Self {
        Expr::literal(Literal::DateTime(v))
    }
}

impl From<&Expr> for Expr {
    fn from(v: &Expr) -> Self {
        v.clone()
    }
}
