//! SQL expression metamodel.
//!
//! These nodes are pure data. Frame and expression lowering build them;
//! [`emit`](super::emit) walks them and writes dialect text. Every variant
//! must be handled by the emitter - the compiler enforces this.

use crate::expr::DurationUnit;
use crate::tds::CastTarget;

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// Literal values
    Literal(SqlLiteral),

    /// Dotted reference: `"root".col1`, `"left"."col2"`
    QualifiedName(Vec<NamePart>),

    /// `(left op right)` for `=`, `<>`, `<`, `<=`, `>`, `>=`
    Comparison {
        op: ComparisonOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },

    /// `(left AND right)` / `(left OR right)`
    Logical {
        op: LogicalOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },

    /// `NOT(expr)`
    Not(Box<SqlExpr>),

    /// `(left op right)` for `+`, `-`, `*`, `/`; modulo goes through the
    /// dialect.
    Arithmetic {
        op: ArithmeticOp,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },

    /// Arithmetic negation
    Negative(Box<SqlExpr>),

    /// `CASE WHEN .. THEN .. ELSE .. END`
    Case {
        when_clauses: Vec<(SqlExpr, SqlExpr)>,
        else_clause: Option<Box<SqlExpr>>,
    },

    /// `CAST(expr AS type)`
    Cast {
        expr: Box<SqlExpr>,
        target: CastTarget,
    },

    /// `(expr IS NULL)` / `(expr IS NOT NULL)`
    IsNull { expr: Box<SqlExpr>, negated: bool },

    /// `(value LIKE 'pattern')`, pattern already escaped
    Like { value: Box<SqlExpr>, pattern: String },

    /// `name(args...)`, optionally `name(DISTINCT args...)`
    FunctionCall {
        name: String,
        args: Vec<SqlExpr>,
        distinct: bool,
    },

    /// 1-based position of `needle` in `haystack`
    StringPosition {
        haystack: Box<SqlExpr>,
        needle: Box<SqlExpr>,
    },

    /// Start of the enclosing unit
    DateTrunc {
        unit: DateTruncUnit,
        value: Box<SqlExpr>,
    },

    /// Numeric field of a date
    DatePart {
        field: DatePartField,
        value: Box<SqlExpr>,
    },

    CurrentDate,
    CurrentTimestamp,

    /// Whole `unit`s from `start` to `end`
    DateDiff {
        unit: DurationUnit,
        start: Box<SqlExpr>,
        end: Box<SqlExpr>,
    },

    /// `value` shifted by `amount` units
    DateAdd {
        unit: DurationUnit,
        amount: Box<SqlExpr>,
        value: Box<SqlExpr>,
    },

    /// Start of the `size`-unit bucket containing `value`
    TimeBucket {
        unit: DurationUnit,
        size: i64,
        value: Box<SqlExpr>,
    },

    /// Interval literal, used as a RANGE frame offset
    Interval { amount: i64, unit: DurationUnit },

    /// `nested OVER (...)`
    Window {
        nested: Box<SqlExpr>,
        window: Box<Window>,
    },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    Integer(i64),
    Double(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// One segment of a [`SqlExpr::QualifiedName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePart {
    /// Written by the compiler (`root`, `left`, output aliases); always quoted.
    Quoted(String),
    /// Source identifier; quoted only when the dialect needs it.
    Plain(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Unit for `DATE_TRUNC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTruncUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DateTruncUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateTruncUnit::Year => "year",
            DateTruncUnit::Quarter => "quarter",
            DateTruncUnit::Month => "month",
            DateTruncUnit::Week => "week",
            DateTruncUnit::Day => "day",
            DateTruncUnit::Hour => "hour",
            DateTruncUnit::Minute => "minute",
            DateTruncUnit::Second => "second",
        }
    }
}

/// Field for `DATE_PART`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePartField {
    Year,
    Quarter,
    Month,
    Week,
    DayOfYear,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    Epoch,
}

impl DatePartField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePartField::Year => "year",
            DatePartField::Quarter => "quarter",
            DatePartField::Month => "month",
            DatePartField::Week => "week",
            DatePartField::DayOfYear => "doy",
            DatePartField::Day => "day",
            DatePartField::DayOfWeek => "dow",
            DatePartField::Hour => "hour",
            DatePartField::Minute => "minute",
            DatePartField::Second => "second",
            DatePartField::Epoch => "epoch",
        }
    }
}

// =============================================================================
// Windows and Sorting
// =============================================================================

/// `ORDER BY` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub key: SqlExpr,
    pub descending: bool,
}

impl SortItem {
    pub fn asc(key: SqlExpr) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    pub fn desc(key: SqlExpr) -> Self {
        Self {
            key,
            descending: true,
        }
    }
}

/// The `OVER (...)` clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    pub partitions: Vec<SqlExpr>,
    pub order_by: Vec<SortItem>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFrameMode {
    Rows,
    Range,
}

/// `ROWS|RANGE BETWEEN start AND end`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub mode: WindowFrameMode,
    pub start: WindowFrameBound,
    pub end: WindowFrameBound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowFrameBound {
    UnboundedPreceding,
    Preceding(SqlExpr),
    CurrentRow,
    Following(SqlExpr),
    UnboundedFollowing,
}

// =============================================================================
// Builders
// =============================================================================

impl SqlExpr {
    /// `"alias".column` for a source column of an input relation.
    pub fn source_column(alias: &str, column: &str) -> Self {
        SqlExpr::QualifiedName(vec![
            NamePart::Quoted(alias.into()),
            NamePart::Plain(column.into()),
        ])
    }

    /// `"alias"."column"` for a column the compiler projected itself.
    pub fn projected_column(alias: &str, column: &str) -> Self {
        SqlExpr::QualifiedName(vec![
            NamePart::Quoted(alias.into()),
            NamePart::Quoted(column.into()),
        ])
    }

    pub fn integer(n: i64) -> Self {
        SqlExpr::Literal(SqlLiteral::Integer(n))
    }

    pub fn double(f: f64) -> Self {
        SqlExpr::Literal(SqlLiteral::Double(f))
    }

    pub fn string(s: impl Into<String>) -> Self {
        SqlExpr::Literal(SqlLiteral::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        SqlExpr::Literal(SqlLiteral::Boolean(b))
    }

    pub fn null() -> Self {
        SqlExpr::Literal(SqlLiteral::Null)
    }

    pub fn function(name: &str, args: Vec<SqlExpr>) -> Self {
        SqlExpr::FunctionCall {
            name: name.into(),
            args,
            distinct: false,
        }
    }

    pub fn comparison(op: ComparisonOp, left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(self, other: SqlExpr) -> Self {
        SqlExpr::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn or(self, other: SqlExpr) -> Self {
        SqlExpr::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn cast(self, target: impl Into<CastTarget>) -> Self {
        SqlExpr::Cast {
            expr: Box::new(self),
            target: target.into(),
        }
    }

    pub fn is_null(self) -> Self {
        SqlExpr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Self {
        SqlExpr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    pub fn over(self, window: Window) -> Self {
        SqlExpr::Window {
            nested: Box::new(self),
            window: Box::new(window),
        }
    }

    /// Fold a list of predicates with `op`, left to right.
    pub fn fold(op: LogicalOp, exprs: Vec<SqlExpr>) -> Option<SqlExpr> {
        exprs.into_iter().reduce(|acc, e| SqlExpr::Logical {
            op,
            left: Box::new(acc),
            right: Box::new(e),
        })
    }

    /// Whether an `OVER (...)` appears anywhere in the tree.
    pub fn contains_window(&self) -> bool {
        match self {
            SqlExpr::Window { .. } => true,
            SqlExpr::Literal(_)
            | SqlExpr::QualifiedName(_)
            | SqlExpr::CurrentDate
            | SqlExpr::CurrentTimestamp
            | SqlExpr::Interval { .. } => false,
            SqlExpr::Comparison { left, right, .. }
            | SqlExpr::Logical { left, right, .. }
            | SqlExpr::Arithmetic { left, right, .. } => {
                left.contains_window() || right.contains_window()
            }
            SqlExpr::StringPosition { haystack, needle } => {
                haystack.contains_window() || needle.contains_window()
            }
            SqlExpr::DateDiff { start, end, .. } => start.contains_window() || end.contains_window(),
            SqlExpr::DateAdd { amount, value, .. } => {
                amount.contains_window() || value.contains_window()
            }
            SqlExpr::Not(e) | SqlExpr::Negative(e) => e.contains_window(),
            SqlExpr::Cast { expr, .. } | SqlExpr::IsNull { expr, .. } => expr.contains_window(),
            SqlExpr::Like { value, .. }
            | SqlExpr::DateTrunc { value, .. }
            | SqlExpr::DatePart { value, .. }
            | SqlExpr::TimeBucket { value, .. } => value.contains_window(),
            SqlExpr::FunctionCall { args, .. } => args.iter().any(SqlExpr::contains_window),
            SqlExpr::Case {
                when_clauses,
                else_clause,
            } => {
                when_clauses
                    .iter()
                    .any(|(w, t)| w.contains_window() || t.contains_window())
                    || else_clause.as_ref().is_some_and(|e| e.contains_window())
            }
        }
    }
}
