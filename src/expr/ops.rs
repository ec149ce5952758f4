//! Operator methods on [`Expr`].
//!
//! Each method checks its receiver and operand types and builds a new node;
//! the receiver is left untouched. Type mismatches fail here, at
//! construction, naming the operator and the offending value.

use super::{BinaryOp, DurationUnit, Expr, ExprKind, Literal, NaryOp, UnaryOp};
use crate::error::{FrameError, FrameResult};
use crate::tds::{is_cast_allowed, CastTarget, PrimitiveType, TypeFamily};

/// Operand type accepted by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    Number,
    Integer,
    String,
    Boolean,
    Date,
}

impl Expected {
    fn accepts(self, ty: PrimitiveType) -> bool {
        match self {
            Expected::Number => ty.is_numeric(),
            Expected::Integer => ty.core() == PrimitiveType::Integer,
            Expected::String => ty.is_string(),
            Expected::Boolean => ty.is_boolean(),
            Expected::Date => ty.is_date(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Expected::Number => "Number",
            Expected::Integer => "Integer",
            Expected::String => "String",
            Expected::Boolean => "Boolean",
            Expected::Date => "Date",
        }
    }

    fn for_family(family: TypeFamily) -> Self {
        match family {
            TypeFamily::Numeric => Expected::Number,
            TypeFamily::String => Expected::String,
            TypeFamily::Boolean => Expected::Boolean,
            TypeFamily::Date => Expected::Date,
        }
    }
}

// =============================================================================
// Checked Builders
// =============================================================================

impl Expr {
    fn require(&self, op: &str, expected: Expected) -> FrameResult<()> {
        if expected.accepts(self.ty) {
            return Ok(());
        }
        Err(FrameError::type_error(format!(
            "'{}' function can only be called on {} expressions. Got value {} of type: {}",
            op,
            expected.name(),
            self.pure_text(),
            self.ty
        )))
    }

    fn require_operand(&self, op: BinaryOp, operand: &Expr, expected: Expected) -> FrameResult<()> {
        if expected.accepts(operand.ty) {
            return Ok(());
        }
        Err(FrameError::type_error(format!(
            "{} {} parameter should be a {} expression. Got value {} of type: {}",
            self.ty.core(),
            op.describe(),
            expected.name(),
            operand.pure_text(),
            operand.ty
        )))
    }

    fn unary(&self, op: UnaryOp, expected: Expected, result: PrimitiveType) -> FrameResult<Expr> {
        self.require(op.pure_name(), expected)?;
        let non_nullable = op.result_non_nullable();
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(self.clone()),
            },
            result,
            non_nullable,
        ))
    }

    fn binary(
        &self,
        op: BinaryOp,
        other: Expr,
        expected: (Expected, Expected),
        result: PrimitiveType,
    ) -> FrameResult<Expr> {
        self.require(op.describe(), expected.0)?;
        self.require_operand(op, &other, expected.1)?;
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(self.clone()),
                right: Box::new(other),
            },
            result,
            op.result_non_nullable(),
        ))
    }

    fn nary(&self, op: NaryOp, args: Vec<(Expr, Expected)>, result: PrimitiveType) -> FrameResult<Expr> {
        self.require(op.pure_name(), Expected::String)?;
        let mut operands = vec![self.clone()];
        for (arg, expected) in args {
            if !expected.accepts(arg.ty) {
                return Err(FrameError::type_error(format!(
                    "String {} parameter should be a {} expression. Got value {} of type: {}",
                    op.pure_name(),
                    expected.name(),
                    arg.pure_text(),
                    arg.ty
                )));
            }
            operands.push(arg);
        }
        Ok(Expr::new(ExprKind::Nary { op, operands }, result, true))
    }

    fn numeric_binary(&self, op: BinaryOp, other: Expr) -> FrameResult<Expr> {
        let result = PrimitiveType::numeric_join(self.ty, other.ty);
        self.binary(op, other, (Expected::Number, Expected::Number), result)
    }

    fn comparison(&self, op: BinaryOp, other: Expr) -> FrameResult<Expr> {
        let family = self.ty.family();
        if family == TypeFamily::Boolean && !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            return Err(FrameError::type_error(format!(
                "'{}' function can only be called on Number, String or Date expressions. \
                 Got value {} of type: {}",
                op.describe(),
                self.pure_text(),
                self.ty
            )));
        }
        let expected = Expected::for_family(family);
        self.binary(op, other, (expected, expected), PrimitiveType::Boolean)
    }
}

// =============================================================================
// Numeric
// =============================================================================

impl Expr {
    /// `self + other`; string concatenation when `self` is a string.
    pub fn add(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        let other = other.into();
        if self.ty.is_string() {
            return self.binary(
                BinaryOp::Concat,
                other,
                (Expected::String, Expected::String),
                PrimitiveType::String,
            );
        }
        self.numeric_binary(BinaryOp::Add, other)
    }

    pub fn sub(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.numeric_binary(BinaryOp::Sub, other.into())
    }

    pub fn mul(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.numeric_binary(BinaryOp::Mul, other.into())
    }

    /// Always `Number`, even for two integers.
    pub fn div(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Div,
            other.into(),
            (Expected::Number, Expected::Number),
            PrimitiveType::Number,
        )
    }

    /// Integer modulo with a non-negative result for a positive divisor.
    pub fn modulo(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Mod,
            other.into(),
            (Expected::Integer, Expected::Integer),
            PrimitiveType::Integer,
        )
    }

    /// Integer remainder, sign follows the dividend.
    pub fn rem(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Rem,
            other.into(),
            (Expected::Integer, Expected::Integer),
            PrimitiveType::Integer,
        )
    }

    pub fn pow(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Pow,
            other.into(),
            (Expected::Number, Expected::Number),
            PrimitiveType::Number,
        )
    }

    pub fn atan2(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Atan2,
            other.into(),
            (Expected::Number, Expected::Number),
            PrimitiveType::Float,
        )
    }

    pub fn neg(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Negate, Expected::Number, self.ty.core())
    }

    pub fn abs(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Abs, Expected::Number, self.ty.core())
    }

    pub fn ceil(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Ceiling, Expected::Number, PrimitiveType::Integer)
    }

    pub fn floor(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Floor, Expected::Number, PrimitiveType::Integer)
    }

    pub fn sign(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Sign, Expected::Number, PrimitiveType::Integer)
    }

    pub fn sqrt(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Sqrt, Expected::Number, PrimitiveType::Float)
    }

    pub fn cbrt(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Cbrt, Expected::Number, PrimitiveType::Float)
    }

    pub fn exp(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Exp, Expected::Number, PrimitiveType::Float)
    }

    /// Natural logarithm.
    pub fn log(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Ln, Expected::Number, PrimitiveType::Float)
    }

    pub fn log10(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Log10, Expected::Number, PrimitiveType::Float)
    }

    pub fn sin(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Sin, Expected::Number, PrimitiveType::Float)
    }

    pub fn cos(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Cos, Expected::Number, PrimitiveType::Float)
    }

    pub fn tan(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Tan, Expected::Number, PrimitiveType::Float)
    }

    pub fn asin(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Asin, Expected::Number, PrimitiveType::Float)
    }

    pub fn acos(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Acos, Expected::Number, PrimitiveType::Float)
    }

    pub fn atan(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Atan, Expected::Number, PrimitiveType::Float)
    }

    pub fn cot(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Cot, Expected::Number, PrimitiveType::Float)
    }

    /// Round to the nearest integer.
    pub fn round(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Round, Expected::Number, PrimitiveType::Integer)
    }

    /// Round to `digits` decimal places; `0` is the same as [`round`](Self::round).
    pub fn round_to(&self, digits: i64) -> FrameResult<Expr> {
        if digits == 0 {
            return self.round();
        }
        self.binary(
            BinaryOp::Round,
            Expr::from(digits),
            (Expected::Number, Expected::Integer),
            PrimitiveType::Float,
        )
    }
}

// =============================================================================
// Comparison and Boolean
// =============================================================================

impl Expr {
    pub fn lt(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Lt, other.into())
    }

    pub fn lte(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Lte, other.into())
    }

    pub fn gt(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Gt, other.into())
    }

    pub fn gte(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Gte, other.into())
    }

    pub fn eq(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Eq, other.into())
    }

    pub fn ne(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.comparison(BinaryOp::Ne, other.into())
    }

    pub fn and(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::And,
            other.into(),
            (Expected::Boolean, Expected::Boolean),
            PrimitiveType::Boolean,
        )
    }

    pub fn or(&self, other: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Or,
            other.into(),
            (Expected::Boolean, Expected::Boolean),
            PrimitiveType::Boolean,
        )
    }

    pub fn not(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Not, Expected::Boolean, PrimitiveType::Boolean)
    }
}

// =============================================================================
// String
// =============================================================================

impl Expr {
    pub fn length(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Length, Expected::String, PrimitiveType::Integer)
    }

    pub fn upper(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Upper, Expected::String, PrimitiveType::String)
    }

    pub fn lower(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Lower, Expected::String, PrimitiveType::String)
    }

    pub fn ltrim(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::LTrim, Expected::String, PrimitiveType::String)
    }

    pub fn rtrim(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::RTrim, Expected::String, PrimitiveType::String)
    }

    pub fn trim(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Trim, Expected::String, PrimitiveType::String)
    }

    pub fn parse_integer(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::ParseInteger, Expected::String, PrimitiveType::Integer)
    }

    pub fn parse_float(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::ParseFloat, Expected::String, PrimitiveType::Float)
    }

    pub fn parse_boolean(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::ParseBoolean, Expected::String, PrimitiveType::Boolean)
    }

    pub fn parse_datetime(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::ParseDateTime, Expected::String, PrimitiveType::DateTime)
    }

    pub fn ascii(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Ascii, Expected::String, PrimitiveType::Integer)
    }

    pub fn reverse(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Reverse, Expected::String, PrimitiveType::String)
    }

    pub fn lower_first(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::LowerFirst, Expected::String, PrimitiveType::String)
    }

    pub fn upper_first(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::UpperFirst, Expected::String, PrimitiveType::String)
    }

    pub fn starts_with(&self, prefix: &str) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::StartsWith,
            Expr::from(prefix),
            (Expected::String, Expected::String),
            PrimitiveType::Boolean,
        )
    }

    pub fn ends_with(&self, suffix: &str) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::EndsWith,
            Expr::from(suffix),
            (Expected::String, Expected::String),
            PrimitiveType::Boolean,
        )
    }

    pub fn contains(&self, needle: &str) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Contains,
            Expr::from(needle),
            (Expected::String, Expected::String),
            PrimitiveType::Boolean,
        )
    }

    /// First `count` characters.
    pub fn left(&self, count: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Left,
            count.into(),
            (Expected::String, Expected::Integer),
            PrimitiveType::String,
        )
    }

    /// Last `count` characters.
    pub fn right(&self, count: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Right,
            count.into(),
            (Expected::String, Expected::Integer),
            PrimitiveType::String,
        )
    }

    /// Suffix starting at the 1-based position `start`.
    pub fn substring(&self, start: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::Substring,
            start.into(),
            (Expected::String, Expected::Integer),
            PrimitiveType::String,
        )
    }

    /// 1-based position of `needle`, 0 when absent.
    pub fn index_of(&self, needle: impl Into<Expr>) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::IndexOf,
            needle.into(),
            (Expected::String, Expected::String),
            PrimitiveType::Integer,
        )
    }

    pub fn replace(&self, from: impl Into<Expr>, to: impl Into<Expr>) -> FrameResult<Expr> {
        self.nary(
            NaryOp::Replace,
            vec![(from.into(), Expected::String), (to.into(), Expected::String)],
            PrimitiveType::String,
        )
    }

    pub fn lpad(&self, length: impl Into<Expr>, fill: impl Into<Expr>) -> FrameResult<Expr> {
        self.nary(
            NaryOp::Lpad,
            vec![(length.into(), Expected::Integer), (fill.into(), Expected::String)],
            PrimitiveType::String,
        )
    }

    pub fn rpad(&self, length: impl Into<Expr>, fill: impl Into<Expr>) -> FrameResult<Expr> {
        self.nary(
            NaryOp::Rpad,
            vec![(length.into(), Expected::Integer), (fill.into(), Expected::String)],
            PrimitiveType::String,
        )
    }

    /// The `index`-th (1-based) field after splitting on `delimiter`.
    pub fn split_part(&self, delimiter: impl Into<Expr>, index: impl Into<Expr>) -> FrameResult<Expr> {
        self.nary(
            NaryOp::SplitPart,
            vec![(delimiter.into(), Expected::String), (index.into(), Expected::Integer)],
            PrimitiveType::String,
        )
    }
}

// =============================================================================
// Date
// =============================================================================

impl Expr {
    pub fn first_day_of_year(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstDayOfYear, Expected::Date, PrimitiveType::StrictDate)
    }

    pub fn first_day_of_quarter(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstDayOfQuarter, Expected::Date, PrimitiveType::StrictDate)
    }

    pub fn first_day_of_month(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstDayOfMonth, Expected::Date, PrimitiveType::StrictDate)
    }

    pub fn first_day_of_week(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstDayOfWeek, Expected::Date, PrimitiveType::StrictDate)
    }

    pub fn first_hour_of_day(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstHourOfDay, Expected::Date, PrimitiveType::DateTime)
    }

    pub fn first_minute_of_hour(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstMinuteOfHour, Expected::Date, PrimitiveType::DateTime)
    }

    pub fn first_second_of_minute(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::FirstSecondOfMinute, Expected::Date, PrimitiveType::DateTime)
    }

    pub fn first_millisecond_of_second(&self) -> FrameResult<Expr> {
        self.unary(
            UnaryOp::FirstMillisecondOfSecond,
            Expected::Date,
            PrimitiveType::DateTime,
        )
    }

    pub fn year(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Year, Expected::Date, PrimitiveType::Integer)
    }

    pub fn quarter(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Quarter, Expected::Date, PrimitiveType::Integer)
    }

    pub fn month(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Month, Expected::Date, PrimitiveType::Integer)
    }

    pub fn week_of_year(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::WeekOfYear, Expected::Date, PrimitiveType::Integer)
    }

    pub fn day_of_year(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::DayOfYear, Expected::Date, PrimitiveType::Integer)
    }

    pub fn day_of_month(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::DayOfMonth, Expected::Date, PrimitiveType::Integer)
    }

    pub fn day_of_week(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::DayOfWeek, Expected::Date, PrimitiveType::Integer)
    }

    pub fn hour(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Hour, Expected::Date, PrimitiveType::Integer)
    }

    pub fn minute(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Minute, Expected::Date, PrimitiveType::Integer)
    }

    pub fn second(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::Second, Expected::Date, PrimitiveType::Integer)
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_value(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::EpochValue, Expected::Date, PrimitiveType::Integer)
    }

    /// The calendar date of a date-time.
    pub fn date_part(&self) -> FrameResult<Expr> {
        self.unary(UnaryOp::DatePart, Expected::Date, PrimitiveType::StrictDate)
    }

    /// Whole `unit`s from `self` to `other`.
    pub fn date_diff(&self, other: impl Into<Expr>, unit: DurationUnit) -> FrameResult<Expr> {
        if !unit.supports_date_diff() {
            return Err(FrameError::validation(format!(
                "Unsupported DATE DIFF unit: {}",
                unit.name()
            )));
        }
        self.binary(
            BinaryOp::DateDiff(unit),
            other.into(),
            (Expected::Date, Expected::Date),
            PrimitiveType::Integer,
        )
    }

    /// `self` shifted by `amount` units; negative amounts move backwards.
    pub fn adjust(&self, amount: impl Into<Expr>, unit: DurationUnit) -> FrameResult<Expr> {
        self.binary(
            BinaryOp::DateAdd(unit),
            amount.into(),
            (Expected::Date, Expected::Integer),
            PrimitiveType::Date,
        )
    }

    /// Start of the `size`-unit bucket that contains `self`.
    pub fn time_bucket(&self, size: i64, unit: DurationUnit) -> FrameResult<Expr> {
        if size <= 0 {
            return Err(FrameError::validation(format!(
                "time_bucket size should be a positive integer. Got {size}"
            )));
        }
        self.binary(
            BinaryOp::TimeBucket(unit),
            Expr::from(size),
            (Expected::Date, Expected::Integer),
            PrimitiveType::Date,
        )
    }
}

// =============================================================================
// Any Type
// =============================================================================

impl Expr {
    pub fn is_null(&self) -> Expr {
        Expr::new(
            ExprKind::Unary {
                op: UnaryOp::IsEmpty,
                operand: Box::new(self.clone()),
            },
            PrimitiveType::Boolean,
            true,
        )
    }

    pub fn is_not_null(&self) -> Expr {
        Expr::new(
            ExprKind::Unary {
                op: UnaryOp::IsNotEmpty,
                operand: Box::new(self.clone()),
            },
            PrimitiveType::Boolean,
            true,
        )
    }

    /// `CAST` to another primitive type, subject to the cast matrix.
    pub fn cast(&self, target: impl Into<CastTarget>) -> FrameResult<Expr> {
        let target = target.into();
        if !is_cast_allowed(self.ty, target.ty) {
            return Err(FrameError::validation(format!(
                "Cannot cast expression {} from {} to {}",
                self.pure_text(),
                self.ty,
                target.ty
            )));
        }
        let ty = target.ty;
        Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Cast(target),
                operand: Box::new(self.clone()),
            },
            ty,
            false,
        ))
    }

    /// `if condition then value else otherwise`.
    pub fn if_else(
        condition: impl Into<Expr>,
        value: impl Into<Expr>,
        otherwise: impl Into<Expr>,
    ) -> FrameResult<Expr> {
        Expr::case(vec![(condition.into(), value.into())], otherwise)
    }

    /// First branch whose condition holds, else `otherwise`. All values
    /// must share one type family.
    pub fn case(branches: Vec<(Expr, Expr)>, otherwise: impl Into<Expr>) -> FrameResult<Expr> {
        let otherwise = otherwise.into();
        if branches.is_empty() {
            return Err(FrameError::validation(
                "case expression needs at least one branch",
            ));
        }
        let family = otherwise.ty.family();
        let mut ty = otherwise.ty.core();
        for (condition, value) in &branches {
            if !condition.ty.is_boolean() {
                return Err(FrameError::type_error(format!(
                    "case condition should be a Boolean expression. Got value {} of type: {}",
                    condition.pure_text(),
                    condition.ty
                )));
            }
            if value.ty.family() != family {
                return Err(FrameError::type_error(format!(
                    "case values should all be {} expressions. Got value {} of type: {}",
                    Expected::for_family(family).name(),
                    value.pure_text(),
                    value.ty
                )));
            }
            ty = match family {
                TypeFamily::Numeric => PrimitiveType::numeric_join(ty, value.ty),
                TypeFamily::Date if ty != value.ty.core() => PrimitiveType::Date,
                _ => ty,
            };
        }
        Ok(Expr::new(
            ExprKind::Case {
                branches,
                otherwise: Box::new(otherwise),
            },
            ty,
            false,
        ))
    }

    /// Integer literal value, if this is one.
    pub(crate) fn as_integer_literal(&self) -> Option<i64> {
        match &self.kind {
            ExprKind::Literal(Literal::Integer(n)) => Some(*n),
            _ => None,
        }
    }
}
