//! Lowering expressions to the SQL metamodel.
//!
//! Column references are resolved against the select list of the query
//! bound to their row alias: the reference lowers to whatever expression
//! that query projects under the column's name. Window functions pick up
//! the `OVER` clause from the context.

use super::{AggregateOp, BinaryOp, ColumnRef, Expr, ExprKind, Literal, RowAccess, UnaryOp};
use crate::error::{FrameError, FrameResult};
use crate::sql::{
    self, ArithmeticOp, ComparisonOp, DatePartField, DateTruncUnit, QuerySpecification, SqlExpr,
};
use crate::tds::PrimitiveType;

/// Row aliases in scope while lowering one expression.
#[derive(Debug, Clone, Default)]
pub struct SqlContext<'a> {
    frames: Vec<(&'a str, &'a QuerySpecification)>,
    window: Option<&'a sql::Window>,
}

impl<'a> SqlContext<'a> {
    pub fn new(alias: &'a str, query: &'a QuerySpecification) -> Self {
        Self {
            frames: vec![(alias, query)],
            window: None,
        }
    }

    pub fn with_frame(mut self, alias: &'a str, query: &'a QuerySpecification) -> Self {
        self.frames.push((alias, query));
        self
    }

    /// Attach `OVER (window)` to window functions and aggregates.
    pub fn with_window(mut self, window: &'a sql::Window) -> Self {
        self.window = Some(window);
        self
    }

    fn column(&self, col: &ColumnRef) -> FrameResult<SqlExpr> {
        let (_, query) = self
            .frames
            .iter()
            .find(|(alias, _)| *alias == col.frame)
            .ok_or_else(|| {
                FrameError::schema(format!(
                    "Row '{}' is not in scope for column '{}'",
                    col.frame, col.name
                ))
            })?;
        query
            .select
            .item(&col.name)
            .map(|item| item.expression.clone())
            .ok_or_else(|| FrameError::schema(format!("Cannot find column: {}", col.name)))
    }

    fn windowed(&self, function: &str, call: SqlExpr) -> FrameResult<SqlExpr> {
        match self.window {
            Some(window) => Ok(call.over(window.clone())),
            None => Err(FrameError::validation(format!(
                "Window function '{function}' can only be used in window_extend"
            ))),
        }
    }
}

impl Expr {
    pub fn to_sql(&self, ctx: &SqlContext<'_>) -> FrameResult<SqlExpr> {
        match &self.kind {
            ExprKind::Literal(lit) => Ok(literal(lit)),

            ExprKind::Column(col) => {
                let value = ctx.column(col)?;
                match col.access.sql_function(value.clone()) {
                    Some(call) => ctx.windowed(access_name(col.access), call),
                    None => Ok(value),
                }
            }

            ExprKind::Unary { op, operand } => Ok(unary(op, operand.to_sql(ctx)?)),

            ExprKind::Binary { op, left, right } => binary(*op, left.to_sql(ctx)?, right, ctx),
            ExprKind::Nary { op, operands } => {
                let args = operands
                    .iter()
                    .map(|o| o.to_sql(ctx))
                    .collect::<FrameResult<Vec<_>>>()?;
                Ok(SqlExpr::function(op.sql_name(), args))
            }

            ExprKind::Today => Ok(SqlExpr::CurrentDate),
            ExprKind::Now => Ok(SqlExpr::CurrentTimestamp),

            ExprKind::Case {
                branches,
                otherwise,
            } => {
                let when_clauses = branches
                    .iter()
                    .map(|(c, v)| Ok((c.to_sql(ctx)?, v.to_sql(ctx)?)))
                    .collect::<FrameResult<Vec<_>>>()?;
                Ok(SqlExpr::Case {
                    when_clauses,
                    else_clause: Some(Box::new(otherwise.to_sql(ctx)?)),
                })
            }

            ExprKind::Aggregate { op, operand } => {
                let value = operand.to_sql(ctx)?;
                let call = match op {
                    AggregateOp::DistinctCount => SqlExpr::FunctionCall {
                        name: op.sql_name().into(),
                        args: vec![value],
                        distinct: true,
                    },
                    AggregateOp::JoinStrings(sep) => {
                        SqlExpr::function(op.sql_name(), vec![value, SqlExpr::string(sep.clone())])
                    }
                    _ => SqlExpr::function(op.sql_name(), vec![value]),
                };
                match ctx.window {
                    Some(window) => Ok(call.over(window.clone())),
                    None => Ok(call),
                }
            }

            ExprKind::Rank { function, .. } => {
                let args = match function {
                    super::RankFunction::Ntile(n) => vec![SqlExpr::integer(*n)],
                    _ => vec![],
                };
                ctx.windowed(function.sql_name(), SqlExpr::function(function.sql_name(), args))
            }
        }
    }
}

fn access_name(access: RowAccess) -> &'static str {
    match access {
        RowAccess::Current => "current",
        RowAccess::Lead => "lead",
        RowAccess::Lag => "lag",
        RowAccess::First => "first",
        RowAccess::Last => "last",
        RowAccess::Nth(_) => "nth",
    }
}

fn literal(lit: &Literal) -> SqlExpr {
    match lit {
        Literal::Boolean(b) => SqlExpr::boolean(*b),
        Literal::Integer(n) => SqlExpr::integer(*n),
        Literal::Float(f) => SqlExpr::double(*f),
        Literal::String(s) => SqlExpr::string(s.clone()),
        Literal::StrictDate(d) => {
            SqlExpr::string(d.format("%Y-%m-%d").to_string()).cast(PrimitiveType::StrictDate)
        }
        Literal::DateTime(dt) => SqlExpr::string(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            .cast(PrimitiveType::DateTime),
    }
}

fn call(name: &str, value: SqlExpr) -> SqlExpr {
    SqlExpr::function(name, vec![value])
}

fn trunc(unit: DateTruncUnit, value: SqlExpr) -> SqlExpr {
    SqlExpr::DateTrunc {
        unit,
        value: Box::new(value),
    }
}

fn part(field: DatePartField, value: SqlExpr) -> SqlExpr {
    SqlExpr::DatePart {
        field,
        value: Box::new(value),
    }
}

/// `SUBSTRING(value, start, CHAR_LENGTH(value))`
fn substring_from(value: SqlExpr, start: SqlExpr) -> SqlExpr {
    let length = call("CHAR_LENGTH", value.clone());
    SqlExpr::function("SUBSTRING", vec![value, start, length])
}

fn unary(op: &UnaryOp, value: SqlExpr) -> SqlExpr {
    match op {
        UnaryOp::Negate => SqlExpr::Negative(Box::new(value)),
        UnaryOp::Abs => call("ABS", value),
        UnaryOp::Ceiling => call("CEIL", value),
        UnaryOp::Floor => call("FLOOR", value),
        UnaryOp::Sign => call("SIGN", value),
        UnaryOp::Sqrt => call("SQRT", value),
        UnaryOp::Cbrt => call("CBRT", value),
        UnaryOp::Exp => call("EXP", value),
        UnaryOp::Ln => call("LN", value),
        UnaryOp::Log10 => call("LOG10", value),
        UnaryOp::Sin => call("SIN", value),
        UnaryOp::Cos => call("COS", value),
        UnaryOp::Tan => call("TAN", value),
        UnaryOp::Asin => call("ASIN", value),
        UnaryOp::Acos => call("ACOS", value),
        UnaryOp::Atan => call("ATAN", value),
        UnaryOp::Cot => call("COT", value),
        UnaryOp::Round => call("ROUND", value),

        UnaryOp::Not => SqlExpr::Not(Box::new(value)),

        UnaryOp::Upper => call("UPPER", value),
        UnaryOp::Lower => call("LOWER", value),
        UnaryOp::LTrim => call("LTRIM", value),
        UnaryOp::RTrim => call("RTRIM", value),
        UnaryOp::Trim => call("BTRIM", value),
        UnaryOp::Length => call("CHAR_LENGTH", value),
        UnaryOp::ParseInteger => value.cast(PrimitiveType::Integer),
        UnaryOp::ParseFloat => value.cast(PrimitiveType::Float),
        UnaryOp::ParseBoolean => value.cast(PrimitiveType::Boolean),
        UnaryOp::ParseDateTime => value.cast(PrimitiveType::DateTime),
        UnaryOp::Ascii => call("ASCII", value),
        UnaryOp::Reverse => call("REVERSE", value),
        UnaryOp::LowerFirst | UnaryOp::UpperFirst => {
            let case_fn = if matches!(op, UnaryOp::LowerFirst) {
                "LOWER"
            } else {
                "UPPER"
            };
            let head = call(
                case_fn,
                SqlExpr::function("LEFT", vec![value.clone(), SqlExpr::integer(1)]),
            );
            let tail = substring_from(value, SqlExpr::integer(2));
            SqlExpr::function("CONCAT", vec![head, tail])
        }

        UnaryOp::IsEmpty => value.is_null(),
        UnaryOp::IsNotEmpty => value.is_not_null(),

        UnaryOp::FirstDayOfYear => trunc(DateTruncUnit::Year, value),
        UnaryOp::FirstDayOfQuarter => trunc(DateTruncUnit::Quarter, value),
        UnaryOp::FirstDayOfMonth => trunc(DateTruncUnit::Month, value),
        UnaryOp::FirstDayOfWeek => trunc(DateTruncUnit::Week, value),
        UnaryOp::FirstHourOfDay => trunc(DateTruncUnit::Day, value),
        UnaryOp::FirstMinuteOfHour => trunc(DateTruncUnit::Hour, value),
        UnaryOp::FirstSecondOfMinute => trunc(DateTruncUnit::Minute, value),
        UnaryOp::FirstMillisecondOfSecond => trunc(DateTruncUnit::Second, value),

        UnaryOp::Year => part(DatePartField::Year, value),
        UnaryOp::Quarter => part(DatePartField::Quarter, value),
        UnaryOp::Month => part(DatePartField::Month, value),
        UnaryOp::WeekOfYear => part(DatePartField::Week, value),
        UnaryOp::DayOfYear => part(DatePartField::DayOfYear, value),
        UnaryOp::DayOfMonth => part(DatePartField::Day, value),
        UnaryOp::DayOfWeek => part(DatePartField::DayOfWeek, value),
        UnaryOp::Hour => part(DatePartField::Hour, value),
        UnaryOp::Minute => part(DatePartField::Minute, value),
        UnaryOp::Second => part(DatePartField::Second, value),
        UnaryOp::EpochValue => part(DatePartField::Epoch, value),
        UnaryOp::DatePart => value.cast(PrimitiveType::StrictDate),

        UnaryOp::Cast(target) => value.cast(target.clone()),
    }
}

/// Escape `LIKE` wildcards in a literal.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn like_pattern(op: BinaryOp, right: &Expr) -> FrameResult<String> {
    let ExprKind::Literal(Literal::String(s)) = right.kind() else {
        return Err(FrameError::type_error(format!(
            "{} parameter should be a string literal",
            op.describe()
        )));
    };
    let escaped = escape_like(s);
    Ok(match op {
        BinaryOp::StartsWith => format!("{escaped}%"),
        BinaryOp::EndsWith => format!("%{escaped}"),
        _ => format!("%{escaped}%"),
    })
}

fn binary(
    op: BinaryOp,
    left: SqlExpr,
    right_expr: &Expr,
    ctx: &SqlContext<'_>,
) -> FrameResult<SqlExpr> {
    if matches!(
        op,
        BinaryOp::StartsWith | BinaryOp::EndsWith | BinaryOp::Contains
    ) {
        return Ok(SqlExpr::Like {
            value: Box::new(left),
            pattern: like_pattern(op, right_expr)?,
        });
    }
    if let BinaryOp::TimeBucket(unit) = op {
        let size = right_expr.as_integer_literal().ok_or_else(|| {
            FrameError::type_error("time_bucket size should be an integer literal")
        })?;
        return Ok(SqlExpr::TimeBucket {
            unit,
            size,
            value: Box::new(left),
        });
    }

    let right = right_expr.to_sql(ctx)?;
    let expr = match op {
        BinaryOp::Add => SqlExpr::arithmetic(ArithmeticOp::Add, left, right),
        BinaryOp::Sub => SqlExpr::arithmetic(ArithmeticOp::Sub, left, right),
        BinaryOp::Mul => SqlExpr::arithmetic(ArithmeticOp::Mul, left, right),
        BinaryOp::Div => SqlExpr::arithmetic(
            ArithmeticOp::Div,
            SqlExpr::arithmetic(ArithmeticOp::Mul, SqlExpr::double(1.0), left),
            right,
        ),
        BinaryOp::Mod => {
            let inner = SqlExpr::arithmetic(ArithmeticOp::Mod, left, right.clone());
            let shifted = SqlExpr::arithmetic(ArithmeticOp::Add, inner, right.clone());
            SqlExpr::arithmetic(ArithmeticOp::Mod, shifted, right)
        }
        BinaryOp::Rem => SqlExpr::arithmetic(ArithmeticOp::Mod, left, right),
        BinaryOp::Pow => SqlExpr::function("POWER", vec![left, right]),
        BinaryOp::Atan2 => SqlExpr::function("ATAN2", vec![left, right]),
        BinaryOp::Round => SqlExpr::function("ROUND", vec![left, right]),

        BinaryOp::Lt => SqlExpr::comparison(ComparisonOp::Lt, left, right),
        BinaryOp::Lte => SqlExpr::comparison(ComparisonOp::Lte, left, right),
        BinaryOp::Gt => SqlExpr::comparison(ComparisonOp::Gt, left, right),
        BinaryOp::Gte => SqlExpr::comparison(ComparisonOp::Gte, left, right),
        BinaryOp::Eq => SqlExpr::comparison(ComparisonOp::Eq, left, right),
        BinaryOp::Ne => SqlExpr::comparison(ComparisonOp::Ne, left, right),

        BinaryOp::And => left.and(right),
        BinaryOp::Or => left.or(right),

        BinaryOp::Concat => SqlExpr::function("CONCAT", vec![left, right]),
        BinaryOp::Left => SqlExpr::function("LEFT", vec![left, right]),
        BinaryOp::Right => SqlExpr::function("RIGHT", vec![left, right]),
        BinaryOp::Substring => substring_from(left, right),
        BinaryOp::IndexOf => SqlExpr::StringPosition {
            haystack: Box::new(left),
            needle: Box::new(right),
        },

        BinaryOp::DateDiff(unit) => SqlExpr::DateDiff {
            unit,
            start: Box::new(left),
            end: Box::new(right),
        },
        BinaryOp::DateAdd(unit) => SqlExpr::DateAdd {
            unit,
            amount: Box::new(right),
            value: Box::new(left),
        },

        BinaryOp::StartsWith
        | BinaryOp::EndsWith
        | BinaryOp::Contains
        | BinaryOp::TimeBucket(_) => unreachable!("handled above"),
    };
    Ok(expr)
}
