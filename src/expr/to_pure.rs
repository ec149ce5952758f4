//! Rendering expressions as Pure text.
//!
//! Most functions are written in arrow form (`$r.col->abs()`); arithmetic,
//! comparisons and boolean connectives are infix and fully parenthesized.
//! A nullable operand of a function that needs exactly one value is
//! wrapped in `toOne(..)`.

use super::{AggregateOp, BinaryOp, Expr, ExprKind, Literal, UnaryOp, COLLECTION_VAR};
use crate::config::FrameToPureConfig;
use crate::pure::{
    escape_column_name, functional_call, string_literal, strip_outer_parens, to_one,
};

impl Expr {
    pub fn to_pure(&self, _config: &FrameToPureConfig) -> String {
        self.render()
    }

    /// Compact Pure text, used in error messages.
    pub(crate) fn pure_text(&self) -> String {
        self.to_pure(&FrameToPureConfig::new(false))
    }

    fn render(&self) -> String {
        match &self.kind {
            ExprKind::Literal(lit) => literal(lit),

            ExprKind::Column(col) => format!(
                "{}.{}",
                col.access.pure_row(&col.frame),
                escape_column_name(&col.name)
            ),

            ExprKind::Unary { op, operand } => {
                let value = operand.operand(op.operand_must_be_non_nullable());
                match op {
                    UnaryOp::DatePart => format!(
                        "{}->cast(@StrictDate)",
                        functional_call("datePart", &[value], false)
                    ),
                    UnaryOp::Cast(target) => {
                        functional_call("cast", &[value, format!("@{target}")], false)
                    }
                    _ => functional_call(op.pure_name(), &[value], false),
                }
            }

            ExprKind::Binary { op, left, right } => {
                let must = op.operands_must_be_non_nullable();
                let l = left.operand(must);
                match op {
                    BinaryOp::DateAdd(unit) => {
                        let amount = match right.as_integer_literal() {
                            Some(n) if n < 0 => format!("minus({})", -n),
                            _ => right.operand(must),
                        };
                        functional_call("adjust", &[l, amount, unit.to_pure()], false)
                    }
                    BinaryOp::DateDiff(unit) => {
                        functional_call("dateDiff", &[l, right.operand(must), unit.to_pure()], false)
                    }
                    BinaryOp::TimeBucket(unit) => functional_call(
                        "timeBucket",
                        &[l, right.operand(must), unit.to_pure()],
                        false,
                    ),
                    BinaryOp::Round => format!(
                        "cast({}, @Float)->round({})",
                        strip_outer_parens(&l),
                        strip_outer_parens(&right.operand(must))
                    ),
                    _ => {
                        let r = right.operand(must);
                        match infix(*op) {
                            Some(symbol) => format!("({l} {symbol} {r})"),
                            None => functional_call(arrow_name(*op), &[l, r], false),
                        }
                    }
                }
            }

            ExprKind::Nary { op, operands } => {
                let args: Vec<String> = operands.iter().map(|o| o.operand(true)).collect();
                functional_call(op.pure_name(), &args, false)
            }

            ExprKind::Today => "today()".to_string(),
            ExprKind::Now => "now()".to_string(),

            ExprKind::Case {
                branches,
                otherwise,
            } => branches
                .iter()
                .rev()
                .fold(otherwise.render(), |acc, (cond, value)| {
                    format!(
                        "if({}, |{}, |{})",
                        strip_outer_parens(&cond.render()),
                        strip_outer_parens(&value.render()),
                        strip_outer_parens(&acc)
                    )
                }),

            ExprKind::Aggregate { op, .. } => {
                let c = format!("${COLLECTION_VAR}");
                match op {
                    AggregateOp::DistinctCount => format!("{c}->distinct()->count()"),
                    AggregateOp::JoinStrings(sep) => {
                        format!("{c}->joinStrings({})", string_literal(sep))
                    }
                    _ => format!("{c}->{}()", op.pure_name()),
                }
            }

            ExprKind::Rank { function, row } => function.to_pure(row),
        }
    }

    fn operand(&self, must_be_non_nullable: bool) -> String {
        let text = self.render();
        if must_be_non_nullable && !self.non_nullable {
            to_one(&text)
        } else {
            text
        }
    }
}

fn literal(lit: &Literal) -> String {
    match lit {
        Literal::Boolean(b) => b.to_string(),
        Literal::Integer(n) => n.to_string(),
        Literal::Float(f) => {
            let mut buf = ryu::Buffer::new();
            buf.format(*f).to_string()
        }
        Literal::String(s) => string_literal(s),
        Literal::StrictDate(d) => format!("%{}", d.format("%Y-%m-%d")),
        Literal::DateTime(dt) => format!("%{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
    }
}

fn infix(op: BinaryOp) -> Option<&'static str> {
    let symbol = match op {
        BinaryOp::Add | BinaryOp::Concat => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Lt => "<",
        BinaryOp::Lte => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Gte => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        _ => return None,
    };
    Some(symbol)
}

fn arrow_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Mod => "mod",
        BinaryOp::Rem => "rem",
        BinaryOp::Pow => "pow",
        BinaryOp::Atan2 => "atan2",
        BinaryOp::StartsWith => "startsWith",
        BinaryOp::EndsWith => "endsWith",
        BinaryOp::Contains => "contains",
        BinaryOp::Left => "left",
        BinaryOp::Right => "right",
        BinaryOp::Substring => "substring",
        BinaryOp::IndexOf => "indexOf",
        _ => op.describe(),
    }
}
