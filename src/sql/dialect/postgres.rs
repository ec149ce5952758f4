//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used by the emitter:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - `LIMIT` / `OFFSET`
//! - `DATE_TRUNC`, `DATE_PART` and interval arithmetic
//! - `DATE_BIN` for time buckets (14+)

use super::helpers::{self, binary, call, cast, lit_int, lit_str, raw};
use super::SqlDialect;
use crate::error::{FrameError, FrameResult};
use crate::expr::DurationUnit;
use crate::sql::token::{Token, TokenStream};
use crate::tds::CastTarget;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "both", "by", "case", "cast", "check", "column",
    "cross", "date", "default", "desc", "distinct", "else", "end", "false", "first", "from",
    "full", "group", "having", "in", "inner", "is", "join", "kerberos", "leading", "left",
    "like", "limit", "not", "null", "offset", "on", "or", "order", "outer", "over", "right",
    "select", "table", "then", "to", "trailing", "true", "union", "user", "when", "where",
    "window", "with",
];

fn date_part(field: &str, value: &TokenStream) -> TokenStream {
    call("DATE_PART", vec![lit_str(field), value.clone()])
}

fn part_diff(field: &str, start: &TokenStream, end: &TokenStream) -> TokenStream {
    binary(date_part(field, end), Token::Minus, date_part(field, start))
}

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn format_special_float(&self, f: f64) -> String {
        helpers::format_special_float(f, "DOUBLE PRECISION")
    }

    // Uses default limit_clauses (LIMIT ..., OFFSET ...)

    fn cast_type(&self, target: &CastTarget) -> String {
        helpers::cast_type_postgres(target)
    }

    fn date_add(
        &self,
        unit: DurationUnit,
        amount: TokenStream,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        let interval = helpers::interval_literal(1, unit).ok_or_else(|| {
            FrameError::unsupported(format!("Unsupported DATE ADD unit for Postgres: {}", unit.name()))
        })?;
        Ok(binary(value, Token::Plus, binary(interval, Token::Mul, amount)))
    }

    fn date_diff(
        &self,
        unit: DurationUnit,
        start: TokenStream,
        end: TokenStream,
    ) -> FrameResult<TokenStream> {
        let days = || {
            binary(
                cast(end.clone(), "DATE"),
                Token::Minus,
                cast(start.clone(), "DATE"),
            )
        };
        let epoch_floor = |divisor: i64| {
            let diff = part_diff("epoch", &start, &end);
            let scaled = if divisor == 1 {
                diff
            } else {
                binary(diff, Token::Div, lit_int(divisor))
            };
            call("FLOOR", vec![scaled])
        };

        Ok(match unit {
            DurationUnit::Years => part_diff("year", &start, &end),
            DurationUnit::Months => binary(
                binary(part_diff("year", &start, &end), Token::Mul, lit_int(12)),
                Token::Plus,
                part_diff("month", &start, &end),
            ),
            DurationUnit::Weeks => call("FLOOR", vec![binary(days(), Token::Div, lit_int(7))]),
            DurationUnit::Days => days(),
            DurationUnit::Hours => epoch_floor(3600),
            DurationUnit::Minutes => epoch_floor(60),
            DurationUnit::Seconds => epoch_floor(1),
            other => {
                return Err(FrameError::unsupported(format!(
                    "Unsupported DATE DIFF unit: {}",
                    other.name()
                )))
            }
        })
    }

    fn time_bucket(
        &self,
        unit: DurationUnit,
        size: i64,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        let unsupported = || {
            FrameError::unsupported(format!(
                "Unsupported TIME BUCKET unit for Postgres: {}",
                unit.name()
            ))
        };
        if matches!(unit, DurationUnit::Years | DurationUnit::Months) {
            return Err(unsupported());
        }
        let interval = helpers::interval_literal(size, unit).ok_or_else(unsupported)?;
        Ok(call(
            "DATE_BIN",
            vec![interval, value, raw("TIMESTAMP '1970-01-01'")],
        ))
    }

    fn interval_literal(&self, amount: i64, unit: DurationUnit) -> FrameResult<TokenStream> {
        helpers::interval_literal(amount, unit).ok_or_else(|| {
            FrameError::unsupported(format!("Unsupported interval unit for Postgres: {}", unit.name()))
        })
    }
}
