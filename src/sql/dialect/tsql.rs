//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL has significant differences from Postgres:
//! - Square bracket identifier quoting (`[name]`)
//! - No boolean literals (1/0)
//! - TOP for simple limiting, OFFSET FETCH otherwise (requires ORDER BY)
//! - N'...' prefix for Unicode strings
//! - DATEPART/DATEADD/DATEDIFF with bare unit keywords
//! - `%` for remainder, CHARINDEX for string position

use super::helpers::{self, binary, call, cast, lit_int, raw};
use super::SqlDialect;
use crate::error::{FrameError, FrameResult};
use crate::expr::DurationUnit;
use crate::sql::expr::{DatePartField, DateTruncUnit};
use crate::sql::token::{Token, TokenStream};
use crate::tds::CastTarget;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "cast", "check", "column", "cross",
    "date", "default", "desc", "distinct", "else", "end", "file", "first", "from", "full",
    "group", "having", "in", "inner", "is", "join", "key", "left", "like", "not", "null",
    "on", "or", "order", "outer", "over", "percent", "right", "select", "table", "then",
    "to", "top", "union", "user", "when", "where", "with",
];

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn quote_string(&self, s: &str) -> String {
        // N'...' only when the text needs it
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_special_float(&self, f: f64) -> String {
        helpers::format_special_float(f, "FLOAT")
    }

    fn top_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<TokenStream> {
        helpers::top_clause_tsql(limit, offset)
    }

    fn limit_clauses(&self, limit: Option<u64>, offset: Option<u64>) -> Vec<TokenStream> {
        helpers::limit_clauses_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_tsql(name)
    }

    fn cast_type(&self, target: &CastTarget) -> String {
        helpers::cast_type_tsql(target)
    }

    fn modulo(&self, left: TokenStream, right: TokenStream) -> TokenStream {
        binary(left, Token::Raw("%".into()), right)
    }

    fn string_position(&self, haystack: TokenStream, needle: TokenStream) -> TokenStream {
        call("CHARINDEX", vec![needle, haystack])
    }

    fn current_date(&self) -> TokenStream {
        cast(raw("GETDATE()"), "DATE")
    }

    fn date_trunc(&self, unit: DateTruncUnit, value: TokenStream) -> TokenStream {
        call("DATETRUNC", vec![raw(unit.as_str()), value])
    }

    fn date_part(&self, field: DatePartField, value: TokenStream) -> TokenStream {
        match field {
            DatePartField::Epoch => call(
                "DATEDIFF",
                vec![raw("SECOND"), raw("'1970-01-01'"), value],
            ),
            // DATEPART(weekday) counts from 1
            DatePartField::DayOfWeek => binary(
                call("DATEPART", vec![raw("weekday"), value]),
                Token::Minus,
                lit_int(1),
            ),
            DatePartField::DayOfYear => call("DATEPART", vec![raw("dayofyear"), value]),
            other => call("DATEPART", vec![raw(other.as_str()), value]),
        }
    }

    fn date_add(
        &self,
        unit: DurationUnit,
        amount: TokenStream,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        Ok(call(
            "DATEADD",
            vec![raw(helpers::tsql_datepart(unit)), amount, value],
        ))
    }

    fn date_diff(
        &self,
        unit: DurationUnit,
        start: TokenStream,
        end: TokenStream,
    ) -> FrameResult<TokenStream> {
        Ok(call(
            "DATEDIFF",
            vec![raw(helpers::tsql_datepart(unit)), start, end],
        ))
    }

    fn time_bucket(
        &self,
        unit: DurationUnit,
        size: i64,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        Ok(call(
            "DATE_BUCKET",
            vec![raw(helpers::tsql_datepart(unit)), lit_int(size), value],
        ))
    }

    fn interval_literal(&self, _amount: i64, unit: DurationUnit) -> FrameResult<TokenStream> {
        Err(FrameError::unsupported(format!(
            "RANGE window frames with a {} offset are not supported for TSql",
            unit.name()
        )))
    }
}
