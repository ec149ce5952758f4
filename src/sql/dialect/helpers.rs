//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};
use crate::expr::DurationUnit;
use crate::tds::{CastTarget, PrimitiveType};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// `[A-Za-z_][A-Za-z0-9_]*`: safe to write unquoted unless reserved.
pub fn is_simple_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: T-SQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// `NaN` / `Infinity` / `-Infinity` as a cast string.
pub fn format_special_float(f: f64, float_type: &str) -> String {
    let text = if f.is_nan() {
        "NaN"
    } else if f.is_sign_negative() {
        "-Infinity"
    } else {
        "Infinity"
    };
    format!("CAST('{}' AS {})", text, float_type)
}

// =============================================================================
// Pagination
// =============================================================================

/// `LIMIT n` and `OFFSET m` as separate clauses (standard SQL).
/// Used by: Postgres
pub fn limit_clauses_standard(limit: Option<u64>, offset: Option<u64>) -> Vec<TokenStream> {
    let mut clauses = Vec::new();

    if let Some(lim) = limit {
        let mut ts = TokenStream::new();
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(lim as i64));
        clauses.push(ts);
    }

    if let Some(off) = offset {
        let mut ts = TokenStream::new();
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64));
        clauses.push(ts);
    }

    clauses
}

/// `OFFSET m ROWS` and `FETCH NEXT n ROWS ONLY` (T-SQL style).
///
/// A limit without an offset is rendered as `TOP n` instead, see
/// [`top_clause_tsql`].
pub fn limit_clauses_tsql(limit: Option<u64>, offset: Option<u64>) -> Vec<TokenStream> {
    let Some(off) = offset else {
        return Vec::new();
    };

    let mut clauses = Vec::new();
    let mut ts = TokenStream::new();
    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(off as i64))
        .space()
        .push(Token::Rows);
    clauses.push(ts);

    if let Some(lim) = limit {
        let mut ts = TokenStream::new();
        ts.push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(lim as i64))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
        clauses.push(ts);
    }

    clauses
}

/// `TOP n` when there is a limit and no offset.
pub fn top_clause_tsql(limit: Option<u64>, offset: Option<u64>) -> Option<TokenStream> {
    match (limit, offset) {
        (Some(lim), None) => {
            let mut ts = TokenStream::new();
            ts.push(Token::Top).space().push(Token::LitInt(lim as i64));
            Some(ts)
        }
        _ => None,
    }
}

// =============================================================================
// Calls
// =============================================================================

/// `NAME(arg1, arg2, ...)`.
pub fn call(name: &str, args: Vec<TokenStream>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.into())).lparen();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(arg);
    }
    ts.rparen();
    ts
}

/// `CAST(value AS type)`.
pub fn cast(value: TokenStream, type_name: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Cast)
        .lparen()
        .append(&value)
        .space()
        .push(Token::As)
        .space()
        .push(Token::Raw(type_name.into()))
        .rparen();
    ts
}

/// `(left op right)`.
pub fn binary(left: TokenStream, op: Token, right: TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.lparen()
        .append(&left)
        .space()
        .push(op)
        .space()
        .append(&right)
        .rparen();
    ts
}

pub fn raw(s: impl Into<String>) -> TokenStream {
    TokenStream::from(Token::Raw(s.into()))
}

pub fn lit_str(s: &str) -> TokenStream {
    TokenStream::from(Token::LitString(s.into()))
}

pub fn lit_int(n: i64) -> TokenStream {
    TokenStream::from(Token::LitInt(n))
}

// =============================================================================
// Function Remapping
// =============================================================================

/// Remap functions for T-SQL dialect.
pub fn remap_function_tsql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "CHAR_LENGTH" => Some("LEN"),
        "CEIL" => Some("CEILING"),
        "LN" => Some("LOG"),
        "ATAN2" => Some("ATN2"),
        "BTRIM" => Some("TRIM"),
        "STDDEV_SAMP" => Some("STDEV"),
        "STDDEV_POP" => Some("STDEVP"),
        "VAR_SAMP" => Some("VAR"),
        "VAR_POP" => Some("VARP"),
        _ => None,
    }
}

// =============================================================================
// Data Type Emission
// =============================================================================

fn with_params(base: &str, target: &CastTarget) -> String {
    if target.params.is_empty() {
        base.to_string()
    } else {
        let params: Vec<String> = target.params.iter().map(|p| p.to_string()).collect();
        format!("{}({})", base, params.join(", "))
    }
}

/// Cast target type for Postgres.
pub fn cast_type_postgres(target: &CastTarget) -> String {
    match target.ty {
        PrimitiveType::Integer | PrimitiveType::Int | PrimitiveType::USmallInt => {
            "INTEGER".into()
        }
        PrimitiveType::BigInt | PrimitiveType::UInt => "BIGINT".into(),
        PrimitiveType::TinyInt | PrimitiveType::UTinyInt | PrimitiveType::SmallInt => {
            "SMALLINT".into()
        }
        PrimitiveType::UBigInt => "NUMERIC".into(),
        PrimitiveType::Float | PrimitiveType::Double => "DOUBLE PRECISION".into(),
        PrimitiveType::Float4 => "REAL".into(),
        PrimitiveType::Number | PrimitiveType::Numeric => with_params("NUMERIC", target),
        PrimitiveType::Decimal => with_params("DECIMAL", target),
        PrimitiveType::String => "TEXT".into(),
        PrimitiveType::Varchar => with_params("VARCHAR", target),
        PrimitiveType::Boolean => "BOOLEAN".into(),
        PrimitiveType::Date | PrimitiveType::StrictDate => "DATE".into(),
        PrimitiveType::DateTime | PrimitiveType::Timestamp => "TIMESTAMP".into(),
    }
}

/// Cast target type for T-SQL.
pub fn cast_type_tsql(target: &CastTarget) -> String {
    match target.ty {
        PrimitiveType::Integer | PrimitiveType::Int | PrimitiveType::USmallInt => "INT".into(),
        PrimitiveType::BigInt | PrimitiveType::UInt => "BIGINT".into(),
        PrimitiveType::TinyInt | PrimitiveType::UTinyInt => "TINYINT".into(),
        PrimitiveType::SmallInt => "SMALLINT".into(),
        PrimitiveType::UBigInt => "DECIMAL(20, 0)".into(),
        PrimitiveType::Float | PrimitiveType::Double => "FLOAT".into(),
        PrimitiveType::Float4 => "REAL".into(),
        PrimitiveType::Number | PrimitiveType::Numeric => with_params("NUMERIC", target),
        PrimitiveType::Decimal => with_params("DECIMAL", target),
        PrimitiveType::String => "NVARCHAR(MAX)".into(),
        PrimitiveType::Varchar => with_params("VARCHAR", target),
        PrimitiveType::Boolean => "BIT".into(),
        PrimitiveType::Date | PrimitiveType::StrictDate => "DATE".into(),
        PrimitiveType::DateTime | PrimitiveType::Timestamp => "DATETIME2".into(),
    }
}

// =============================================================================
// Date Arithmetic
// =============================================================================

/// `INTERVAL 'n UNIT'` (Postgres).
pub fn interval_literal(amount: i64, unit: DurationUnit) -> Option<TokenStream> {
    let unit = match unit {
        DurationUnit::Nanoseconds => return None,
        other => other.singular(),
    };
    Some(raw(format!("INTERVAL '{} {}'", amount, unit)))
}

/// T-SQL datepart keyword for a duration unit.
pub fn tsql_datepart(unit: DurationUnit) -> &'static str {
    match unit {
        DurationUnit::Years => "year",
        DurationUnit::Months => "month",
        DurationUnit::Weeks => "week",
        DurationUnit::Days => "day",
        DurationUnit::Hours => "hour",
        DurationUnit::Minutes => "minute",
        DurationUnit::Seconds => "second",
        DurationUnit::Milliseconds => "millisecond",
        DurationUnit::Microseconds => "microsecond",
        DurationUnit::Nanoseconds => "nanosecond",
    }
}
