//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (Postgres), `[]` (T-SQL)
//! - Pagination: LIMIT/OFFSET vs TOP vs OFFSET FETCH
//! - Boolean literals: true/false vs 1/0
//! - Date arithmetic: DATE_TRUNC/DATE_PART/intervals vs DATETRUNC/DATEPART/DATEADD
//!
//! # Usage
//!
//! ```ignore
//! use frameql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "Postgres".parse()?;
//! let quoted = dialect.quote_identifier("root");  // "root"
//! ```
//!
//! Dialects are selected per render call through
//! [`FrameToSqlConfig`](crate::config::FrameToSqlConfig); there is no
//! process-wide registry.

pub mod helpers;
mod postgres;
mod tsql;

pub use postgres::Postgres;
pub use tsql::TSql;

use std::fmt;
use std::str::FromStr;

use super::expr::{DatePartField, DateTruncUnit};
use super::token::TokenStream;
use crate::error::{FrameError, FrameResult};
use crate::expr::DurationUnit;
use crate::tds::CastTarget;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow Postgres/ANSI SQL where possible.
pub trait SqlDialect: fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - Postgres: `"identifier"`
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Lower-case words that must be quoted when used as identifiers.
    fn reserved_keywords(&self) -> &'static [&'static str];

    /// Write a source identifier, quoting it only when it is reserved or
    /// not a plain identifier.
    fn format_identifier(&self, ident: &str) -> String {
        let lower = ident.to_lowercase();
        if !helpers::is_simple_identifier(ident)
            || self.reserved_keywords().contains(&lower.as_str())
        {
            self.quote_identifier(ident)
        } else {
            ident.to_string()
        }
    }

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    /// Override for Unicode prefix (T-SQL N'...').
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - Postgres: `true`/`false`
    /// - T-SQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format NaN and the infinities, which have no literal syntax.
    fn format_special_float(&self, f: f64) -> String;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Row limit written in the select list (`SELECT TOP n`), if the
    /// dialect uses one for this limit/offset pair.
    fn top_clause(&self, _limit: Option<u64>, _offset: Option<u64>) -> Option<TokenStream> {
        None
    }

    /// Trailing pagination clauses, each written on its own line.
    ///
    /// - Postgres: `LIMIT n`, `OFFSET m` (default)
    /// - T-SQL: `OFFSET m ROWS`, `FETCH NEXT n ROWS ONLY`
    fn limit_clauses(&self, limit: Option<u64>, offset: Option<u64>) -> Vec<TokenStream> {
        helpers::limit_clauses_standard(limit, offset)
    }

    /// Whether OFFSET requires ORDER BY (T-SQL requirement).
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Functions and Types
    // =========================================================================

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be renamed,
    /// or `None` to use the original name.
    fn remap_function(&self, _name: &str) -> Option<&'static str> {
        None
    }

    /// Type name used in `CAST(.. AS type)`.
    fn cast_type(&self, target: &CastTarget) -> String;

    /// Integer remainder.
    fn modulo(&self, left: TokenStream, right: TokenStream) -> TokenStream {
        helpers::call("MOD", vec![left, right])
    }

    /// 1-based position of `needle` in `haystack`, 0 when absent.
    fn string_position(&self, haystack: TokenStream, needle: TokenStream) -> TokenStream {
        helpers::call("STRPOS", vec![haystack, needle])
    }

    // =========================================================================
    // Dates
    // =========================================================================

    fn current_date(&self) -> TokenStream {
        helpers::raw("CURRENT_DATE")
    }

    fn current_timestamp(&self) -> TokenStream {
        helpers::raw("CURRENT_TIMESTAMP")
    }

    /// Truncate a date to the start of a unit.
    fn date_trunc(&self, unit: DateTruncUnit, value: TokenStream) -> TokenStream {
        helpers::call("DATE_TRUNC", vec![helpers::lit_str(unit.as_str()), value])
    }

    /// Extract a numeric field from a date.
    fn date_part(&self, field: DatePartField, value: TokenStream) -> TokenStream {
        helpers::call("DATE_PART", vec![helpers::lit_str(field.as_str()), value])
    }

    /// `value` shifted by `amount` units.
    fn date_add(
        &self,
        unit: DurationUnit,
        amount: TokenStream,
        value: TokenStream,
    ) -> FrameResult<TokenStream>;

    /// Whole units elapsed from `start` to `end`.
    fn date_diff(
        &self,
        unit: DurationUnit,
        start: TokenStream,
        end: TokenStream,
    ) -> FrameResult<TokenStream>;

    /// Start of the `size`-unit bucket that contains `value`.
    fn time_bucket(
        &self,
        unit: DurationUnit,
        size: i64,
        value: TokenStream,
    ) -> FrameResult<TokenStream>;

    /// Interval used as a RANGE frame offset.
    fn interval_literal(&self, amount: i64, unit: DurationUnit) -> FrameResult<TokenStream>;
}

/// SQL dialect enum for runtime dialect selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Postgres,
    TSql,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::TSql => &TSql,
        }
    }

    /// Database type name used in configuration.
    pub fn database_type(&self) -> &'static str {
        match self {
            Dialect::Postgres => "Postgres",
            Dialect::TSql => "TSql",
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn reserved_keywords(&self) -> &'static [&'static str] {
        self.dialect().reserved_keywords()
    }

    fn format_identifier(&self, ident: &str) -> String {
        self.dialect().format_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_special_float(&self, f: f64) -> String {
        self.dialect().format_special_float(f)
    }

    fn top_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<TokenStream> {
        self.dialect().top_clause(limit, offset)
    }

    fn limit_clauses(&self, limit: Option<u64>, offset: Option<u64>) -> Vec<TokenStream> {
        self.dialect().limit_clauses(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }

    fn cast_type(&self, target: &CastTarget) -> String {
        self.dialect().cast_type(target)
    }

    fn modulo(&self, left: TokenStream, right: TokenStream) -> TokenStream {
        self.dialect().modulo(left, right)
    }

    fn string_position(&self, haystack: TokenStream, needle: TokenStream) -> TokenStream {
        self.dialect().string_position(haystack, needle)
    }

    fn current_date(&self) -> TokenStream {
        self.dialect().current_date()
    }

    fn current_timestamp(&self) -> TokenStream {
        self.dialect().current_timestamp()
    }

    fn date_trunc(&self, unit: DateTruncUnit, value: TokenStream) -> TokenStream {
        self.dialect().date_trunc(unit, value)
    }

    fn date_part(&self, field: DatePartField, value: TokenStream) -> TokenStream {
        self.dialect().date_part(field, value)
    }

    fn date_add(
        &self,
        unit: DurationUnit,
        amount: TokenStream,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        self.dialect().date_add(unit, amount, value)
    }

    fn date_diff(
        &self,
        unit: DurationUnit,
        start: TokenStream,
        end: TokenStream,
    ) -> FrameResult<TokenStream> {
        self.dialect().date_diff(unit, start, end)
    }

    fn time_bucket(
        &self,
        unit: DurationUnit,
        size: i64,
        value: TokenStream,
    ) -> FrameResult<TokenStream> {
        self.dialect().time_bucket(unit, size, value)
    }

    fn interval_literal(&self, amount: i64, unit: DurationUnit) -> FrameResult<TokenStream> {
        self.dialect().interval_literal(amount, unit)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.database_type())
    }
}

impl FromStr for Dialect {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Dialect::Postgres),
            "tsql" => Ok(Dialect::TSql),
            _ => Err(FrameError::validation(format!(
                "Found no (or multiple) sql to string generators for database type '{s}'"
            ))),
        }
    }
}
