//! Parse-back checks for emitted SQL.

use sqlparser::dialect::{MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Panic with the offending text unless `sql` parses under `dialect`.
pub fn assert_parses(sql: &str, dialect: Dialect) {
    let parsed = match dialect {
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::TSql => Parser::parse_sql(&MsSqlDialect {}, sql),
    };
    if let Err(e) = parsed {
        panic!("{dialect} rejected emitted SQL: {e}\n{sql}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_both_dialects() {
        assert_parses("SELECT \"root\".a AS \"a\" FROM s.t AS \"root\"", Dialect::Postgres);
        assert_parses("SELECT TOP 3 [root].a AS [a] FROM s.t AS [root]", Dialect::TSql);
    }

    #[test]
    #[should_panic(expected = "rejected emitted SQL")]
    fn test_rejects_garbage() {
        assert_parses("SELEC * FORM users", Dialect::Postgres);
    }
}
