//! Expression algebra, exercised through computed columns so that both
//! the SQL and the Pure renderings are checked end to end.

use chrono::NaiveDate;
use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::integer("n"),
            TdsColumn::float("x"),
            TdsColumn::string("name"),
            TdsColumn::strict_date("day"),
            TdsColumn::boolean("active"),
        ],
    )
    .unwrap()
}

/// Extend with one column and return its type, SQL text and Pure lambda.
fn lowered(
    map: impl Fn(&TdsRow) -> FrameResult<Expr>,
) -> (PrimitiveType, String, String) {
    let f = frame().extend(vec![ColumnSpec::new("v", map)]).unwrap();
    let ty = f.columns().last().unwrap().primitive_type().unwrap();
    let sql = f.to_sql_query(&FrameToSqlConfig::compact()).unwrap();
    Parser::parse_sql(&PostgreSqlDialect {}, &sql)
        .unwrap_or_else(|e| panic!("invalid SQL: {e}\n{sql}"));
    let item = sql
        .split_once("\"root\".active AS \"active\", ")
        .and_then(|(_, rest)| rest.split_once(" AS \"v\""))
        .map(|(item, _)| item.to_string())
        .unwrap();
    let pure = f.to_pure_query(&FrameToPureConfig::new(false));
    let lambda = pure
        .split_once("~v:")
        .map(|(_, l)| l.trim_end_matches(')').to_string())
        .unwrap();
    (ty, item, lambda)
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn test_integer_arithmetic() {
    let (ty, sql, pure) = lowered(|r| r.get_integer("n")?.add(1)?.mul(3));
    assert_eq!(ty, PrimitiveType::Integer);
    assert_eq!(sql, "((\"root\".n + 1) * 3)");
    assert_eq!(pure, "{r | (toOne($r.n) + 1) * 3}");
}

#[test]
fn test_division_is_number() {
    let (ty, sql, _) = lowered(|r| r.get_integer("n")?.div(2));
    assert_eq!(ty, PrimitiveType::Number);
    assert_eq!(sql, "((1.0 * \"root\".n) / 2)");
}

#[test]
fn test_mixed_numeric_widening() {
    let (ty, _, _) = lowered(|r| r.get_integer("n")?.add(r.get_float("x")?));
    assert_eq!(ty, PrimitiveType::Number);
    let (ty, _, _) = lowered(|r| r.get_float("x")?.sub(0.5));
    assert_eq!(ty, PrimitiveType::Float);
}

#[test]
fn test_math_functions() {
    let (ty, sql, pure) = lowered(|r| r.get_float("x")?.abs()?.sqrt());
    assert_eq!(ty, PrimitiveType::Float);
    assert_eq!(sql, "SQRT(ABS(\"root\".x))");
    assert_eq!(pure, "{r | toOne($r.x)->abs()->sqrt()}");
}

#[test]
fn test_arithmetic_type_error() {
    let err = frame()
        .extend(vec![ColumnSpec::new("v", |r| r.get_integer("n")?.add(true))])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
    assert!(err
        .to_string()
        .contains("Integer plus (+) parameter should be a Number expression."));
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_concat_and_case() {
    let (ty, sql, pure) = lowered(|r| r.get_string("name")?.add("!")?.lower());
    assert_eq!(ty, PrimitiveType::String);
    assert_eq!(sql, "LOWER(CONCAT(\"root\".name, '!'))");
    assert_eq!(pure, "{r | (toOne($r.name) + '!')->toLower()}");
}

#[test]
fn test_string_predicates() {
    let (ty, sql, pure) = lowered(|r| r.get_string("name")?.ends_with("son"));
    assert_eq!(ty, PrimitiveType::Boolean);
    assert_eq!(sql, "(\"root\".name LIKE '%son')");
    assert_eq!(pure, "{r | $r.name->endsWith('son')}");
}

#[test]
fn test_string_length() {
    let (ty, sql, _) = lowered(|r| r.get_string("name")?.trim()?.length());
    assert_eq!(ty, PrimitiveType::Integer);
    assert_eq!(sql, "CHAR_LENGTH(BTRIM(\"root\".name))");
}

#[test]
fn test_string_method_on_number() {
    let err = frame()
        .extend(vec![ColumnSpec::new("v", |r| r.get_integer("n")?.upper())])
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("'toUpper' function can only be called on String expressions."));
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn test_date_literal_comparison() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let f = frame()
        .filter(|r| r.get_strict_date("day")?.gte(day))
        .unwrap();
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(test_schema.test_table)#->filter({r | $r.day >= %2024-03-01})"
    );
}

#[test]
fn test_date_parts() {
    let (ty, sql, pure) = lowered(|r| r.get_strict_date("day")?.year());
    assert_eq!(ty, PrimitiveType::Integer);
    assert_eq!(sql, "DATE_PART('year', \"root\".day)");
    assert_eq!(pure, "{r | toOne($r.day)->year()}");
}

#[test]
fn test_adjust_negative_amount() {
    let (_, _, pure) = lowered(|r| r.get_strict_date("day")?.adjust(-3, DurationUnit::Months));
    assert_eq!(pure, "{r | toOne($r.day)->adjust(minus(3), DurationUnit.MONTHS)}");
}

// =============================================================================
// Booleans and Conditionals
// =============================================================================

#[test]
fn test_boolean_connectives() {
    let (ty, sql, pure) = lowered(|r| {
        r.get_boolean("active")?
            .and(r.get_integer("n")?.ne(0)?)?
            .not()
    });
    assert_eq!(ty, PrimitiveType::Boolean);
    assert!(sql.starts_with("NOT"));
    assert!(sql.contains("(\"root\".active AND (\"root\".n <> 0))"));
    assert_eq!(pure, "{r | (toOne($r.active) && ($r.n != 0))->not()}");
}

#[test]
fn test_if_else_branch_types_must_agree() {
    let err = frame()
        .extend(vec![ColumnSpec::new("v", |r| {
            Expr::if_else(r.get_boolean("active")?, 1, "one")
        })])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
}

#[test]
fn test_null_checks() {
    let (ty, sql, pure) = lowered(|r| Ok(r.get_string("name")?.is_null()));
    assert_eq!(ty, PrimitiveType::Boolean);
    assert_eq!(sql, "(\"root\".name IS NULL)");
    assert_eq!(pure, "{r | $r.name->isEmpty()}");
}
