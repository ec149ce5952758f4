//! Row filtering.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::integer("col1"),
            TdsColumn::string("col2"),
            TdsColumn::strict_date("col3"),
        ],
    )
    .unwrap()
}

fn compact(frame: &TdsFrame) -> String {
    let sql = frame.to_sql_query(&FrameToSqlConfig::compact()).unwrap();
    Parser::parse_sql(&PostgreSqlDialect {}, &sql)
        .unwrap_or_else(|e| panic!("invalid SQL: {e}\n{sql}"));
    sql
}

#[test]
fn test_filter_pretty() {
    let f = frame()
        .filter(|r| r.get_integer("col1")?.gt(10))
        .unwrap()
        .head(5)
        .unwrap();
    let sql = f.to_sql_query(&FrameToSqlConfig::default()).unwrap();
    insta::assert_snapshot!(sql, @r###"
    SELECT
        "root".col1 AS "col1",
        "root".col2 AS "col2",
        "root".col3 AS "col3"
    FROM
        test_schema.test_table AS "root"
    WHERE
        ("root".col1 > 10)
    LIMIT 5
    "###);
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::default()),
        "#Table(test_schema.test_table)#\n  ->filter({r | $r.col1 > 10})\n  ->limit(5)"
    );
}

#[test]
fn test_compound_predicate() {
    let f = frame()
        .filter(|r| {
            r.get_integer("col1")?
                .gt(1)?
                .and(r.get_string("col2")?.eq("x")?)
        })
        .unwrap();
    assert!(compact(&f).ends_with("WHERE ((\"root\".col1 > 1) AND (\"root\".col2 = 'x'))"));
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(test_schema.test_table)#->filter({r | ($r.col1 > 1) && ($r.col2 == 'x')})"
    );
}

#[test]
fn test_filters_merge_into_one_where() {
    let f = frame()
        .filter(|r| r.get_integer("col1")?.gt(1))
        .unwrap()
        .filter(|r| Ok(r.get_string("col2")?.is_not_null()))
        .unwrap();
    let sql = compact(&f);
    assert_eq!(sql.matches("WHERE").count(), 1);
    assert!(sql.contains("(\"root\".col2 IS NOT NULL)"));
}

#[test]
fn test_filter_keeps_columns() {
    let f = frame().filter(|r| r.get_integer("col1")?.lt(0)).unwrap();
    assert_eq!(f.column_names(), frame().column_names());
    assert_eq!(f.depth(), 1);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_non_boolean_predicate() {
    let err = frame().filter(|r| r.get_string("col2")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(
        err.to_string(),
        "Filter function incompatible. Returns non boolean - String"
    );
}

#[test]
fn test_mistyped_column_access() {
    let err = frame().filter(|r| r.get_integer("col2")?.gt(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
}

#[test]
fn test_comparison_type_mismatch() {
    let err = frame().filter(|r| r.get_integer("col1")?.gt("x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
}
