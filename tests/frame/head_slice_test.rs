//! Row range operations: head, limit, slice and truncate.

use frameql::prelude::*;
use sqlparser::dialect::{MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![TdsColumn::integer("col1"), TdsColumn::string("col2")],
    )
    .unwrap()
}

fn compact(frame: &TdsFrame) -> String {
    frame.to_sql_query(&FrameToSqlConfig::compact()).unwrap()
}

// =============================================================================
// Head
// =============================================================================

#[test]
fn test_head_of_head_nests_pretty() {
    let f = frame().head(10).unwrap().head(20).unwrap();
    let sql = f.to_sql_query(&FrameToSqlConfig::default()).unwrap();
    insta::assert_snapshot!(sql, @r###"
    SELECT
        "root"."col1" AS "col1",
        "root"."col2" AS "col2"
    FROM
        (
            SELECT
                "root".col1 AS "col1",
                "root".col2 AS "col2"
            FROM
                test_schema.test_table AS "root"
            LIMIT 10
        ) AS "root"
    LIMIT 20
    "###);
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();

    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::default()),
        "#Table(test_schema.test_table)#\n  ->limit(10)\n  ->limit(20)"
    );
}

#[test]
fn test_limit_is_head() {
    assert_eq!(compact(&frame().limit(3).unwrap()), compact(&frame().head(3).unwrap()));
}

#[test]
fn test_head_keeps_columns() {
    let f = frame().head(0).unwrap();
    assert_eq!(f.column_names(), vec!["col1", "col2"]);
    assert!(compact(&f).ends_with("LIMIT 0"));
}

#[test]
fn test_head_tsql_uses_top() {
    let f = frame().head(10).unwrap();
    let sql = f
        .to_sql_query(&FrameToSqlConfig::compact().with_dialect(Dialect::TSql))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT TOP 10 [root].col1 AS [col1], [root].col2 AS [col2] \
         FROM test_schema.test_table AS [root]"
    );
    Parser::parse_sql(&MsSqlDialect {}, &sql).unwrap();
}

// =============================================================================
// Slice and Truncate
// =============================================================================

#[test]
fn test_slice_offsets() {
    let f = frame().slice(2, 5).unwrap();
    let sql = compact(&f);
    assert!(sql.ends_with("LIMIT 3 OFFSET 2"));
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();

    let tsql = f
        .to_sql_query(&FrameToSqlConfig::compact().with_dialect(Dialect::TSql))
        .unwrap();
    assert!(tsql.ends_with("ORDER BY (SELECT NULL) OFFSET 2 ROWS FETCH NEXT 3 ROWS ONLY"));
}

#[test]
fn test_slice_validation() {
    let err = frame().slice(-1, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "Start row argument of slice function cannot be negative. Start row: -1"
    );

    let err = frame().slice(5, 5).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("End row argument of slice function cannot be less than or equal to start row"));
}

#[test]
fn test_truncate() {
    let f = frame().truncate(None, Some(1)).unwrap();
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(test_schema.test_table)#->slice(0, 2)"
    );

    let err = frame().truncate(Some(4), Some(2)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The 'before' parameter of the truncate function must be less than or equal to \
         the 'after' parameter, but got: before=4, after=2"
    );
}

#[test]
fn test_filter_after_head_nests() {
    let f = frame()
        .head(5)
        .unwrap()
        .filter(|r| r.get_integer("col1")?.gt(1))
        .unwrap();
    assert_eq!(
        compact(&f),
        "SELECT \"root\".\"col1\" AS \"col1\", \"root\".\"col2\" AS \"col2\" \
         FROM (SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\" \
         FROM test_schema.test_table AS \"root\" LIMIT 5) AS \"root\" \
         WHERE (\"root\".\"col1\" > 1)"
    );
}
