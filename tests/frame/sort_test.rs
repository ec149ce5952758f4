//! Sorting by names, sort infos and sort lambdas.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![TdsColumn::integer("col1"), TdsColumn::string("col2")],
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
fn test_sort_then_head_same_block() {
    let f = frame()
        .sort(&["col1"], &["descending"])
        .unwrap()
        .head(5)
        .unwrap();
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\" \
         FROM test_schema.test_table AS \"root\" ORDER BY \"root\".col1 DESC LIMIT 5"
    );
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::default()),
        "#Table(test_schema.test_table)#\n  ->sort([descending(~col1)])\n  ->limit(5)"
    );
}

#[test]
fn test_second_sort_replaces_first() {
    let f = frame()
        .sort(&["col1"], &[])
        .unwrap()
        .sort(&["col2"], &[])
        .unwrap();
    let sql = compact(&f);
    assert!(sql.ends_with("ORDER BY \"root\".col2"));
    assert_eq!(sql.matches("ORDER BY").count(), 1);
}

#[test]
fn test_sort_by_infos() {
    let f = frame()
        .sort_by(vec![SortInfo::desc("col2"), SortInfo::asc("col1")])
        .unwrap();
    assert!(compact(&f).ends_with("ORDER BY \"root\".col2 DESC, \"root\".col1"));
}

#[test]
fn test_sort_with_names_and_columns() {
    let f = frame()
        .sort_with(|r| Ok(vec!["col2".into(), r.get("col1")?.into()]))
        .unwrap();
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(test_schema.test_table)#->sort([ascending(~col2), ascending(~col1)])"
    );
}

#[test]
fn test_sort_with_rejects_expressions() {
    let err = frame()
        .sort_with(|r| Ok(vec![r.get_integer("col1")?.add(1)?.into()]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(err
        .to_string()
        .ends_with("Element at index 0 in the list is incompatible."));
}

#[test]
fn test_sort_validation() {
    let err = frame().sort_by(vec![]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'sort' function sort_infos argument should not be empty"
    );
    let err = frame().sort_by(vec![SortInfo::asc("zz")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
