//! Column selection, dropping and renaming, plus distinct.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::integer("col1"),
            TdsColumn::string("col2"),
            TdsColumn::float("col3"),
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

fn pure(frame: &TdsFrame) -> String {
    frame.to_pure_query(&FrameToPureConfig::new(false))
}

// =============================================================================
// Select
// =============================================================================

#[test]
fn test_select_then_filter() {
    let f = frame()
        .select(&["col2", "col1"])
        .unwrap()
        .filter(|r| r.get_integer("col1")?.gt(0))
        .unwrap();
    assert_eq!(f.column_names(), vec!["col2", "col1"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col2 AS \"col2\", \"root\".col1 AS \"col1\" \
         FROM test_schema.test_table AS \"root\" WHERE (\"root\".col1 > 0)"
    );
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->select(~[col2, col1])->filter({r | $r.col1 > 0})"
    );
}

#[test]
fn test_filter_columns_items() {
    let f = frame()
        .filter_columns(ColumnFilter::Items(vec!["col3".into()]))
        .unwrap();
    assert_eq!(f.column_names(), vec!["col3"]);
}

#[test]
fn test_filter_columns_no_match() {
    let err = frame()
        .filter_columns(ColumnFilter::Like("zzz".into()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No columns match the pattern 'zzz'. Available: ['col1', 'col2', 'col3']"
    );
}

// =============================================================================
// Drop and Rename
// =============================================================================

#[test]
fn test_drop_columns() {
    let f = frame().drop(&["col1", "col3"], Axis::Columns).unwrap();
    assert_eq!(f.column_names(), vec!["col2"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col2 AS \"col2\" FROM test_schema.test_table AS \"root\""
    );
}

#[test]
fn test_rename_then_filter_uses_new_name() {
    let f = frame()
        .rename(&[("col1", "id")])
        .unwrap()
        .filter(|r| r.get_integer("id")?.gt(1))
        .unwrap();
    assert_eq!(f.column_names(), vec!["id", "col2", "col3"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col1 AS \"id\", \"root\".col2 AS \"col2\", \"root\".col3 AS \"col3\" \
         FROM test_schema.test_table AS \"root\" WHERE (\"root\".col1 > 1)"
    );
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->rename(~col1, ~id)->filter({r | $r.id > 1})"
    );
}

#[test]
fn test_rename_with_mapper() {
    let f = frame().rename_with(|c| c.to_uppercase()).unwrap();
    assert_eq!(f.column_names(), vec!["COL1", "COL2", "COL3"]);
}

#[test]
fn test_rename_errors() {
    let err = frame().rename(&[("nope", "x")]).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Column - 'nope' in rename columns list doesn't exist"));

    let err = frame().rename(&[("col1", "x"), ("col2", "x")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err
        .to_string()
        .starts_with("renamed_column_names_list list shouldn't have duplicates"));
}

// =============================================================================
// Distinct
// =============================================================================

#[test]
fn test_distinct_columns_then_head() {
    let f = frame()
        .distinct_columns(&["col2"])
        .unwrap()
        .head(3)
        .unwrap();
    assert_eq!(f.column_names(), vec!["col2"]);
    let sql = compact(&f);
    assert!(sql.starts_with("SELECT \"root\".\"col2\" AS \"col2\" FROM (SELECT DISTINCT"));
    assert!(sql.ends_with("LIMIT 3"));
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->select(~[col2])->distinct()->limit(3)"
    );
}

#[test]
fn test_distinct_twice_keeps_columns() {
    let once = frame().distinct().unwrap();
    let twice = once.distinct().unwrap();
    assert_eq!(twice.columns(), once.columns());
    insta::assert_snapshot!(compact(&twice), @r###"SELECT DISTINCT "root".col1 AS "col1", "root".col2 AS "col2", "root".col3 AS "col3" FROM test_schema.test_table AS "root""###);
}
