//! Computed columns: extend, project and assign.

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
// Extend
// =============================================================================

#[test]
fn test_extend_then_filter_on_new_column() {
    let f = frame()
        .extend(vec![ColumnSpec::new("double", |r| r.get_integer("col1")?.mul(2))])
        .unwrap()
        .filter(|r| r.get_integer("double")?.gt(4))
        .unwrap();
    assert_eq!(f.column_names(), vec!["col1", "col2", "col3", "double"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\", \"root\".col3 AS \"col3\", \
         (\"root\".col1 * 2) AS \"double\" FROM test_schema.test_table AS \"root\" \
         WHERE ((\"root\".col1 * 2) > 4)"
    );
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->extend(~double:{r | toOne($r.col1) * 2})\
         ->filter({r | $r.double > 4})"
    );
}

#[test]
fn test_extend_column_types() {
    let f = frame()
        .extend(vec![
            ColumnSpec::new("ratio", |r| r.get_integer("col1")?.div(r.get_float("col3")?)),
            ColumnSpec::new("name_len", |r| r.get_string("col2")?.length()),
            ColumnSpec::new("flag", |r| r.get_float("col3")?.gte(1.5)),
        ])
        .unwrap();
    let types: Vec<Option<PrimitiveType>> =
        f.columns()[3..].iter().map(|c| c.primitive_type()).collect();
    assert_eq!(
        types,
        vec![
            Some(PrimitiveType::Number),
            Some(PrimitiveType::Integer),
            Some(PrimitiveType::Boolean),
        ]
    );
    compact(&f);
}

#[test]
fn test_extend_if_else() {
    let f = frame()
        .extend(vec![ColumnSpec::new("size", |r| {
            Expr::if_else(r.get_integer("col1")?.gt(100)?, "big", "small")
        })])
        .unwrap();
    assert_eq!(f.columns()[3].primitive_type(), Some(PrimitiveType::String));
    assert!(compact(&f).contains(
        "CASE WHEN (\"root\".col1 > 100) THEN 'big' ELSE 'small' END AS \"size\""
    ));
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->extend(~size:{r | if($r.col1 > 100, |'big', |'small')})"
    );
}

#[test]
fn test_extend_errors() {
    let err = frame().extend(vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = frame()
        .extend(vec![ColumnSpec::new("x", |r| r.get_string("col2")?.add(1))])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
}

#[test]
fn test_extend_after_group_by_nests() {
    let f = frame()
        .group_by(
            &["col2"],
            vec![AggregateSpec::new("total", |r| r.get("col1"), |c| c.sum())],
        )
        .unwrap()
        .extend(vec![ColumnSpec::new("twice", |r| r.get_integer("total")?.mul(2))])
        .unwrap();
    assert_eq!(
        compact(&f),
        "SELECT \"root\".\"col2\" AS \"col2\", \"root\".\"total\" AS \"total\", \
         (\"root\".\"total\" * 2) AS \"twice\" \
         FROM (SELECT \"root\".col2 AS \"col2\", SUM(\"root\".col1) AS \"total\" \
         FROM test_schema.test_table AS \"root\" GROUP BY \"root\".col2) AS \"root\""
    );
}

// =============================================================================
// Project and Assign
// =============================================================================

#[test]
fn test_project_only_keeps_new_columns() {
    let f = frame()
        .project(vec![ColumnSpec::new("upper", |r| r.get_string("col2")?.upper())])
        .unwrap();
    assert_eq!(f.column_names(), vec!["upper"]);
    assert_eq!(
        compact(&f),
        "SELECT UPPER(\"root\".\"col2\") AS \"upper\" \
         FROM (SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\", \"root\".col3 AS \"col3\" \
         FROM test_schema.test_table AS \"root\") AS \"root\""
    );
}

#[test]
fn test_assign_replaces_existing() {
    let f = frame()
        .assign(vec![ColumnSpec::new("col3", |r| r.get_float("col3")?.round_to(1))])
        .unwrap();
    assert_eq!(f.column_names(), vec!["col1", "col2", "col3"]);
    assert_eq!(f.columns()[2].primitive_type(), Some(PrimitiveType::Float));
    assert!(pure(&f).starts_with("#Table(test_schema.test_table)#->project(~[col1:{r | $r.col1}"));
}
