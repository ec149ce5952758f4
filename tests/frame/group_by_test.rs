//! Grouping and aggregation, both the lambda form and the pandas-style
//! `groupby(..).aggregate(..)` form.

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
// group_by
// =============================================================================

#[test]
fn test_group_by_multiple_aggregates() {
    let f = frame()
        .group_by(
            &["col2"],
            vec![
                AggregateSpec::new("total", |r| r.get("col1"), |c| c.sum()),
                AggregateSpec::new("avg3", |r| r.get("col3"), |c| c.average()),
            ],
        )
        .unwrap();
    assert_eq!(f.column_names(), vec!["col2", "total", "avg3"]);
    assert_eq!(f.columns()[1].primitive_type(), Some(PrimitiveType::Integer));
    assert_eq!(f.columns()[2].primitive_type(), Some(PrimitiveType::Float));
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col2 AS \"col2\", SUM(\"root\".col1) AS \"total\", \
         AVG(\"root\".col3) AS \"avg3\" FROM test_schema.test_table AS \"root\" \
         GROUP BY \"root\".col2"
    );
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#->groupBy(~[col2], \
         ~[total:{r | $r.col1}:{c | $c->sum()}, avg3:{r | $r.col3}:{c | $c->average()}])"
    );
}

#[test]
fn test_filter_after_group_by_nests() {
    let f = frame()
        .group_by(
            &["col2"],
            vec![AggregateSpec::new("n", |r| r.get("col1"), |c| Ok(c.count()))],
        )
        .unwrap()
        .filter(|r| r.get_integer("n")?.gt(1))
        .unwrap();
    assert_eq!(
        compact(&f),
        "SELECT \"root\".\"col2\" AS \"col2\", \"root\".\"n\" AS \"n\" \
         FROM (SELECT \"root\".col2 AS \"col2\", COUNT(\"root\".col1) AS \"n\" \
         FROM test_schema.test_table AS \"root\" GROUP BY \"root\".col2) AS \"root\" \
         WHERE (\"root\".\"n\" > 1)"
    );
}

#[test]
fn test_sort_after_group_by_stays_in_block() {
    let f = frame()
        .group_by(
            &["col2"],
            vec![AggregateSpec::new("n", |r| r.get("col1"), |c| Ok(c.count()))],
        )
        .unwrap()
        .sort(&["n"], &["desc"])
        .unwrap();
    let sql = compact(&f);
    assert_eq!(sql.matches("SELECT").count(), 1);
    assert!(sql.ends_with("GROUP BY \"root\".col2 ORDER BY COUNT(\"root\".col1) DESC"));
}

#[test]
fn test_aggregate_lambda_type_error() {
    let err = frame()
        .group_by(
            &["col1"],
            vec![AggregateSpec::new("s", |r| r.get("col2"), |c| c.sum())],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
}

// =============================================================================
// groupby(..).aggregate(..)
// =============================================================================

#[test]
fn test_groupby_named_aggregate() {
    let f = frame().groupby(&["col2"]).unwrap().aggregate("max").unwrap();
    assert_eq!(f.column_names(), vec!["col2", "max(col1)", "max(col3)"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".col2 AS \"col2\", MAX(\"root\".col1) AS \"max(col1)\", \
         MAX(\"root\".col3) AS \"max(col3)\" FROM test_schema.test_table AS \"root\" \
         GROUP BY \"root\".col2 ORDER BY \"root\".col2"
    );
}

#[test]
fn test_groupby_selected_column() {
    let f = frame()
        .groupby(&["col2"])
        .unwrap()
        .select(&["col1"])
        .unwrap()
        .aggregate(vec![AggOp::named("sum"), AggOp::named("nunique")])
        .unwrap();
    assert_eq!(f.column_names(), vec!["col2", "sum(col1)", "nunique(col1)"]);
    assert!(compact(&f).contains("COUNT(DISTINCT \"root\".col1) AS \"nunique(col1)\""));
}

#[test]
fn test_groupby_unknown_aggregate() {
    let err = frame()
        .groupby(&["col2"])
        .unwrap()
        .aggregate("median")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err
        .to_string()
        .contains("The string 'median' does not correspond to any supported aggregation."));
}

#[test]
fn test_groupby_validation() {
    let empty: [&str; 0] = [];
    assert!(frame().groupby(&empty).is_err());
    assert!(frame().groupby(&["zz"]).is_err());
    assert!(frame().groupby(&["col2"]).unwrap().select(&["zz"]).is_err());
}

#[test]
fn test_whole_frame_aggregate_per_column() {
    let f = frame()
        .aggregate(AggregateFunc::PerColumn(vec![
            ("col1".into(), vec![AggOp::named("min")]),
            ("col3".into(), vec![AggOp::function("top", |c| c.max())]),
        ]))
        .unwrap();
    assert_eq!(f.column_names(), vec!["min(col1)", "top(col3)"]);
    assert_eq!(
        compact(&f),
        "SELECT MIN(\"root\".col1) AS \"min(col1)\", MAX(\"root\".col3) AS \"top(col3)\" \
         FROM test_schema.test_table AS \"root\""
    );
}
