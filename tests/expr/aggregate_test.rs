//! Collection aggregates as they appear in group_by and extend.

use frameql::prelude::*;
use sqlparser::dialect::{MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["sales", "orders"],
        vec![
            TdsColumn::string("region"),
            TdsColumn::string("customer"),
            TdsColumn::integer("units"),
            TdsColumn::float("price"),
            TdsColumn::strict_date("ordered"),
        ],
    )
    .unwrap()
}

fn by_region(aggregates: Vec<AggregateSpec>) -> TdsFrame {
    frame().group_by(&["region"], aggregates).unwrap()
}

fn compact(frame: &TdsFrame) -> String {
    let sql = frame.to_sql_query(&FrameToSqlConfig::compact()).unwrap();
    Parser::parse_sql(&PostgreSqlDialect {}, &sql)
        .unwrap_or_else(|e| panic!("invalid SQL: {e}\n{sql}"));
    sql
}

#[test]
fn test_aggregate_over_mapped_expression() {
    let f = by_region(vec![AggregateSpec::new(
        "revenue",
        |r| r.get_float("price")?.mul(r.get_integer("units")?),
        |c| c.sum(),
    )]);
    assert_eq!(f.columns()[1].primitive_type(), Some(PrimitiveType::Number));
    assert!(compact(&f).contains("SUM((\"root\".price * \"root\".units)) AS \"revenue\""));
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(sales.orders)#->groupBy(~[region], \
         ~[revenue:{r | toOne($r.price) * toOne($r.units)}:{c | $c->sum()}])"
    );
}

#[test]
fn test_count_and_distinct_count() {
    let f = by_region(vec![
        AggregateSpec::new("orders", |r| r.get("units"), |c| Ok(c.count())),
        AggregateSpec::new("customers", |r| r.get("customer"), |c| Ok(c.distinct_count())),
    ]);
    let sql = compact(&f);
    assert!(sql.contains("COUNT(\"root\".units) AS \"orders\""));
    assert!(sql.contains("COUNT(DISTINCT \"root\".customer) AS \"customers\""));
    assert!(f
        .to_pure_query(&FrameToPureConfig::new(false))
        .contains("customers:{r | $r.customer}:{c | $c->distinct()->count()}"));
}

#[test]
fn test_join_strings() {
    let f = by_region(vec![AggregateSpec::new(
        "names",
        |r| r.get("customer"),
        |c| c.join_strings(";"),
    )]);
    assert_eq!(f.columns()[1].primitive_type(), Some(PrimitiveType::String));
    assert!(compact(&f).contains("STRING_AGG(\"root\".customer, ';') AS \"names\""));
    assert!(f
        .to_pure_query(&FrameToPureConfig::new(false))
        .contains("names:{r | $r.customer}:{c | $c->joinStrings(';')}"));
}

#[test]
fn test_min_max_keep_ordered_types() {
    let f = by_region(vec![
        AggregateSpec::new("first_order", |r| r.get("ordered"), |c| c.min()),
        AggregateSpec::new("top_customer", |r| r.get("customer"), |c| c.max()),
    ]);
    let types: Vec<Option<PrimitiveType>> =
        f.columns().iter().map(|c| c.primitive_type()).collect();
    assert_eq!(
        types,
        vec![
            Some(PrimitiveType::String),
            Some(PrimitiveType::StrictDate),
            Some(PrimitiveType::String),
        ]
    );
}

#[test]
fn test_statistics_in_tsql() {
    let f = by_region(vec![
        AggregateSpec::new("sd", |r| r.get("price"), |c| c.std_dev_sample()),
        AggregateSpec::new("vp", |r| r.get("price"), |c| c.variance_population()),
    ]);
    assert!(compact(&f).contains("STDDEV_SAMP(\"root\".price) AS \"sd\""));

    let tsql = f
        .to_sql_query(&FrameToSqlConfig::compact().with_dialect(Dialect::TSql))
        .unwrap();
    assert!(tsql.contains("STDEV([root].price) AS [sd]"));
    assert!(tsql.contains("VARP([root].price) AS [vp]"));
    Parser::parse_sql(&MsSqlDialect {}, &tsql).unwrap();
}

#[test]
fn test_aggregate_type_errors() {
    let err = frame()
        .group_by(
            &["region"],
            vec![AggregateSpec::new("s", |r| r.get("customer"), |c| c.sum())],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);
    assert!(err.to_string().contains(
        "'sum' can only be applied to a collection of Number values. Got collection of String values"
    ));

    let err = frame()
        .group_by(
            &["region"],
            vec![AggregateSpec::new("j", |r| r.get("units"), |c| c.join_strings(","))],
        )
        .unwrap_err();
    assert!(err.to_string().contains("collection of String values"));
}

#[test]
fn test_collection_over_literal() {
    let total = Collection::new(Expr::from(1)).count();
    assert_eq!(total.ty(), PrimitiveType::Integer);
    assert_eq!(
        total.to_pure(&FrameToPureConfig::default()),
        "$c->count()"
    );
    assert!(total.contains_aggregate());
}
