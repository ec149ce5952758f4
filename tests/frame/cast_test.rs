//! Column casts.

use frameql::prelude::*;
use sqlparser::dialect::{MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::integer("qty"),
            TdsColumn::float("price"),
            TdsColumn::string("code"),
            TdsColumn::strict_date("day"),
        ],
    )
    .unwrap()
}

#[test]
fn test_cast_multiple_columns() {
    let f = frame()
        .cast(&[
            ("price", CastTarget::with_params(PrimitiveType::Decimal, [12, 4])),
            ("code", CastTarget::with_params(PrimitiveType::Varchar, [20])),
        ])
        .unwrap();
    let types: Vec<Option<PrimitiveType>> = f.columns().iter().map(|c| c.primitive_type()).collect();
    assert_eq!(
        types,
        vec![
            Some(PrimitiveType::Integer),
            Some(PrimitiveType::Decimal),
            Some(PrimitiveType::Varchar),
            Some(PrimitiveType::StrictDate),
        ]
    );

    let sql = f.to_sql_query(&FrameToSqlConfig::compact()).unwrap();
    assert!(sql.contains("CAST(\"root\".price AS DECIMAL(12, 4)) AS \"price\""));
    assert!(sql.contains("CAST(\"root\".code AS VARCHAR(20)) AS \"code\""));
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();

    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(test_schema.test_table)#\
         ->cast(@meta::pure::metamodel::relation::Relation<\
         (qty:Integer, price:Decimal(12, 4), code:Varchar(20), day:StrictDate)>)"
    );
}

#[test]
fn test_cast_tsql() {
    let f = frame().cast(&[("qty", PrimitiveType::BigInt)]).unwrap();
    let sql = f
        .to_sql_query(&FrameToSqlConfig::compact().with_dialect(Dialect::TSql))
        .unwrap();
    assert!(sql.starts_with("SELECT CAST([root].qty AS BIGINT) AS [qty]"));
    Parser::parse_sql(&MsSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_cast_number_to_string() {
    let f = frame().cast(&[("qty", PrimitiveType::String)]).unwrap();
    assert_eq!(f.columns()[0].primitive_type(), Some(PrimitiveType::String));
    let f = f.filter(|r| r.get_string("qty")?.starts_with("1")).unwrap();
    assert!(f
        .to_sql_query(&FrameToSqlConfig::compact())
        .unwrap()
        .contains("WHERE (CAST(\"root\".qty AS TEXT) LIKE '1%')"));
}

#[test]
fn test_cast_after_group_by_nests_aggregate() {
    let f = frame()
        .group_by(
            &["code"],
            vec![AggregateSpec::new("total", |r| r.get("qty"), |c| c.sum())],
        )
        .unwrap()
        .cast(&[("total", PrimitiveType::BigInt)])
        .unwrap();
    let sql = f.to_sql_query(&FrameToSqlConfig::compact()).unwrap();
    assert!(sql.starts_with(
        "SELECT \"root\".\"code\" AS \"code\", \
         CAST(\"root\".\"total\" AS BIGINT) AS \"total\" FROM (SELECT"
    ));
    assert!(sql.contains("SUM(\"root\".qty) AS \"total\""));
    assert!(sql.ends_with(") AS \"root\""));
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_cast_after_distinct_dedups_first() {
    let f = TdsFrame::table(["s", "t"], vec![TdsColumn::number("x")])
        .unwrap()
        .distinct()
        .unwrap()
        .cast(&[("x", PrimitiveType::Integer)])
        .unwrap();
    let sql = f.to_sql_query(&FrameToSqlConfig::default()).unwrap();
    insta::assert_snapshot!(sql, @r###"
    SELECT
        CAST("root"."x" AS INTEGER) AS "x"
    FROM
        (
            SELECT DISTINCT
                "root".x AS "x"
            FROM
                s.t AS "root"
        ) AS "root"
    "###);
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
    assert_eq!(
        f.to_pure_query(&FrameToPureConfig::new(false)),
        "#Table(s.t)#->distinct()\
         ->cast(@meta::pure::metamodel::relation::Relation<(x:Integer)>)"
    );
}

#[test]
fn test_cast_after_head_stays_in_place() {
    let sql = frame()
        .head(5)
        .unwrap()
        .cast(&[("qty", PrimitiveType::BigInt)])
        .unwrap()
        .to_sql_query(&FrameToSqlConfig::compact())
        .unwrap();
    assert!(sql.starts_with("SELECT CAST(\"root\".qty AS BIGINT) AS \"qty\""));
    assert!(sql.ends_with("FROM test_schema.test_table AS \"root\" LIMIT 5"));
}

#[test]
fn test_cast_errors() {
    let err = frame().cast(&[("day", PrimitiveType::Integer)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err
        .to_string()
        .starts_with("Cannot cast column 'day' from StrictDate to Integer."));

    let err = frame().cast(&[("price", PrimitiveType::Numeric)]).unwrap_err();
    assert!(err.to_string().starts_with("Cast to Numeric requires parameters."));
}
