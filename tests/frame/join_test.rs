//! Multi-frame operations: joins and concatenation.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn trades() -> TdsFrame {
    TdsFrame::table(
        ["market", "trades"],
        vec![
            TdsColumn::integer("trade_id"),
            TdsColumn::integer("firm_id"),
            TdsColumn::float("quantity"),
        ],
    )
    .unwrap()
}

fn firms() -> TdsFrame {
    TdsFrame::table(
        ["market", "firms"],
        vec![TdsColumn::integer("id"), TdsColumn::string("legal_name")],
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
// Join
// =============================================================================

#[test]
fn test_inner_join_then_filter() {
    let f = trades()
        .join(&firms(), JoinKind::Inner, |l, r| {
            l.get_integer("firm_id")?.eq(r.get_integer("id")?)
        })
        .unwrap()
        .filter(|r| r.get_float("quantity")?.gt(100))
        .unwrap();
    assert_eq!(
        f.column_names(),
        vec!["trade_id", "firm_id", "quantity", "id", "legal_name"]
    );
    let sql = compact(&f);
    assert!(sql.contains("INNER JOIN"));
    assert!(sql.contains("ON (\"left\".\"firm_id\" = \"right\".\"id\")"));
    assert!(sql.ends_with(") AS \"root\" WHERE (\"root\".\"quantity\" > 100)"));
    assert_eq!(
        pure(&f),
        "#Table(market.trades)#\
         ->join(#Table(market.firms)#, JoinKind.INNER, {l, r | $l.firm_id == $r.id})\
         ->filter({r | $r.quantity > 100})"
    );
    assert_eq!(f.depth(), 2);
}

#[test]
fn test_join_of_derived_frames() {
    let big = trades()
        .filter(|r| r.get_float("quantity")?.gt(10))
        .unwrap();
    let named = firms()
        .filter(|r| Ok(r.get_string("legal_name")?.is_not_null()))
        .unwrap();
    let f = big
        .join(&named, JoinKind::RightOuter, |l, r| {
            l.get_integer("firm_id")?.eq(r.get_integer("id")?)
        })
        .unwrap();
    let sql = compact(&f);
    assert!(sql.contains("WHERE (\"root\".quantity > 10)) AS \"left\" RIGHT OUTER JOIN"));
    assert!(sql.contains("WHERE (\"root\".legal_name IS NOT NULL)) AS \"right\""));
    assert!(pure(&f).contains("JoinKind.RIGHT"));
}

#[test]
fn test_join_overlapping_columns_need_rename() {
    let err = trades()
        .join(&trades(), JoinKind::Inner, |l, r| {
            l.get_integer("trade_id")?.eq(r.get_integer("trade_id")?)
        })
        .unwrap_err();
    assert!(err.to_string().starts_with("Found duplicate columns in joined frames."));

    let renamed = trades()
        .rename_with(|c| format!("other_{c}"))
        .unwrap();
    let f = trades()
        .join(&renamed, JoinKind::FullOuter, |l, r| {
            l.get_integer("trade_id")?.eq(r.get_integer("other_trade_id")?)
        })
        .unwrap();
    assert_eq!(f.columns().len(), 6);
    assert!(compact(&f).contains("FULL OUTER JOIN"));
}

#[test]
fn test_join_by_columns_different_names() {
    let f = trades()
        .join_by_columns(&firms(), &["firm_id"], &["id"], JoinKind::LeftOuter)
        .unwrap();
    assert_eq!(
        f.column_names(),
        vec!["trade_id", "firm_id", "quantity", "id", "legal_name"]
    );
    assert!(compact(&f).contains("LEFT OUTER JOIN"));
    assert_eq!(
        pure(&f),
        "#Table(market.trades)#\
         ->join(#Table(market.firms)#, JoinKind.LEFT, {l, r | $l.firm_id == $r.id})"
    );
}

#[test]
fn test_join_kind_parsing() {
    assert_eq!("full_outer".parse::<JoinKind>().unwrap(), JoinKind::FullOuter);
    assert_eq!("cross".parse::<JoinKind>().unwrap(), JoinKind::Cross);
    assert_eq!("Left".parse::<JoinKind>().unwrap(), JoinKind::LeftOuter);
}

// =============================================================================
// Concatenate
// =============================================================================

#[test]
fn test_concatenate_derived_frames() {
    let small = trades().filter(|r| r.get_float("quantity")?.lt(10)).unwrap();
    let large = trades().filter(|r| r.get_float("quantity")?.gt(1000)).unwrap();
    let f = small.concatenate(&large).unwrap().head(10).unwrap();
    assert_eq!(f.column_names(), trades().column_names());
    let sql = compact(&f);
    assert!(sql.contains(") UNION ALL ("));
    assert!(sql.ends_with(") AS \"root\" LIMIT 10"));
    assert_eq!(
        pure(&f),
        "#Table(market.trades)#->filter({r | $r.quantity < 10})\
         ->concatenate(#Table(market.trades)#->filter({r | $r.quantity > 1000}))\
         ->limit(10)"
    );
}

#[test]
fn test_concatenate_type_mismatch() {
    let err = firms()
        .concatenate(&firms().rename(&[("legal_name", "id2"), ("id", "legal_name")]).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}
