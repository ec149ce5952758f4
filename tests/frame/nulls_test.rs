//! Null handling: fillna and dropna.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::integer("col1"),
            TdsColumn::string("col2"),
            TdsColumn::string("col3"),
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

// =============================================================================
// fillna
// =============================================================================

#[test]
fn test_fillna_string_fills_only_strings() {
    let f = frame().fillna("n/a").unwrap();
    assert_eq!(f.column_names(), frame().column_names());
    assert_eq!(
        compact(&f),
        "SELECT \"root\".\"col1\" AS \"col1\", \
         CASE WHEN (\"root\".\"col2\" IS NOT NULL) THEN \"root\".\"col2\" ELSE 'n/a' END AS \"col2\", \
         CASE WHEN (\"root\".\"col3\" IS NOT NULL) THEN \"root\".\"col3\" ELSE 'n/a' END AS \"col3\" \
         FROM (SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\", \"root\".col3 AS \"col3\" \
         FROM test_schema.test_table AS \"root\") AS \"root\""
    );
}

#[test]
fn test_fillna_per_column() {
    let f = frame()
        .fillna(FillValue::per_column([("col1", Expr::from(-1)), ("col3", Expr::from("?"))]))
        .unwrap();
    let pure = f.to_pure_query(&FrameToPureConfig::new(false));
    assert!(pure.contains("col1:{r | if($r.col1->isNotEmpty(), |$r.col1, |-1)}"));
    assert!(pure.contains("col2:{r | $r.col2}"));
    compact(&f);
}

#[test]
fn test_fillna_errors() {
    let err = frame()
        .fillna(FillValue::per_column([("col1", "x")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(err
        .to_string()
        .starts_with("Invalid fill value for column 'col1' of type Integer."));

    let err = frame()
        .fillna(FillValue::per_column([("zz", 1)]))
        .unwrap_err();
    assert!(err.to_string().starts_with("Column - 'zz' in fillna value mapping"));
}

// =============================================================================
// dropna
// =============================================================================

#[test]
fn test_dropna_all_columns() {
    let f = frame().dropna::<&str>(None, DropNaHow::Any).unwrap();
    assert!(compact(&f).ends_with(
        "WHERE (((\"root\".col1 IS NOT NULL) AND (\"root\".col2 IS NOT NULL)) \
         AND (\"root\".col3 IS NOT NULL))"
    ));
}

#[test]
fn test_dropna_how_all_subset() {
    let f = frame()
        .dropna(Some(&["col2", "col3"][..]), "all".parse().unwrap())
        .unwrap();
    assert!(compact(&f).ends_with(
        "WHERE ((\"root\".col2 IS NOT NULL) OR (\"root\".col3 IS NOT NULL))"
    ));
}

#[test]
fn test_dropna_validation() {
    let err = frame()
        .dropna(Some(&["nope"][..]), DropNaHow::Any)
        .unwrap_err();
    assert!(err.to_string().starts_with("Column - 'nope' in dropna subset list"));

    let err = "some".parse::<DropNaHow>().unwrap_err();
    assert_eq!(err.to_string(), "invalid how option: some. Must be one of ['any', 'all']");
}
