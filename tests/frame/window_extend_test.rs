//! Window columns and the group-wise rank/shift helpers built on them.

use frameql::prelude::*;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

fn frame() -> TdsFrame {
    TdsFrame::table(
        ["test_schema", "test_table"],
        vec![
            TdsColumn::string("grp"),
            TdsColumn::integer("val"),
            TdsColumn::strict_date("day"),
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
// window_extend
// =============================================================================

#[test]
fn test_rank_per_partition() {
    let f = frame()
        .window_extend(
            Window::new().partition_by(["grp"]).order_by([SortInfo::asc("val")]),
            vec![WindowColumnSpec::new("rk", |p, w, r| Ok(p.rank(w, r)))],
        )
        .unwrap();
    assert_eq!(f.column_names(), vec!["grp", "val", "day", "rk"]);
    assert_eq!(
        compact(&f),
        "SELECT \"root\".grp AS \"grp\", \"root\".val AS \"val\", \"root\".day AS \"day\", \
         rank() OVER (PARTITION BY \"root\".grp ORDER BY \"root\".val) AS \"rk\" \
         FROM test_schema.test_table AS \"root\""
    );
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#\
         ->extend(over(~[grp], [ascending(~val)]), ~rk:{p,w,r | $p->rank($w, $r)})"
    );
}

#[test]
fn test_filter_on_window_column_nests() {
    let f = frame()
        .window_extend(
            Window::new().order_by([SortInfo::desc("val")]),
            vec![WindowColumnSpec::new("rn", |p, _w, r| Ok(p.row_number(r)))],
        )
        .unwrap()
        .filter(|r| r.get_integer("rn")?.lte(3))
        .unwrap();
    let sql = compact(&f);
    assert!(sql.starts_with("SELECT \"root\".\"grp\" AS \"grp\""));
    assert!(sql.contains("row_number() OVER (ORDER BY \"root\".val DESC) AS \"rn\""));
    assert!(sql.ends_with(") AS \"root\" WHERE (\"root\".\"rn\" <= 3)"));
}

#[test]
fn test_aggregated_window_column() {
    let f = frame()
        .window_extend(
            Window::new().partition_by(["grp"]),
            vec![WindowColumnSpec::aggregated(
                "grp_total",
                |_p, _w, r| r.get_integer("val"),
                |c| c.sum(),
            )],
        )
        .unwrap();
    assert!(compact(&f).contains("SUM(\"root\".val) OVER (PARTITION BY \"root\".grp) AS \"grp_total\""));
    assert_eq!(
        pure(&f),
        "#Table(test_schema.test_table)#\
         ->extend(over(~[grp], []), ~grp_total:{p,w,r | $r.val}:{c | $c->sum()})"
    );
}

#[test]
fn test_lag_difference() {
    let f = frame()
        .window_extend(
            Window::new().partition_by(["grp"]).order_by([SortInfo::asc("day")]),
            vec![WindowColumnSpec::new("delta", |p, _w, r| {
                r.get_integer("val")?.sub(p.lag(r).get_integer("val")?)
            })],
        )
        .unwrap();
    assert!(compact(&f).contains(
        "(\"root\".val - lag(\"root\".val) OVER (PARTITION BY \"root\".grp ORDER BY \"root\".day)) AS \"delta\""
    ));
}

#[test]
fn test_window_extend_validation() {
    let err = frame()
        .window_extend(Window::new(), vec![])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = frame()
        .window_extend(
            Window::new(),
            vec![WindowColumnSpec::new("val", |p, _w, r| Ok(p.row_number(r)))],
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Extend column name - 'val' already exists in base frame");
}

// =============================================================================
// Group-wise rank and shift
// =============================================================================

#[test]
fn test_groupby_rank_dense_descending() {
    let f = frame()
        .select(&["grp", "val"])
        .unwrap()
        .groupby(&["grp"])
        .unwrap()
        .rank(RankMethod::Dense, false)
        .unwrap();
    assert_eq!(f.column_names(), vec!["val"]);
    assert!(compact(&f).starts_with(
        "SELECT dense_rank() OVER (PARTITION BY \"root\".\"grp\" ORDER BY \"root\".\"val\" DESC) AS \"val\""
    ));
}

#[test]
fn test_groupby_shift_keeps_type() {
    let f = frame()
        .select(&["grp", "val"])
        .unwrap()
        .groupby(&["grp"])
        .unwrap()
        .shift(-1)
        .unwrap();
    assert_eq!(f.columns()[0].primitive_type(), Some(PrimitiveType::Integer));
    assert!(compact(&f).contains("lead(\"root\".\"val\") OVER (PARTITION BY \"root\".\"grp\")"));
}
