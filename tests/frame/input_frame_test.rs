//! Input frames: tables, inline CSV and frame metadata.

use frameql::prelude::*;

#[test]
fn test_table_columns_and_pure() {
    let frame = TdsFrame::table(
        ["db", "hr", "people"],
        vec![
            TdsColumn::integer("id"),
            TdsColumn::string("first name"),
            TdsColumn::date("joined"),
        ],
    )
    .unwrap();
    assert_eq!(frame.column_names(), vec!["id", "first name", "joined"]);
    assert_eq!(frame.depth(), 0);
    assert_eq!(frame.to_pure_query(&FrameToPureConfig::default()), "#Table(db.hr.people)#");
    assert_eq!(
        frame.to_sql_query(&FrameToSqlConfig::compact()).unwrap(),
        "SELECT \"root\".id AS \"id\", \"root\".\"first name\" AS \"first name\", \
         \"root\".joined AS \"joined\" FROM db.hr.people AS \"root\""
    );
}

#[test]
fn test_table_rejects_duplicate_columns() {
    let err = TdsFrame::table(
        ["t"],
        vec![TdsColumn::integer("a"), TdsColumn::string("a")],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.to_string(), "Found duplicate column names in frame: ['a']");
}

#[test]
fn test_table_rejects_blank_path_segment() {
    assert!(TdsFrame::table(["db", ""], vec![TdsColumn::integer("a")]).is_err());
}

#[test]
fn test_csv_frame_pipeline() {
    let frame = TdsFrame::from_csv("name,score\nann,3\nbob,5\n")
        .unwrap()
        .filter(|r| r.get_integer("score")?.gt(4))
        .unwrap();
    assert_eq!(
        frame.columns(),
        &[TdsColumn::string("name"), TdsColumn::integer("score")]
    );
    assert_eq!(
        frame.to_pure_query(&FrameToPureConfig::new(false)),
        "#TDS\nname,score\nann,3\nbob,5\n#->filter({r | $r.score > 4})"
    );
    assert!(frame.input_frames()[0].describe() == "CSV");
}

#[test]
fn test_csv_float_column() {
    let frame = TdsFrame::from_csv("x\n1\n2.5\n").unwrap();
    assert_eq!(frame.columns()[0].primitive_type(), Some(PrimitiveType::Float));
}

#[test]
fn test_csv_mixed_date_forms_infer_datetime() {
    let frame = TdsFrame::from_csv(
        "id,opened,closed\n1,2024-01-05,2024-02-01\n2,2024-01-06 10:30:00,2024-02-03\n",
    )
    .unwrap();
    let schema: Vec<String> = frame
        .columns()
        .iter()
        .map(|c| format!("{}:{}", c.name(), c.column_type()))
        .collect();
    insta::assert_snapshot!(schema.join(", "), @"id:Integer, opened:DateTime, closed:StrictDate");
}

#[test]
fn test_derived_frames_share_structure() {
    let base = TdsFrame::table(["t"], vec![TdsColumn::integer("a")]).unwrap();
    let left = base.head(1).unwrap();
    let right = base.head(2).unwrap();
    assert!(!left.ptr_eq(&right));
    assert!(base.ptr_eq(&base.clone()));
    assert_eq!(left.input_frames().len(), 1);
}
