mod common;

use chrono::NaiveDate;
use common::TestWorkspace;
use price_lists::data::Value;
use price_lists::results::{CsvResultSet, ResultSetProvider};

#[test]
fn fields_are_lowercased_and_values_typed() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "rows.csv",
        "PartID,RTL-1,Effective,Zip,Label\nP-100,90,2024-03-01,00123,\nP-200,12.5,,42,n/a\n",
    );

    let rows = CsvResultSet::new(&path).fetch().expect("fetch rows");

    assert_eq!(rows.len(), 2);
    let first = &rows.rows()[0];
    assert!(first.contains("partid"));
    assert_eq!(first.get("partid"), Some(&Value::Text("P-100".to_string())));
    assert_eq!(first.get("rtl-1"), Some(&Value::Number(90.0)));
    assert_eq!(
        first.get("effective"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
    );
    assert_eq!(first.get("zip"), Some(&Value::Text("00123".to_string())));
    assert!(first.contains("label"));
    assert_eq!(first.get("label"), None);

    let second = &rows.rows()[1];
    assert_eq!(second.get("effective"), None);
    assert_eq!(second.get("zip"), Some(&Value::Number(42.0)));
}

#[test]
fn short_rows_leave_trailing_fields_absent() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("rows.csv", "sku,price\nA\n");

    let rows = CsvResultSet::new(&path).fetch().expect("fetch rows");

    let row = &rows.rows()[0];
    assert!(row.contains("price"));
    assert_eq!(row.get("price"), None);
}

#[test]
fn tab_separated_exports_are_detected_by_extension() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("rows.tsv", "sku\tprice\nA\t3\n");

    let rows = CsvResultSet::new(&path).fetch().expect("fetch rows");
    assert_eq!(rows.rows()[0].get("price"), Some(&Value::Number(3.0)));
}
