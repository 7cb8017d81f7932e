use chrono::NaiveDate;
use price_lists::data::{ResultRow, Value};
use price_lists::expr::evaluate;
use proptest::prelude::*;

fn num(value: f64) -> Option<Value> {
    Some(Value::Number(value))
}

fn text(value: &str) -> Option<Value> {
    Some(Value::Text(value.to_string()))
}

#[test]
fn bracket_division_scales_category_price() {
    let row = ResultRow::from_pairs([("rtl-1", num(90.0))]);
    assert_eq!(evaluate("[RTL-1]/0.9", &row), num(100.0));
}

#[test]
fn bracket_with_null_category_is_absent() {
    let row = ResultRow::from_pairs([("rtl-1", None)]);
    assert_eq!(evaluate("[RTL-1]/0.9", &row), None);
    assert_eq!(evaluate("[RTL-1]", &row), None);
}

#[test]
fn multiplication_by_zero_is_absent_not_zero() {
    let row = ResultRow::from_pairs([("qty", num(5.0))]);
    assert_eq!(evaluate("qty * 0", &row), None);
    assert_eq!(evaluate("qty * 2", &row), num(10.0));
}

#[test]
fn multiplication_with_field_factor() {
    let row = ResultRow::from_pairs([
        ("qty", num(4.0)),
        ("price", text("2.5")),
        ("zero", num(0.0)),
        ("missing", None),
    ]);
    assert_eq!(evaluate("qty * price", &row), num(10.0));
    assert_eq!(evaluate("qty * zero", &row), None);
    assert_eq!(evaluate("qty * missing", &row), None);
    assert_eq!(evaluate("missing * 3", &row), None);
    assert_eq!(evaluate("unknown * 3", &row), None);
}

#[test]
fn zero_left_factor_still_multiplies() {
    let row = ResultRow::from_pairs([("qty", num(0.0))]);
    assert_eq!(evaluate("qty * 3", &row), num(0.0));
}

#[test]
fn product_left_side_applies_bracket_operator() {
    let row = ResultRow::from_pairs([("dst-1", num(10.0))]);
    assert_eq!(evaluate("[DST-1] * 1.5", &row), num(15.0));
    assert_eq!(evaluate("[DST-1]+2 * 2", &row), num(24.0));
}

#[test]
fn direct_field_reference_is_case_insensitive() {
    let row = ResultRow::from_pairs([("sku", text("A-100")), ("effective_date", None)]);
    assert_eq!(evaluate("sku", &row), text("A-100"));
    assert_eq!(evaluate("SKU", &row), text("A-100"));
    assert_eq!(evaluate("  Sku  ", &row), text("A-100"));
    assert_eq!(evaluate("effective_date", &row), None);
}

#[test]
fn direct_field_reference_beats_operator_forms() {
    let row = ResultRow::from_pairs([("a*b", num(7.0)), ("12", text("twelve"))]);
    assert_eq!(evaluate("a*b", &row), num(7.0));
    assert_eq!(evaluate("12", &row), text("twelve"));
}

#[test]
fn bracket_lookup_tries_exact_lower_then_upper() {
    let exact = ResultRow::from_pairs([("rtl-1", num(1.0))]);
    assert_eq!(evaluate("[rtl-1]", &exact), num(1.0));
    assert_eq!(evaluate("[Rtl-1]", &exact), num(1.0));
    assert_eq!(evaluate("[RTL-2]", &exact), None);
}

#[test]
fn bracket_operators_apply_numeric_constant() {
    let row = ResultRow::from_pairs([("cat", num(10.0)), ("label", text("n/a"))]);
    assert_eq!(evaluate("[cat] * 3", &row), num(30.0));
    assert_eq!(evaluate("[cat] + 2.5", &row), num(12.5));
    assert_eq!(evaluate("[cat]-4", &row), num(6.0));
    assert_eq!(evaluate("[cat] / 4", &row), num(2.5));
    assert_eq!(evaluate("[cat] / 0", &row), None);
    assert_eq!(evaluate("[cat] - 1.2.3", &row), None);
    assert_eq!(evaluate("[label] + 1", &row), None);
    assert_eq!(evaluate("[label]", &row), text("n/a"));
}

#[test]
fn bracket_without_operator_keeps_non_numeric_values() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let row = ResultRow::from_pairs([("effective", Some(Value::Date(date)))]);
    assert_eq!(evaluate("[Effective]", &row), Some(Value::Date(date)));
    assert_eq!(evaluate("[Effective] + 1", &row), None);
}

#[test]
fn numeric_literal_fallback_and_unresolvable_text() {
    let row = ResultRow::from_pairs([("sku", text("A"))]);
    assert_eq!(evaluate("12.5", &row), num(12.5));
    assert_eq!(evaluate("-3", &row), num(-3.0));
    assert_eq!(evaluate("NaN", &row), None);
    assert_eq!(evaluate("unknown_field", &row), None);
    assert_eq!(evaluate("[unclosed", &row), None);
}

proptest! {
    #[test]
    fn bracket_division_matches_float_division(
        price in 0.01f64..1_000_000.0,
        divisor in 1u32..1000
    ) {
        let divisor = f64::from(divisor) / 100.0;
        let row = ResultRow::from_pairs([("rtl-1", Some(Value::Number(price)))]);
        let expr = format!("[RTL-1]/{divisor}");
        prop_assert_eq!(evaluate(&expr, &row), Some(Value::Number(price / divisor)));
    }

    #[test]
    fn absent_category_never_fabricates_a_value(
        op in prop::sample::select(vec!["*", "/", "+", "-"]),
        operand in 0u32..1000
    ) {
        let row = ResultRow::from_pairs([("rtl-1", None::<Value>)]);
        let expr = format!("[RTL-1]{op}{operand}");
        prop_assert_eq!(evaluate(&expr, &row), None);
    }
}
