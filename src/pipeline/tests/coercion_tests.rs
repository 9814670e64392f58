//! Column parsing and per-type cell coercion.

use crate::pipeline::domain::{
    CellValue, CoercionMode, Column, ColumnName, ColumnSpec, ColumnType, PipelineDomainError,
    SpreadsheetId, coerce_cell, coerce_row_data,
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

fn column(name: &str, kind: &str, validation: &Value) -> Column {
    let spec = ColumnSpec {
        name: ColumnName::new(name).expect("valid column name"),
        column_type: ColumnType::parse(kind, validation).expect("valid column type"),
        constraints: validation.clone(),
        display: Value::Null,
        is_required: false,
        default_value: None,
    };
    Column::new(SpreadsheetId::new(), spec, 1, &DefaultClock)
}

fn with_spec(column_name: &str, kind: &str, adjust: impl FnOnce(&mut ColumnSpec)) -> Column {
    let mut spec = ColumnSpec {
        name: ColumnName::new(column_name).expect("valid column name"),
        column_type: ColumnType::parse(kind, &Value::Null).expect("valid column type"),
        constraints: Value::Null,
        display: Value::Null,
        is_required: false,
        default_value: None,
    };
    adjust(&mut spec);
    Column::new(SpreadsheetId::new(), spec, 1, &DefaultClock)
}

#[rstest]
#[case("$1,200.50", 1200.5)]
#[case("€ 3 000", 3000.0)]
#[case("42", 42.0)]
#[case("1_000", 1000.0)]
fn currency_strings_strip_symbols_and_separators(#[case] input: &str, #[case] expected: f64) {
    let amount = column("Amount", "currency", &Value::Null);

    let cell = coerce_cell(&amount, Some(&json!(input))).expect("currency should coerce");

    assert_eq!(cell, CellValue::Number(expected));
}

#[rstest]
fn blank_number_becomes_null() {
    let count = column("Seats", "number", &Value::Null);

    assert_eq!(coerce_cell(&count, Some(&json!("  "))), Ok(CellValue::Null));
    assert_eq!(coerce_cell(&count, None), Ok(CellValue::Null));
}

#[rstest]
fn unparsable_number_is_rejected() {
    let count = column("Seats", "number", &Value::Null);

    let result = coerce_cell(&count, Some(&json!("twelve")));

    assert_eq!(
        result,
        Err(PipelineDomainError::InvalidNumber {
            column: "Seats".to_owned(),
            value: "twelve".to_owned(),
        })
    );
}

#[rstest]
#[case(json!("yes"), true)]
#[case(json!("No"), false)]
#[case(json!("off"), false)]
#[case(json!("0"), false)]
#[case(json!(""), false)]
#[case(json!(1), true)]
#[case(json!(0), false)]
#[case(json!(true), true)]
#[case(Value::Null, false)]
fn booleans_follow_the_falsy_set(#[case] input: Value, #[case] expected: bool) {
    let flag = column("Signed", "boolean", &Value::Null);

    let cell = coerce_cell(&flag, Some(&input)).expect("booleans always coerce");

    assert_eq!(cell, CellValue::Bool(expected));
}

#[rstest]
fn multi_select_splits_comma_separated_strings() {
    let products = column(
        "Products",
        "select",
        &json!({ "options": ["Firewall", "SD-WAN"], "multiple": true }),
    );

    let cell = coerce_cell(&products, Some(&json!("Firewall, SD-WAN,"))).expect("list coerces");

    assert_eq!(
        cell,
        CellValue::List(vec!["Firewall".to_owned(), "SD-WAN".to_owned()])
    );
}

#[rstest]
fn multi_select_defaults_to_empty_list() {
    let products = column("Products", "multi_select", &Value::Null);

    assert_eq!(coerce_cell(&products, None), Ok(CellValue::List(Vec::new())));
}

#[rstest]
fn single_select_rejects_lists() {
    let stage = column("Stage", "select", &json!({ "options": ["Open", "Won"] }));

    let result = coerce_cell(&stage, Some(&json!(["Open"])));

    assert!(matches!(
        result,
        Err(PipelineDomainError::UnexpectedShape { .. })
    ));
}

#[rstest]
fn select_options_accept_strings_and_objects() {
    let parsed = ColumnType::parse(
        "select",
        &json!({ "options": ["Open", { "value": "won", "label": "Closed Won" }] }),
    )
    .expect("options should parse");

    let options = parsed.options().expect("select has options");
    assert_eq!(options.len(), 2);
    assert_eq!(options.first().map(|o| o.label()), Some("Open"));
    assert_eq!(options.get(1).map(|o| o.label()), Some("Closed Won"));
    assert!(!parsed.is_multiple());
}

#[rstest]
fn unknown_column_type_is_rejected() {
    let result = ColumnType::parse("spreadsheet", &Value::Null);

    assert!(matches!(result, Err(PipelineDomainError::ColumnType(_))));
}

#[rstest]
fn full_coercion_fills_defaults_and_keeps_unknown_keys() {
    let stage = with_spec("Stage", "text", |spec| {
        spec.default_value = Some(json!("Qualify"));
    });
    let amount = column("Amount", "currency", &Value::Null);
    let raw = json!({ "Amount": "$500", "Legacy Field": { "kept": true } });

    let data = coerce_row_data(
        &[stage, amount],
        raw.as_object().expect("object literal"),
        CoercionMode::Full,
    )
    .expect("row should coerce");

    assert_eq!(data.get("Stage"), Some(&CellValue::Text("Qualify".to_owned())));
    assert_eq!(data.get("Amount"), Some(&CellValue::Number(500.0)));
    assert_eq!(
        data.get("Legacy Field").map(CellValue::to_json),
        Some(json!({ "kept": true }))
    );
}

#[rstest]
fn partial_coercion_only_touches_supplied_keys() {
    let stage = column("Stage", "text", &Value::Null);
    let amount = column("Amount", "number", &Value::Null);
    let raw = json!({ "Amount": "7" });

    let data = coerce_row_data(
        &[stage, amount],
        raw.as_object().expect("object literal"),
        CoercionMode::Partial,
    )
    .expect("patch should coerce");

    assert_eq!(data.len(), 1);
    assert_eq!(data.get("Amount"), Some(&CellValue::Number(7.0)));
}

#[rstest]
fn required_column_rejects_missing_value() {
    let account = with_spec("Account", "text", |spec| spec.is_required = true);
    let raw = json!({});

    let result = coerce_row_data(
        &[account],
        raw.as_object().expect("object literal"),
        CoercionMode::Full,
    );

    assert_eq!(
        result,
        Err(PipelineDomainError::MissingRequiredValue("Account".to_owned()))
    );
}
