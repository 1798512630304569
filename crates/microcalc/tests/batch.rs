//! Tests for computing a fields document against a data file

use std::fs;
use std::path::PathBuf;

use microcalc::prelude::*;
use microcalc::try_compute_fields;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

const BALANCE: &str = "\
cont;denumire;sold_debit;sold_credit
401;Furnizori;;1250.50
4111;Clienti;830.25;
5121;Conturi la banci;2000;150.75
4426;TVA deductibila;12.5;n/a
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

fn run(fields: Value) -> Value {
    let ws = Workspace::new();
    let fields_path = ws.write("fields.json", &fields.to_string());
    let data_path = ws.write("balance.csv", BALANCE);
    let outcomes = compute_fields(&fields_path, &data_path, &BatchOptions::default());
    serde_json::to_value(outcomes).unwrap()
}

fn global_error(result: &Value) -> &str {
    result[0]["global_error"].as_str().unwrap_or("")
}

#[test]
fn test_all_procedures() {
    let result = run(json!({
        "single_cell": [
            {"id": "a", "account_col_name": "cont", "account_code": "401", "value_col_name": "sold_credit"},
            {"id": "b", "account_col_name": "cont", "account_code": "401", "value_col_name": "sold_debit"}
        ],
        "sum_many_rows_same_col": [
            {"id": "c", "account_col_name": "cont", "account_code": "4111, 5121", "value_col_name": "sold_debit"}
        ],
        "subtract_same_row_two_cols": [
            {"id": "d", "account_col_name": "cont", "account_code": "5121", "value_col_name": "sold_debit, sold_credit"}
        ],
        "micro_calc": [
            {"id": "e", "account_col_name": "cont", "micro_formula": "sold_debit@5121 - sold_credit@401 / 2"},
            {"id": "f", "account_col_name": "cont", "micro_formula": "sold_debit@401 + 1"}
        ],
        "micro_calc_flexi": [
            {"id": "g", "account_col_name": "cont", "micro_formula": "sold_debit@401 + 1"}
        ]
    }));

    let entries = result.as_array().unwrap();
    assert_eq!(entries.len(), 7);

    let ids: Vec<&str> = entries.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["a", "b", "c", "d", "e", "f", "g"]);

    assert_eq!(entries[0], json!({"id": "a", "value": 1250.5, "error": null}));
    assert_eq!(entries[1]["value"], Value::Null);
    assert!(entries[1]["error"].as_str().unwrap().contains("missing"));
    assert_eq!(entries[2]["value"], json!(2830.25));
    assert_eq!(entries[3]["value"], json!(1849.25));
    assert_eq!(entries[4]["value"], json!(1374.75));
    assert_eq!(entries[5]["value"], Value::Null);
    assert_eq!(
        entries[5]["error"],
        json!("The cell referenced by `sold_debit@401` is empty")
    );
    assert_eq!(entries[6], json!({"id": "g", "value": 1.0, "error": null}));
}

#[test]
fn test_special_fields() {
    let fields = |special: bool| {
        json!({
            "special_rfc": special,
            "micro_calc": [
                {"id": 1, "account_col_name": "cont", "micro_formula": "sold_debit@5121:sold_debit@4111"}
            ]
        })
    };

    assert_eq!(run(fields(false))[0]["value"], json!(2000.0));
    assert_eq!(run(fields(true))[0]["value"], json!(830.25));
}

#[test]
fn test_unknown_procedures_are_ignored() {
    let result = run(json!({
        "notes": "not a procedure",
        "micro_calc": [{"id": 1, "account_col_name": "cont", "micro_formula": "2 * 3"}]
    }));
    assert_eq!(result, json!([{"id": 1, "value": 6.0, "error": null}]));
}

#[test]
fn test_global_errors() {
    let result = run(json!([1, 2]));
    assert!(global_error(&result).contains("No fields"));

    let result = run(json!({}));
    assert!(global_error(&result).contains("No fields"));

    let result = run(json!({"micro_calc": []}));
    assert!(global_error(&result).contains("`micro_calc`"));

    let result = run(json!({
        "micro_calc": [{"id": 1, "account_col_name": "cont", "micro_formula": "1"}],
        "single_cell": [{"id": 2, "account_col_name": "cont", "value_col_name": "sold_debit"}]
    }));
    assert_eq!(result.as_array().unwrap().len(), 1);
    assert!(global_error(&result).contains("`account_code`"));

    let result = run(json!({
        "micro_calc": [{"id": 1, "account_col_name": ["cont"], "micro_formula": "1"}]
    }));
    assert!(global_error(&result).contains("string expected"));
}

#[test]
fn test_unreadable_inputs() {
    let ws = Workspace::new();
    let fields = ws.write(
        "fields.json",
        r#"{"micro_calc": [{"id": 1, "account_col_name": "cont", "micro_formula": "1"}]}"#,
    );
    let data = ws.write("balance.csv", BALANCE);
    let options = BatchOptions::default();

    let missing_fields = ws.dir.path().join("absent.json");
    assert!(matches!(
        try_compute_fields(&missing_fields, &data, &options),
        Err(BatchError::FieldsNotFound(_))
    ));

    let broken = ws.write("broken.json", "{\"micro_calc\": [");
    assert!(matches!(
        try_compute_fields(&broken, &data, &options),
        Err(BatchError::InvalidFieldsJson(_))
    ));

    let xlsx = ws.write("balance.xlsx", "PK");
    assert!(matches!(
        try_compute_fields(&fields, &xlsx, &options),
        Err(BatchError::UnsupportedFormat(_))
    ));

    let empty = ws.write("empty.csv", "cont;sold\n");
    assert!(matches!(
        try_compute_fields(&fields, &empty, &options),
        Err(BatchError::EmptyTable)
    ));

    let outcomes = compute_fields(&fields, &empty, &options);
    assert_eq!(
        outcomes,
        vec![FieldOutcome::global(BatchError::EmptyTable.to_string())]
    );
}

#[test]
fn test_custom_separator() {
    let ws = Workspace::new();
    let fields = ws.write(
        "fields.json",
        r#"{"micro_calc": [{"id": 1, "account_col_name": "cont", "micro_formula": "sold_debit#5121 * 2"}]}"#,
    );
    let data = ws.write("balance.csv", BALANCE);

    let mut options = BatchOptions::default();
    options.micro = options.micro.with_separator('#');
    let outcomes = compute_fields(&fields, &data, &options);
    assert_eq!(
        outcomes,
        vec![FieldOutcome::Field {
            id: json!(1),
            value: Some(4000.0),
            error: None
        }]
    );
}
