//! Fixed-shape calculators
//!
//! These procedures take account codes and column names instead of a
//! formula and perform direct lookups only.

use microcalc_core::{CellLookup, CellValue, Table};
use microcalc_formula::{round_result, Outcome};

/// Join account codes for messages
fn listed(codes: &[&str]) -> String {
    codes.join(", ")
}

fn split_list(list: &str, separator: char) -> Vec<&str> {
    list.split(separator).map(str::trim).collect()
}

fn blank_settings(values: &[&str]) -> Option<Outcome> {
    if values.iter().all(|v| !v.trim().is_empty()) {
        return None;
    }
    let quoted: Vec<String> = values.iter().map(|v| format!("`{}`", v)).collect();
    Some(Outcome::error(format!(
        "Some of the values {} defined for this field are empty",
        quoted.join(", ")
    )))
}

/// The value of one cell, found by account code
pub fn single_cell(
    table: &Table,
    account_col_name: &str,
    account_code: &str,
    value_col_name: &str,
) -> Outcome {
    if let Some(outcome) = blank_settings(&[account_col_name, account_code, value_col_name]) {
        return outcome;
    }
    let (key_col, code, value_col) = (
        account_col_name.trim(),
        account_code.trim(),
        value_col_name.trim(),
    );

    if !table.has_column(key_col) || !table.has_column(value_col) {
        return Outcome::error(format!(
            "One or both of the columns `{}`, `{}` required for the calculation do not exist \
             in the uploaded file or have a different name",
            key_col, value_col
        ));
    }

    match table.lookup(value_col, key_col, code) {
        CellLookup::NotFound(_) => Outcome::error(format!(
            "The account code `{}` required for the calculation does not exist in column `{}` \
             of the uploaded file",
            code, key_col
        )),
        CellLookup::Found(CellValue::Number(n)) => Outcome::value(*n),
        CellLookup::Found(CellValue::Empty) => Outcome::error(format!(
            "The value for the row with account code `{}` and column `{}` is missing from the \
             uploaded file",
            code, value_col
        )),
        CellLookup::Found(CellValue::Text(_)) => Outcome::error(format!(
            "The value for the row with account code `{}` and column `{}` in the uploaded file \
             is not numeric",
            code, value_col
        )),
    }
}

/// The sum of one column over at least two account codes
///
/// A repeated code counts towards the two required codes, but its row is
/// added once.
pub fn sum_many_rows_same_col(
    table: &Table,
    account_col_name: &str,
    account_codes: &str,
    value_col_name: &str,
    list_separator: char,
) -> Outcome {
    if let Some(outcome) = blank_settings(&[account_col_name, account_codes, value_col_name]) {
        return outcome;
    }
    let key_col = account_col_name.trim();
    let value_col = value_col_name.trim();

    let listed_codes = split_list(account_codes, list_separator);
    if listed_codes.len() < 2 {
        return Outcome::error(
            "This field is computed by addition, so at least 2 account codes must be given \
             for the values to add up",
        );
    }

    if !table.has_column(key_col) || !table.has_column(value_col) {
        return Outcome::error(format!(
            "One or both of the columns `{}`, `{}` required for the calculation do not exist \
             in the uploaded file or have a different name",
            key_col, value_col
        ));
    }

    // Each matching row counts once
    let mut codes: Vec<&str> = Vec::new();
    for code in listed_codes {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    let cells = table.lookup_all(value_col, key_col, codes.iter().copied());
    if cells
        .iter()
        .any(|cell| matches!(cell, CellLookup::NotFound(_)))
    {
        return Outcome::error(format!(
            "Some of the account codes `{}` required for the calculation do not exist in \
             column `{}` of the uploaded file",
            listed(&codes),
            key_col
        ));
    }

    let mut total = 0.0;
    let mut missing = false;
    let mut non_numeric = false;
    for cell in &cells {
        match cell {
            CellLookup::Found(CellValue::Number(n)) => total += n,
            CellLookup::Found(CellValue::Empty) => missing = true,
            _ => non_numeric = true,
        }
    }

    if missing {
        return Outcome::error(format!(
            "Some of the values for the rows with account codes `{}` and column `{}` are \
             missing from the uploaded file",
            listed(&codes),
            value_col
        ));
    }
    if non_numeric {
        return Outcome::error(format!(
            "Some of the values for the rows with account codes `{}` and column `{}` in the \
             uploaded file are not numeric",
            listed(&codes),
            value_col
        ));
    }

    Outcome::value(total)
}

/// `first - second`, each term a cell found by account code
///
/// At most two codes and two columns are given. A single code or column is
/// used for both terms. The result is rounded to two decimals.
pub fn subtract_two_single_values(
    table: &Table,
    account_col_name: &str,
    account_codes: &str,
    value_col_names: &str,
    list_separator: char,
) -> Outcome {
    if let Some(outcome) = blank_settings(&[account_col_name, account_codes, value_col_names]) {
        return outcome;
    }
    let key_col = account_col_name.trim();
    let codes = split_list(account_codes, list_separator);
    let columns = split_list(value_col_names, list_separator);

    if codes.len() > 2 {
        return Outcome::error(
            "This field is computed by subtraction, so at most 2 account codes may be given \
             for the terms of the subtraction",
        );
    }
    if columns.len() > 2 {
        return Outcome::error(
            "This field is computed by subtraction, so at most 2 column names may be given \
             for the two terms of the subtraction",
        );
    }

    let first_code = codes[0];
    let second_code = codes.get(1).copied().unwrap_or(first_code);
    let first_col = columns[0];
    let second_col = columns.get(1).copied().unwrap_or(first_col);

    if [key_col, first_col, second_col]
        .iter()
        .any(|col| !table.has_column(col))
    {
        return Outcome::error(format!(
            "Some of the columns `{}`, `{}`, `{}` required for the calculation do not exist in \
             the uploaded file or have a different name",
            key_col, first_col, second_col
        ));
    }

    let first = table.lookup(first_col, key_col, first_code);
    let second = table.lookup(second_col, key_col, second_code);

    let (first, second) = match (first, second) {
        (CellLookup::Found(first), CellLookup::Found(second)) => (first, second),
        _ => {
            return Outcome::error(format!(
                "Some of the account codes `{}`, `{}` required for the calculation do not exist \
                 in column `{}` of the uploaded file",
                first_code, second_code, key_col
            ))
        }
    };

    match (first, second) {
        (CellValue::Number(a), CellValue::Number(b)) => Outcome::value(round_result(a - b)),
        (CellValue::Empty, _) | (_, CellValue::Empty) => Outcome::error(format!(
            "Some of the values for the row with account code `{}` and column `{}`, \
             respectively the row with account code `{}` and column `{}`, are missing from \
             the uploaded file",
            first_code, first_col, second_code, second_col
        )),
        _ => Outcome::error(format!(
            "Some of the values for the row with account code `{}` and column `{}`, \
             respectively the row with account code `{}` and column `{}`, in the uploaded file \
             are not numeric",
            first_code, first_col, second_code, second_col
        )),
    }
}
