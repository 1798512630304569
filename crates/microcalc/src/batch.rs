//! Batch field computation
//!
//! Reads the fields document and the data file, computes every field and
//! reports one outcome per field. Any failure that prevents computing the
//! batch as a whole is reported as a single global error instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use microcalc::batch::{compute_fields, BatchOptions};
//!
//! let outcomes = compute_fields("fields.json", "balance.csv", &BatchOptions::default());
//! println!("{}", serde_json::to_string(&outcomes).unwrap());
//! ```

use std::path::Path;

use microcalc_core::Table;
use microcalc_csv::{read_table, CsvReadOptions};
use microcalc_formula::{compute_micro, MicroConfig, Outcome};
use serde::Serialize;
use serde_json::Value;

use crate::calculators;
use crate::error::{BatchError, BatchResult};
use crate::fields::{FieldGroup, FieldParams, FieldSpec, FieldsDocument, Procedure};

/// Default separator of account code and column lists
pub const DEFAULT_LIST_SEPARATOR: char = ',';

/// Default separator of special field values
pub const DEFAULT_SPECIAL_SEPARATOR: char = ':';

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Formula settings; strictness is chosen per procedure
    pub micro: MicroConfig,
    /// Separator of account codes and column names in fixed calculators
    pub list_separator: char,
    /// Separator of the two sides of a special field value
    pub special_separator: char,
    /// Data file settings
    pub csv: CsvReadOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            micro: MicroConfig::default(),
            list_separator: DEFAULT_LIST_SEPARATOR,
            special_separator: DEFAULT_SPECIAL_SEPARATOR,
            csv: CsvReadOptions::default(),
        }
    }
}

/// One entry of the result list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOutcome {
    /// Result of one field
    Field {
        id: Value,
        value: Option<f64>,
        error: Option<String>,
    },
    /// The batch could not be computed
    Global { global_error: String },
}

impl FieldOutcome {
    fn field(id: Value, outcome: Outcome) -> Self {
        FieldOutcome::Field {
            id,
            value: outcome.value,
            error: outcome.error,
        }
    }

    /// A global failure entry
    pub fn global<S: Into<String>>(message: S) -> Self {
        FieldOutcome::Global {
            global_error: message.into(),
        }
    }
}

/// Statistics from a batch run
#[derive(Debug, Clone, Copy, Default)]
struct BatchStats {
    fields: usize,
    computed: usize,
    failed: usize,
}

/// Compute every field, turning a global failure into a single entry
pub fn compute_fields<P, Q>(fields_path: P, data_path: Q, options: &BatchOptions) -> Vec<FieldOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    match try_compute_fields(fields_path, data_path, options) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            log::error!("Batch aborted: {}", e);
            vec![FieldOutcome::global(e.to_string())]
        }
    }
}

/// Compute every field, returning the global failure as an error
pub fn try_compute_fields<P, Q>(
    fields_path: P,
    data_path: Q,
    options: &BatchOptions,
) -> BatchResult<Vec<FieldOutcome>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let document = FieldsDocument::load(fields_path)?;
    let table = open_table(data_path, &options.csv)?;
    compute_document(&table, &document, options)
}

/// Read a data file into a table
pub fn open_table<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> BatchResult<Table> {
    let table = read_table(path, options)?;
    // A table needs at least one row and one column
    if table.size() < 1 {
        return Err(BatchError::EmptyTable);
    }
    Ok(table)
}

/// Compute the fields of a loaded document against a table
pub fn compute_document(
    table: &Table,
    document: &FieldsDocument,
    options: &BatchOptions,
) -> BatchResult<Vec<FieldOutcome>> {
    let groups = document.groups(options.special_separator)?;
    let mut stats = BatchStats::default();
    let mut outcomes = Vec::new();

    for group in &groups {
        log::debug!(
            "Computing {} field(s) with `{}`",
            group.fields.len(),
            group.procedure
        );
        for outcome in compute_group(table, group, options) {
            stats.fields += 1;
            if matches!(outcome, FieldOutcome::Field { value: Some(_), .. }) {
                stats.computed += 1;
            } else {
                stats.failed += 1;
            }
            outcomes.push(outcome);
        }
    }

    log::info!(
        "Computed {} of {} field(s), {} with errors",
        stats.computed,
        stats.fields,
        stats.failed
    );
    Ok(outcomes)
}

/// Compute the fields of one procedure, in order
pub fn compute_group(table: &Table, group: &FieldGroup, options: &BatchOptions) -> Vec<FieldOutcome> {
    group
        .fields
        .iter()
        .map(|field| {
            let outcome = compute_field(table, group.procedure, field, options);
            FieldOutcome::field(field.id.clone(), outcome)
        })
        .collect()
}

/// Compute a single field
pub fn compute_field(
    table: &Table,
    procedure: Procedure,
    field: &FieldSpec,
    options: &BatchOptions,
) -> Outcome {
    let key_col = field.account_col_name.as_str();

    match (&field.params, procedure) {
        (FieldParams::Formula(formula), Procedure::MicroCalc) => {
            let config = options.micro.clone().with_strict(true);
            compute_micro(table, key_col, formula, &config)
        }
        (FieldParams::Formula(formula), Procedure::MicroCalcFlexi) => {
            let config = options.micro.clone().with_strict(false);
            compute_micro(table, key_col, formula, &config)
        }
        (
            FieldParams::Lookup {
                account_code,
                value_col_name,
            },
            Procedure::SingleCell,
        ) => calculators::single_cell(table, key_col, account_code, value_col_name),
        (
            FieldParams::Lookup {
                account_code,
                value_col_name,
            },
            Procedure::SumManyRowsSameCol,
        ) => calculators::sum_many_rows_same_col(
            table,
            key_col,
            account_code,
            value_col_name,
            options.list_separator,
        ),
        (
            FieldParams::Lookup {
                account_code,
                value_col_name,
            },
            Procedure::SubtractSameRowTwoCols,
        ) => calculators::subtract_two_single_values(
            table,
            key_col,
            account_code,
            value_col_name,
            options.list_separator,
        ),
        (params, procedure) => Outcome::error(format!(
            "The settings of this field ({}) do not match the procedure `{}`",
            match params {
                FieldParams::Formula(_) => "a micro-formula",
                FieldParams::Lookup { .. } => "account codes and columns",
            },
            procedure
        )),
    }
}
