//! Field definitions
//!
//! The fields document is a JSON object keyed by procedure name. Each
//! procedure maps to a list of field objects:
//!
//! ```json
//! {
//!   "single_cell": [
//!     {"id": 1, "account_col_name": "cont", "account_code": "401", "value_col_name": "sold"}
//!   ],
//!   "micro_calc": [
//!     {"id": 2, "account_col_name": "cont", "micro_formula": "sold@401 - sold@402"}
//!   ],
//!   "special_rfc": false
//! }
//! ```
//!
//! When `special_rfc` is present, string values written as `normal:special`
//! are narrowed to one side before use.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{BatchError, BatchResult};

/// Key of the flag selecting which side of a split value is kept
pub const SPECIAL_RFC: &str = "special_rfc";

const ID: &str = "id";
const ACCOUNT_COL_NAME: &str = "account_col_name";
const ACCOUNT_CODE: &str = "account_code";
const VALUE_COL_NAME: &str = "value_col_name";
const MICRO_FORMULA: &str = "micro_formula";

/// How a field is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    /// One cell, looked up by account code
    SingleCell,
    /// Sum of one column over several account codes
    SumManyRowsSameCol,
    /// Difference of two cells
    SubtractSameRowTwoCols,
    /// Micro-formula, empty cells are errors
    MicroCalc,
    /// Micro-formula, empty cells count as zero
    MicroCalcFlexi,
}

impl Procedure {
    /// All procedures
    pub const ALL: [Procedure; 5] = [
        Procedure::SingleCell,
        Procedure::SumManyRowsSameCol,
        Procedure::SubtractSameRowTwoCols,
        Procedure::MicroCalc,
        Procedure::MicroCalcFlexi,
    ];

    /// Key of this procedure in the fields document
    pub fn name(self) -> &'static str {
        match self {
            Procedure::SingleCell => "single_cell",
            Procedure::SumManyRowsSameCol => "sum_many_rows_same_col",
            Procedure::SubtractSameRowTwoCols => "subtract_same_row_two_cols",
            Procedure::MicroCalc => "micro_calc",
            Procedure::MicroCalcFlexi => "micro_calc_flexi",
        }
    }

    /// Find a procedure by its document key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Check if fields of this procedure carry a micro-formula
    pub fn is_micro(self) -> bool {
        matches!(self, Procedure::MicroCalc | Procedure::MicroCalcFlexi)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Procedure-specific settings of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldParams {
    /// Account code(s) and value column(s), comma separated where a
    /// procedure takes several
    Lookup {
        account_code: String,
        value_col_name: String,
    },
    /// A micro-formula, kept verbatim
    Formula(String),
}

/// One field to compute
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Identifier echoed in the result, any JSON value
    pub id: Value,
    /// Column holding the account codes (row keys)
    pub account_col_name: String,
    pub params: FieldParams,
}

/// Fields sharing a procedure, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub procedure: Procedure,
    pub fields: Vec<FieldSpec>,
}

/// A loaded fields document
#[derive(Debug, Clone)]
pub struct FieldsDocument {
    entries: Map<String, Value>,
}

impl FieldsDocument {
    /// Read a fields document from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> BatchResult<Self> {
        let path = path.as_ref();
        log::debug!("Reading field definitions from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BatchError::FieldsNotFound(e),
            _ => BatchError::FieldsUnreadable(e),
        })?;
        content.parse()
    }

    /// Wrap an already parsed JSON value
    pub fn from_value(value: Value) -> BatchResult<Self> {
        match value {
            Value::Object(entries) if !entries.is_empty() => Ok(Self { entries }),
            _ => Err(BatchError::NoFields),
        }
    }

    /// The special flag, when the document sets one
    pub fn special_rfc(&self) -> Option<bool> {
        self.entries.get(SPECIAL_RFC).map(is_truthy)
    }

    /// Validate and collect the field groups, skipping unknown keys
    pub fn groups(&self, split_separator: char) -> BatchResult<Vec<FieldGroup>> {
        let special = self.special_rfc();
        let mut groups = Vec::new();

        for (key, value) in &self.entries {
            let Some(procedure) = Procedure::from_name(key) else {
                if key != SPECIAL_RFC {
                    log::warn!("Ignoring unknown procedure `{}` in field definitions", key);
                }
                continue;
            };

            let items = match value {
                Value::Array(items) if !items.is_empty() => items,
                _ => return Err(BatchError::InvalidProcedure(key.clone())),
            };

            let fields = items
                .iter()
                .map(|item| parse_field(procedure, item, special, split_separator))
                .collect::<BatchResult<Vec<_>>>()?;

            groups.push(FieldGroup { procedure, fields });
        }

        Ok(groups)
    }
}

impl FromStr for FieldsDocument {
    type Err = BatchError;

    fn from_str(s: &str) -> BatchResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }
}

fn parse_field(
    procedure: Procedure,
    item: &Value,
    special: Option<bool>,
    split_separator: char,
) -> BatchResult<FieldSpec> {
    let Value::Object(object) = item else {
        return Err(BatchError::FieldNotObject(procedure.name().to_string()));
    };

    let mut object = object.clone();
    if let Some(after) = special {
        split_special_values(&mut object, split_separator, after);
    }

    let id = object
        .get(ID)
        .cloned()
        .ok_or_else(|| BatchError::MissingKey {
            procedure: procedure.name().to_string(),
            key: ID,
        })?;
    let account_col_name = strip_whitespace(required_str(&object, procedure, ACCOUNT_COL_NAME)?);

    let params = if procedure.is_micro() {
        // Whitespace inside formulas is handled by the parser
        FieldParams::Formula(required_str(&object, procedure, MICRO_FORMULA)?.to_string())
    } else {
        FieldParams::Lookup {
            account_code: strip_whitespace(required_str(&object, procedure, ACCOUNT_CODE)?),
            value_col_name: strip_whitespace(required_str(&object, procedure, VALUE_COL_NAME)?),
        }
    };

    Ok(FieldSpec {
        id,
        account_col_name,
        params,
    })
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    procedure: Procedure,
    key: &'static str,
) -> BatchResult<&'a str> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(BatchError::NotAString {
            procedure: procedure.name().to_string(),
            key,
        }),
        None => Err(BatchError::MissingKey {
            procedure: procedure.name().to_string(),
            key,
        }),
    }
}

/// Keep the second separated segment when `after` is set, the first one
/// otherwise. Segments past the second are dropped. Values without the
/// separator are left alone.
fn split_special_values(object: &mut Map<String, Value>, separator: char, after: bool) {
    for value in object.values_mut() {
        if let Value::String(s) = value {
            if !s.contains(separator) {
                continue;
            }
            let index = usize::from(after);
            let kept = s.split(separator).nth(index).unwrap_or_default().to_string();
            *s = kept;
        }
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
