//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use microcalc_core::{CellValue, Table};

use crate::error::{CsvError, CsvResult};
use crate::options::{CsvReadOptions, SNIFF_DELIMITERS};

/// Field contents read as empty cells
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Non-blank lines inspected when detecting the delimiter
const SNIFF_LINES: usize = 20;

/// Read a data file, choosing the reader from its extension
///
/// Only `.csv` files are supported; spreadsheet formats are rejected with
/// [`CsvError::UnsupportedFormat`].
pub fn read_table<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => CsvReader::read_file(path, options),
        "" => Err(CsvError::UnsupportedFormat(path.display().to_string())),
        other => Err(CsvError::UnsupportedFormat(format!(".{}", other))),
    }
}

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a table
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
        let path = path.as_ref();
        log::debug!("Reading data file {}", path.display());
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a table
    pub fn read<R: Read>(mut reader: R, options: &CsvReadOptions) -> CsvResult<Table> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content.as_str());

        let delimiter = match options.delimiter {
            Some(delimiter) => delimiter,
            None => {
                let delimiter = Self::sniff_delimiter(content, options.quote);
                log::debug!("Detected delimiter {:?}", char::from(delimiter));
                delimiter
            }
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(true)
            .trim(if options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(content.as_bytes());

        let headers = csv_reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CsvError::Empty);
        }

        let mut table = Table::new(Self::column_names(&headers))?;

        // Read records
        for result in csv_reader.records() {
            let record = result?;
            let row = record.iter().map(Self::detect_type).collect();
            table.push_row(row)?;
        }

        if table.row_count() == 0 {
            return Err(CsvError::Empty);
        }

        log::info!(
            "Read {} rows and {} columns",
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    /// Header names, with blanks named by position and repeats suffixed
    fn column_names(headers: &csv::StringRecord) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(headers.len());

        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim();
            let base = if header.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                header.to_string()
            };

            let mut name = base.clone();
            let mut suffix = 1;
            while names.contains(&name) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            if name != base {
                log::warn!("Duplicate column `{}` renamed to `{}`", base, name);
            }
            names.push(name);
        }

        names
    }

    /// Pick the delimiter that splits the first lines most consistently
    fn sniff_delimiter(content: &str, quote: u8) -> u8 {
        let lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(SNIFF_LINES)
            .collect();

        let mut best: Option<(u8, (bool, usize))> = None;
        for candidate in SNIFF_DELIMITERS {
            let counts: Vec<usize> = lines
                .iter()
                .map(|line| count_unquoted(line, candidate, quote))
                .collect();
            let Some(&first) = counts.first() else {
                continue;
            };
            if first == 0 {
                continue;
            }

            // Consistent candidates beat inconsistent ones, then wider headers win
            let score = (counts.iter().all(|&c| c == first), first);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.map_or(b',', |(delimiter, _)| delimiter)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if NA_VALUES.contains(&trimmed) {
            return CellValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::text(field),
        }
    }
}

/// Count `delimiter` bytes outside quoted sections of one line
fn count_unquoted(line: &str, delimiter: u8, quote: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for &byte in line.as_bytes() {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}
