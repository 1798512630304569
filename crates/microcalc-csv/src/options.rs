//! CSV options

/// Delimiters tried when none is configured, in order of preference
pub(crate) const SNIFF_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Options for reading CSV files
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: detected from the first lines)
    pub delimiter: Option<u8>,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Trim whitespace around header names and fields
    pub trim: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            trim: true,
        }
    }
}

impl CsvReadOptions {
    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}
