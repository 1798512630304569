//! Formula configuration

/// Default label separator between column name and row key
pub const DEFAULT_SEPARATOR: char = '@';

/// Default extra characters allowed inside a reference term
pub const DEFAULT_EXTRA_CHARS: &str = "._";

/// Default maximum depth of a parse tree
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings shared by the parser, the term resolver and the evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct MicroConfig {
    /// Splits a reference term into column name and row key
    pub separator: char,
    /// Characters besides ASCII letters and digits allowed after the first
    /// character of a term (the separator is always allowed)
    pub extra_chars: String,
    /// Maximum nesting of the formula: open parentheses, signs and
    /// operands of a higher-precedence or grouped sub-expression. Each step
    /// of a flat chain such as `a+b+c` stays at the same level.
    pub max_depth: usize,
    /// When false, an empty referenced cell counts as zero instead of
    /// producing an error
    pub strict: bool,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            extra_chars: DEFAULT_EXTRA_CHARS.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            strict: true,
        }
    }
}

impl MicroConfig {
    /// Set the label separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the extra term characters
    pub fn with_extra_chars<S: Into<String>>(mut self, extra_chars: S) -> Self {
        self.extra_chars = extra_chars.into();
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Toggle strict handling of empty cells
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// All non-alphanumeric characters a term may contain
    pub fn allowed_chars(&self) -> String {
        let mut chars = String::with_capacity(self.extra_chars.len() + 1);
        chars.push(self.separator);
        chars.push_str(&self.extra_chars);
        chars
    }
}
