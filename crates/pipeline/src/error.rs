use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, bad top_n, etc.).
    ConfigValidation(String),
    /// Required column absent from an input table.
    MissingColumn { table: String, column: String },
    /// A numeric column holds text that does not parse as a number.
    /// `row` is the 1-based row number in the source sheet.
    InvalidNumber { table: String, row: usize, column: String, value: String },
    /// Commitment SKU appears more than once and duplicates are rejected.
    DuplicateSku { sku: String, count: usize },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "{table} table: missing column '{column}'")
            }
            Self::InvalidNumber { table, row, column, value } => {
                write!(f, "{table} table, row {row}: cannot parse '{value}' in column '{column}' as a number")
            }
            Self::DuplicateSku { sku, count } => {
                write!(f, "commitment table: SKU '{sku}' appears {count} times")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// True for errors caused by the uploaded tables rather than the config.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::InvalidNumber { .. } | Self::DuplicateSku { .. }
        )
    }
}
