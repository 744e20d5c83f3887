use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty file path, bad delimiter, etc.).
    ConfigValidation(String),
    /// A column the pipeline depends on cannot be located after
    /// reconciliation. Fatal: the run aborts before producing output.
    MissingRequiredColumn(String),
    /// The catalog table lacks its designated postal-code column.
    MissingCatalogColumn { column: String },
    /// CSV structure error (bad headers, unreadable record).
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingRequiredColumn(column) => {
                write!(f, "required column '{column}' not found in source")
            }
            Self::MissingCatalogColumn { column } => {
                write!(f, "catalog is missing its postal-code column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}
