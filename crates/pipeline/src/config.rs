use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub name: String,
    /// Inclusive lower bound for the capture date (the upper bound is the
    /// wall clock at run time).
    pub start_date: NaiveDate,
    #[serde(default = "default_true")]
    pub drop_rows_without_phone: bool,
    #[serde(default = "default_true")]
    pub drop_rows_without_email: bool,
    /// When true, any canonical column absent from the source aborts the
    /// run. Default is permissive: warn and continue degraded.
    #[serde(default)]
    pub strict_columns: bool,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    pub leads: LeadsConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

fn default_true() -> bool {
    true
}

fn default_id_prefix() -> String {
    "azercaguias-".into()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LeadsConfig {
    /// Leads file; `.csv` or a spreadsheet (`.xlsx`/`.xls`/`.ods`) — the
    /// caller decides by extension.
    pub file: String,
    /// CSV delimiter (ignored for spreadsheets).
    #[serde(default = "default_leads_delimiter")]
    pub delimiter: char,
}

fn default_leads_delimiter() -> char {
    ','
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub file: String,
    /// Column of the reference CSV holding the postal codes.
    #[serde(default = "default_catalog_column")]
    pub column: String,
    #[serde(default = "default_catalog_delimiter")]
    pub delimiter: char,
}

fn default_catalog_column() -> String {
    "plvd_name".into()
}

fn default_catalog_delimiter() -> char {
    ';'
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Cleaned table destination (CSV).
    #[serde(default)]
    pub file: Option<String>,
    /// Run report destination (JSON).
    #[serde(default)]
    pub json: Option<String>,
}

/// Constant classification columns stamped onto every output row.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_record_type")]
    pub tipo_registro: String,
    #[serde(default = "default_record_subtype")]
    pub subtipo_registro: String,
    #[serde(default = "default_brand")]
    pub marca: String,
    #[serde(default = "default_subchannel")]
    pub subcanal: String,
}

fn default_record_type() -> String {
    "Inbound".into()
}

fn default_record_subtype() -> String {
    "Guias".into()
}

fn default_brand() -> String {
    "EAE".into()
}

fn default_subchannel() -> String {
    "Empresas".into()
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        ClassificationConfig {
            tipo_registro: default_record_type(),
            subtipo_registro: default_record_subtype(),
            marca: default_brand(),
            subcanal: default_subchannel(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::ConfigValidation("name must not be empty".into()));
        }
        if self.leads.file.trim().is_empty() {
            return Err(PipelineError::ConfigValidation("leads.file must not be empty".into()));
        }
        if self.catalog.file.trim().is_empty() {
            return Err(PipelineError::ConfigValidation("catalog.file must not be empty".into()));
        }
        if self.catalog.column.trim().is_empty() {
            return Err(PipelineError::ConfigValidation(
                "catalog.column must not be empty".into(),
            ));
        }
        if !self.leads.delimiter.is_ascii() || !self.catalog.delimiter.is_ascii() {
            return Err(PipelineError::ConfigValidation(
                "delimiters must be single ASCII characters".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
