// leadclean CLI - headless lead cleaning runs

mod exit_codes;
mod input;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use leadclean_pipeline::{PipelineError, PostalCatalog, RunConfig};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_MISSING_COLUMN, EXIT_RUNTIME};

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "leadclean")]
#[command(about = "Clean, deduplicate and export marketing-lead spreadsheets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a cleaning pipeline from a TOML config file
    #[command(after_help = "\
Examples:
  leadclean run weekly.toml
  leadclean run weekly.toml --json
  leadclean run weekly.toml --output cleaned.csv")]
    Run {
        /// Path to the run config file
        config: PathBuf,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the cleaned table to this CSV file (overrides [output].file)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a run config without touching the input files
    #[command(after_help = "\
Examples:
  leadclean validate weekly.toml")]
    Validate {
        /// Path to the run config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn pipeline_exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::ConfigParse(_) | PipelineError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        PipelineError::MissingRequiredColumn(_) | PipelineError::MissingCatalogColumn { .. } => {
            EXIT_MISSING_COLUMN
        }
        PipelineError::Csv(_) | PipelineError::Io(_) => EXIT_RUNTIME,
    }
}

fn pipeline_err(err: PipelineError) -> CliError {
    CliError {
        code: pipeline_exit_code(&err),
        message: err.to_string(),
        hint: None,
    }
}

fn runtime_err(message: impl Into<String>) -> CliError {
    CliError {
        code: EXIT_RUNTIME,
        message: message.into(),
        hint: None,
    }
}

fn load_config(config_path: &Path) -> Result<RunConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| runtime_err(format!("cannot read config: {e}")))?;
    RunConfig::from_toml(&config_str).map_err(pipeline_err)
}

fn cmd_run(config_path: PathBuf, json_output: bool, output_override: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Input paths resolve relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let leads = input::read_table(&base_dir.join(&config.leads.file), config.leads.delimiter)
        .map_err(pipeline_err)?;
    let catalog_table =
        input::read_table(&base_dir.join(&config.catalog.file), config.catalog.delimiter)
            .map_err(pipeline_err)?;
    let catalog =
        PostalCatalog::from_table(&catalog_table, &config.catalog.column).map_err(pipeline_err)?;

    let result = leadclean_pipeline::run(&config, leads, &catalog).map_err(pipeline_err)?;

    for warning in &result.report.warnings {
        eprintln!("warning: {warning}");
    }

    // Cleaned table to CSV: --output beats [output].file.
    let table_dest = output_override.or_else(|| config.output.file.as_ref().map(PathBuf::from));
    if let Some(ref path) = table_dest {
        input::write_csv(&base_dir.join(path), &result.table).map_err(pipeline_err)?;
        eprintln!("wrote {}", path.display());
    }

    let json_str = serde_json::to_string_pretty(&result.report)
        .map_err(|e| runtime_err(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = config.output.json {
        std::fs::write(base_dir.join(path), &json_str)
            .map_err(|e| runtime_err(format!("cannot write report: {e}")))?;
        eprintln!("wrote {path}");
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.report.summary;
    eprintln!(
        "run '{}': {} rows in, {} after date filter, {} after phone pass, {} after email pass",
        result.report.meta.config_name,
        s.rows_before_date_filter,
        s.rows_after_date_filter,
        s.rows_after_phone_dedupe,
        s.rows_after_email_dedupe,
    );

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: run '{}' from {}, leads '{}', catalog '{}' (column '{}')",
        config.name,
        config.start_date,
        config.leads.file,
        config.catalog.file,
        config.catalog.column,
    );
    Ok(())
}
