//! `leadclean-pipeline` — lead cleaning and deduplication engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns the cleaned table
//! plus a run report. No file IO beyond parsing CSV text handed to it.

pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod postal;
pub mod schema;

pub use config::RunConfig;
pub use engine::{load_csv_table, run, run_at};
pub use error::PipelineError;
pub use model::{Cell, RunOutput, RunReport, RunSummary, StageReport, Table};
pub use postal::PostalCatalog;
