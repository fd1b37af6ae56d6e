//! Error taxonomy for the reporting core.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use std::path::PathBuf;

use thiserror::Error;

/// The source could not be turned into a dataset: unreadable, malformed, or
/// missing a required column. Fatal to the session; nothing is rendered after
/// one of these.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// The filtered record set is empty. Recoverable: the caller shows a
/// "no data matches the active filters" notice and withholds metrics and
/// charts instead of rendering over zero rows.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no records match the active filters")]
pub struct EmptyDataset;

/// The filtered records could not be written out as CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}
