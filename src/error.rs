//! Error types for the attrition risk engine

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AttritionError>;

/// Top-level error returned by every fallible operation in the library
#[derive(Debug, Error)]
pub enum AttritionError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    /// A prediction row does not line up with the schema the pipeline was fitted on
    #[error(
        "schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}, mistyped columns {mistyped:?}"
    )]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        mistyped: Vec<String>,
    },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column {column} is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("column {column} has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),

    #[error("cache lock poisoned: {0}")]
    Lock(String),
}

/// Failures while reading the input dataset
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} contains no header row", .0.display())]
    Empty(PathBuf),
}

/// Failures while preparing data for, or fitting, the classifier
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("required column missing: {0}")]
    MissingColumn(String),

    #[error("unexpected label value {value:?} in row {row}")]
    InvalidLabel { row: usize, value: String },

    #[error("label column needs at least two distinct classes, found {0}")]
    DegenerateLabels(usize),

    #[error("class {class} has {count} row(s), a stratified split needs at least 2")]
    InsufficientClassMembers { class: u8, count: usize },

    #[error("test size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    #[error("no feature columns left after cleaning")]
    NoFeatures,

    #[error("model has not been fitted")]
    NotFitted,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },
}
