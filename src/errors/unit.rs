// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failures raised by individual units while they run.

use thiserror::Error;

/// Error type for everything a unit can raise from its capability method.
///
/// The composition layer wraps these in
/// [`PipelineError::UnitExecution`](crate::errors::PipelineError::UnitExecution)
/// together with the failing unit's position and name; the variant itself
/// is preserved so callers can still match on the original kind.
#[derive(Error, Debug)]
pub enum UnitError {
    /// Number of tables does not match the number of declared destinations.
    #[error("Arity mismatch: received {values} values for {destinations} destinations")]
    ArityMismatch { values: usize, destinations: usize },

    /// A reducer was handed no inputs and defines no identity result.
    #[error("Reducer '{unit}' received no inputs to reduce")]
    EmptyReduction { unit: String },

    /// File format token (text after the last `.`) is not csv, pq or json.
    #[error("Unsupported file format '{token}' for path '{path}'. Supported formats: csv, pq, json.")]
    UnsupportedFormat { token: String, path: String },

    /// A unit was invoked with a payload its capability cannot consume.
    #[error("Unit '{unit}' expects {expected} but received {found}")]
    InputMismatch {
        unit: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Cannot cast column '{column}' to {dtype}: {reason}")]
    Cast {
        column: String,
        dtype: String,
        reason: String,
    },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Columns whose types differ from the ones a check expected.
    #[error("Type check failed: {0}")]
    TypeCheck(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Free-form failure from user-supplied units and strategy functions.
    #[error("{0}")]
    Failed(String),
}

impl UnitError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        UnitError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type UnitResult<T> = Result<T, UnitError>;
