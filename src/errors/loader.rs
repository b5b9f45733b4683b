// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for definition loading and registry resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::PipelineError;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("The file '{}' does not exist.", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but lacks the binding the loader variant requires.
    #[error("'{file}' does not contain a valid '{binding}' definition.")]
    DefinitionNotFound { binding: &'static str, file: String },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{file}': {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown unit kind '{kind}'")]
    UnknownUnit { kind: String },

    #[error("Unknown pipeline factory '{name}'")]
    UnknownFactory { name: String },

    #[error("Unknown strategy function '{name}'")]
    UnknownStrategy { name: String },

    #[error("Invalid options for '{kind}': {reason}")]
    InvalidOptions { kind: String, reason: String },

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("The number of pipelines ({pipelines}) must match the number of argument mappings ({args})")]
    ArgumentCountMismatch { pipelines: usize, args: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl LoaderError {
    pub fn invalid_options(kind: impl Into<String>, reason: impl ToString) -> Self {
        LoaderError::InvalidOptions {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }
}
