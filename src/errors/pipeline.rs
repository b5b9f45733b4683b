// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for pipeline assembly, pipeline execution and sequence orchestration.

use std::fmt;

use thiserror::Error;

use crate::engine::Shape;
use crate::errors::UnitError;
use crate::traits::Capability;

/// Which end of a pipeline failed its boundary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPosition {
    First,
    Last,
}

impl fmt::Display for BoundaryPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPosition::First => f.write_str("first"),
            BoundaryPosition::Last => f.write_str("last"),
        }
    }
}

fn describe(found: &Option<Capability>) -> String {
    match found {
        Some(capability) => capability.to_string(),
        None => "nothing".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Construction-time boundary contract violation.
    #[error(
        "{shape} pipeline '{pipeline}': the {position} unit must be a {expected}, found {}",
        describe(.found)
    )]
    ShapeValidation {
        pipeline: String,
        shape: Shape,
        position: BoundaryPosition,
        expected: &'static str,
        found: Option<Capability>,
    },

    /// A unit failed during `run`; `source` is the unit's own error.
    #[error("Pipeline '{pipeline}' failed at unit {position} ('{unit}'): {source}")]
    UnitExecution {
        pipeline: String,
        position: usize,
        unit: String,
        #[source]
        source: UnitError,
    },

    /// A FLOW_THROUGH or EXPORT pipeline was reached with no current value.
    #[error("{shape} pipeline '{pipeline}' requires input data, but none was provided")]
    MissingInput { pipeline: String, shape: Shape },

    /// A strategy was applied without a table to apply it to.
    #[error("Strategy '{strategy}' requires input data, but none was provided")]
    MissingStrategyInput { strategy: String },

    #[error("Unknown pipeline shape: '{shape}'")]
    UnknownPipelineShape { shape: String },

    /// The last unit left a payload that does not fit the pipeline's `run` signature.
    #[error("Pipeline '{pipeline}' finished with {found}, expected {expected}")]
    UnexpectedOutput {
        pipeline: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PipelineError {
    /// The underlying unit failure, if this error came from a unit.
    pub fn unit_error(&self) -> Option<&UnitError> {
        match self {
            PipelineError::UnitExecution { source, .. } => Some(source),
            _ => None,
        }
    }
}
