// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for sequence orchestration.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Sequence run started.
///
/// # Log Level
/// `info` - Important operational event
pub struct SequenceStarted<'a> {
    pub sequence: &'a str,
    pub pipeline_count: usize,
    pub has_input: bool,
}

impl Display for SequenceStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sequence '{}' started: {} pipelines, initial input {}",
            self.sequence,
            self.pipeline_count,
            if self.has_input { "present" } else { "absent" }
        )
    }
}

/// One pipeline was dispatched by the sequence.
///
/// # Log Level
/// `debug` - Routine lifecycle event
pub struct PipelineDispatched<'a> {
    pub sequence: &'a str,
    pub index: usize,
    pub pipeline: &'a str,
    pub shape: &'a str,
}

impl Display for PipelineDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sequence '{}' dispatching pipeline {} ('{}', {})",
            self.sequence, self.index, self.pipeline, self.shape
        )
    }
}

/// Sequence finished every pipeline.
///
/// # Log Level
/// `info` - Important operational event
pub struct SequenceCompleted<'a> {
    pub sequence: &'a str,
    pub output_rows: Option<usize>,
    pub duration: Duration,
}

impl Display for SequenceCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let rows = match self.output_rows {
            Some(rows) => rows.to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "Sequence '{}' completed: output_rows={}, duration={:?}",
            self.sequence, rows, self.duration
        )
    }
}

/// Sequence aborted on its first failure.
///
/// # Log Level
/// `error` - Failure requiring attention
pub struct SequenceFailed<'a> {
    pub sequence: &'a str,
    pub index: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for SequenceFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sequence '{}' aborted at pipeline {}: {}",
            self.sequence, self.index, self.error
        )
    }
}
