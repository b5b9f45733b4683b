// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline assembly and unit execution.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Pipeline run started.
///
/// # Log Level
/// `debug` - Routine lifecycle event
pub struct PipelineStarted<'a> {
    pub pipeline: &'a str,
    pub shape: &'a str,
    pub unit_count: usize,
}

impl Display for PipelineStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} pipeline '{}' started: {} units",
            self.shape, self.pipeline, self.unit_count
        )
    }
}

/// Pipeline run completed.
///
/// # Log Level
/// `info` - Important operational event
pub struct PipelineCompleted<'a> {
    pub pipeline: &'a str,
    pub output_rows: Option<usize>,
    pub duration: Duration,
}

impl Display for PipelineCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.output_rows {
            Some(rows) => write!(
                f,
                "Pipeline '{}' completed: output_rows={}, duration={:?}",
                self.pipeline, rows, self.duration
            ),
            None => write!(
                f,
                "Pipeline '{}' completed: no output, duration={:?}",
                self.pipeline, self.duration
            ),
        }
    }
}

/// A unit finished successfully.
///
/// # Log Level
/// `debug` - Per-unit trace
pub struct UnitCompleted<'a> {
    pub pipeline: &'a str,
    pub position: usize,
    pub unit: &'a str,
    pub duration: Duration,
}

impl Display for UnitCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' unit {} ('{}') completed in {:?}",
            self.pipeline, self.position, self.unit, self.duration
        )
    }
}

/// A unit raised during `run`.
///
/// # Log Level
/// `error` - Failure requiring attention
pub struct UnitFailed<'a> {
    pub pipeline: &'a str,
    pub position: usize,
    pub unit: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for UnitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' unit {} ('{}') failed: {}",
            self.pipeline, self.position, self.unit, self.error
        )
    }
}
