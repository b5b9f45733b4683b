// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Heterogeneous pipeline orchestration.
//!
//! A [`Sequence`] threads one "current value" through pipelines of any
//! shape. Dispatch is on the [`Pipeline`] variant:
//!
//! * `FlowThrough` - requires a current value and replaces it with the result
//! * `Loading` - ignores the current value and replaces it with a fresh load
//! * `Export` - requires a current value, consumes it, leaves nothing behind
//!
//! Adjacent shapes are never checked up front; a missing value is found when
//! the pipeline that needs it is reached.

use std::time::Instant;

use crate::config::{Options, PipelineFactory, Registry};
use crate::config::consts::LOG_OPTION;
use crate::engine::Pipeline;
use crate::errors::{LoaderError, PipelineError};
use crate::observability::messages::sequence::{
    PipelineDispatched, SequenceCompleted, SequenceFailed, SequenceStarted,
};
use crate::observability::Logger;
use crate::table::Table;

/// Default name for sequences built without one.
pub const UNNAMED_SEQUENCE: &str = "sequence";

#[derive(Debug, Clone)]
pub struct Sequence {
    name: Option<String>,
    pipelines: Vec<Pipeline>,
    logger: Option<Logger>,
}

impl Sequence {
    pub fn new(pipelines: Vec<Pipeline>) -> Self {
        Self {
            name: None,
            pipelines,
            logger: None,
        }
    }

    pub fn named(name: impl Into<String>, pipelines: Vec<Pipeline>) -> Self {
        Self {
            name: Some(name.into()),
            pipelines,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Instantiate each factory with its own argument mapping.
    ///
    /// `log` is the shared default: it is merged under every mapping, so a
    /// mapping that sets `log` itself keeps its own value.
    pub fn from_factories(
        name: impl Into<String>,
        factories: Vec<PipelineFactory>,
        args: Vec<Options>,
        log: bool,
        registry: &Registry,
    ) -> Result<Self, LoaderError> {
        if factories.len() != args.len() {
            return Err(LoaderError::ArgumentCountMismatch {
                pipelines: factories.len(),
                args: args.len(),
            });
        }
        let pipelines = factories
            .iter()
            .zip(args)
            .map(|(factory, mut options)| {
                options.set_default(LOG_OPTION, log);
                factory(&options, registry)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let logger = if log { registry.logger().cloned() } else { None };
        Ok(Self::named(name, pipelines).with_logger(logger))
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_SEQUENCE)
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// Run every pipeline in order and return the final current value,
    /// `None` when the sequence ends on an export.
    pub fn run(&self, initial: Option<Table>) -> Result<Option<Table>, PipelineError> {
        let started = Instant::now();
        if let Some(logger) = &self.logger {
            logger.info(SequenceStarted {
                sequence: self.name(),
                pipeline_count: self.pipelines.len(),
                has_input: initial.is_some(),
            });
        }

        let mut current = initial;
        for (index, pipeline) in self.pipelines.iter().enumerate() {
            if let Some(logger) = &self.logger {
                logger.debug(PipelineDispatched {
                    sequence: self.name(),
                    index,
                    pipeline: pipeline.name(),
                    shape: pipeline.shape().as_str(),
                });
            }
            current = match pipeline.run(current.as_ref()) {
                Ok(next) => next,
                Err(error) => {
                    if let Some(logger) = &self.logger {
                        logger.error(SequenceFailed {
                            sequence: self.name(),
                            index,
                            error: &error,
                        });
                    }
                    return Err(error);
                }
            };
        }

        if let Some(logger) = &self.logger {
            logger.info(SequenceCompleted {
                sequence: self.name(),
                output_rows: current.as_ref().map(Table::height),
                duration: started.elapsed(),
            });
        }
        Ok(current)
    }
}
