// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named table-to-table callables.
//!
//! A strategy runs its units in order like a pipeline does, but no
//! boundary capabilities are enforced; the only requirement is that the
//! last unit leaves exactly one table behind.

use crate::backends::local::units::FnTransformer;
use crate::config::StrategyFn;
use crate::engine::stages::Stages;
use crate::errors::PipelineError;
use crate::observability::Logger;
use crate::table::Table;
use crate::traits::{Payload, Unit};

#[derive(Debug, Clone)]
pub struct Strategy {
    stages: Stages,
}

impl Strategy {
    pub fn new(name: impl Into<String>, units: Vec<Unit>, logger: Option<Logger>) -> Self {
        Self {
            stages: Stages::new(name.into(), units, logger),
        }
    }

    /// Wrap a registered function as a single-unit strategy.
    pub fn from_fn(name: impl Into<String>, function: StrategyFn) -> Self {
        Self::new(name, vec![Unit::transformer(FnTransformer::new(function))], None)
    }

    pub fn name(&self) -> &str {
        self.stages.name()
    }

    pub fn units(&self) -> &[Unit] {
        self.stages.units()
    }

    /// Apply to `table`. A strategy with no units returns its input.
    pub fn apply(&self, table: &Table) -> Result<Table, PipelineError> {
        match self.stages.execute(Payload::One(table.clone()))? {
            Payload::One(output) => Ok(output),
            other => Err(PipelineError::UnexpectedOutput {
                pipeline: self.name().to_string(),
                expected: "one table",
                found: other.describe(),
            }),
        }
    }
}
