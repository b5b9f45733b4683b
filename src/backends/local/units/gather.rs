// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compound units: several inputs gathered, optionally reduced.

use std::sync::Arc;

use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::Table;
use crate::traits::{Collector, Payload, Producer, Reducer, Transformer, Unit};

pub const GATHER: &str = "gather";
pub const GATHER_AND_REDUCE: &str = "gather_and_reduce";
pub const FAN_OUT: &str = "fan_out";

/// Runs every nested input and hands the results on as a list.
///
/// Inputs are usually producers; a nested collector contributes all of
/// its tables in order.
pub struct GatherInputs {
    inputs: Vec<Unit>,
    logger: UnitLogger,
}

impl GatherInputs {
    pub fn new(inputs: Vec<Unit>) -> Self {
        Self {
            inputs,
            logger: UnitLogger::disabled(GATHER),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn inputs(&self) -> &[Unit] {
        &self.inputs
    }
}

impl Collector for GatherInputs {
    fn collect(&self) -> UnitResult<Vec<Table>> {
        let mut tables = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            match input.invoke(Payload::Empty)? {
                Payload::One(table) => tables.push(table),
                Payload::Many(many) => tables.extend(many),
                Payload::Empty => {
                    return Err(UnitError::InputMismatch {
                        unit: input.name().to_string(),
                        expected: "a table-producing input",
                        found: "no output",
                    })
                }
            }
        }
        self.logger
            .info(format_args!("Gathered {} tables", tables.len()));
        Ok(tables)
    }

    fn name(&self) -> &'static str {
        GATHER
    }
}

/// A gather whose list is reduced to one table before leaving the unit.
pub struct GatherAndReduce {
    gather: GatherInputs,
    reducer: Arc<dyn Reducer>,
}

impl GatherAndReduce {
    pub fn new(inputs: Vec<Unit>, reducer: Arc<dyn Reducer>) -> Self {
        Self {
            gather: GatherInputs::new(inputs),
            reducer,
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.gather = self.gather.with_logger(logger);
        self
    }
}

impl Producer for GatherAndReduce {
    fn produce(&self) -> UnitResult<Table> {
        let tables = self.gather.collect()?;
        self.reducer.reduce(&tables)
    }

    fn name(&self) -> &'static str {
        GATHER_AND_REDUCE
    }

    fn source(&self) -> &str {
        GATHER_AND_REDUCE
    }
}

/// Applies every branch to the same input, then reduces the branch results.
pub struct FanOut {
    branches: Vec<Arc<dyn Transformer>>,
    reducer: Arc<dyn Reducer>,
    logger: UnitLogger,
}

impl FanOut {
    pub fn new(branches: Vec<Arc<dyn Transformer>>, reducer: Arc<dyn Reducer>) -> Self {
        Self {
            branches,
            reducer,
            logger: UnitLogger::disabled(FAN_OUT),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for FanOut {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let outputs = self
            .branches
            .iter()
            .map(|branch| branch.transform(table))
            .collect::<UnitResult<Vec<_>>>()?;
        self.logger.info(format_args!(
            "Fanned out to {} branches, reducing with '{}'",
            outputs.len(),
            self.reducer.name()
        ));
        self.reducer.reduce(&outputs)
    }

    fn name(&self) -> &'static str {
        FAN_OUT
    }
}
