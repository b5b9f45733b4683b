// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shape-validated pipelines.
//!
//! Each shape is its own type with its own `run` signature, and
//! [`Pipeline`] is the tagged variant the [`Sequence`](crate::engine::Sequence)
//! dispatches on. Boundary capabilities are checked once, in the
//! constructor; a pipeline that exists is well-formed.
//!
//! ```rust
//! use the_pipewood::engine::{FlowThroughPipe, Shape};
//! use the_pipewood::errors::PipelineError;
//! use the_pipewood::traits::Unit;
//! use the_pipewood::backends::local::units::MergeTables;
//!
//! // A reducer cannot open a FLOW_THROUGH pipeline.
//! let err = FlowThroughPipe::new("bad", vec![Unit::reducer(MergeTables::concat())]).unwrap_err();
//! assert!(matches!(err, PipelineError::ShapeValidation { shape: Shape::FlowThrough, .. }));
//! ```

use std::time::Instant;

use crate::engine::stages::Stages;
use crate::engine::Shape;
use crate::errors::PipelineError;
use crate::observability::messages::pipeline::{PipelineCompleted, PipelineStarted};
use crate::observability::Logger;
use crate::table::Table;
use crate::traits::{Payload, Unit};

fn validated(
    shape: Shape,
    name: String,
    units: Vec<Unit>,
    logger: Option<Logger>,
) -> Result<Stages, PipelineError> {
    shape.validate(
        &name,
        units.first().map(Unit::capability),
        units.last().map(Unit::capability),
    )?;
    Ok(Stages::new(name, units, logger))
}

fn run_stages(stages: &Stages, shape: Shape, payload: Payload) -> Result<Payload, PipelineError> {
    let started = Instant::now();
    if let Some(logger) = stages.logger() {
        logger.debug(PipelineStarted {
            pipeline: stages.name(),
            shape: shape.as_str(),
            unit_count: stages.units().len(),
        });
    }
    let output = stages.execute(payload)?;
    if let Some(logger) = stages.logger() {
        let output_rows = match &output {
            Payload::One(table) => Some(table.height()),
            _ => None,
        };
        logger.info(PipelineCompleted {
            pipeline: stages.name(),
            output_rows,
            duration: started.elapsed(),
        });
    }
    Ok(output)
}

fn expect_table(stages: &Stages, payload: Payload) -> Result<Table, PipelineError> {
    match payload {
        Payload::One(table) => Ok(table),
        other => Err(PipelineError::UnexpectedOutput {
            pipeline: stages.name().to_string(),
            expected: "one table",
            found: other.describe(),
        }),
    }
}

/// Starts from nothing and ends in a reducer: `run() -> Table`.
#[derive(Debug, Clone)]
pub struct LoadingPipe {
    stages: Stages,
}

impl LoadingPipe {
    pub fn new(name: impl Into<String>, units: Vec<Unit>) -> Result<Self, PipelineError> {
        Self::with_logger(name, units, None)
    }

    pub fn with_logger(
        name: impl Into<String>,
        units: Vec<Unit>,
        logger: Option<Logger>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            stages: validated(Shape::Loading, name.into(), units, logger)?,
        })
    }

    /// The first unit is invoked with no input.
    pub fn run(&self) -> Result<Table, PipelineError> {
        let output = run_stages(&self.stages, Shape::Loading, Payload::Empty)?;
        expect_table(&self.stages, output)
    }

    pub fn name(&self) -> &str {
        self.stages.name()
    }

    pub fn units(&self) -> &[Unit] {
        self.stages.units()
    }
}

/// Table in, table out: `run(&Table) -> Table`.
#[derive(Debug, Clone)]
pub struct FlowThroughPipe {
    stages: Stages,
}

impl FlowThroughPipe {
    pub fn new(name: impl Into<String>, units: Vec<Unit>) -> Result<Self, PipelineError> {
        Self::with_logger(name, units, None)
    }

    pub fn with_logger(
        name: impl Into<String>,
        units: Vec<Unit>,
        logger: Option<Logger>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            stages: validated(Shape::FlowThrough, name.into(), units, logger)?,
        })
    }

    pub fn run(&self, table: &Table) -> Result<Table, PipelineError> {
        let output = run_stages(&self.stages, Shape::FlowThrough, Payload::One(table.clone()))?;
        expect_table(&self.stages, output)
    }

    pub fn name(&self) -> &str {
        self.stages.name()
    }

    pub fn units(&self) -> &[Unit] {
        self.stages.units()
    }
}

/// Table in, side effects out: `run(&Table) -> ()`.
#[derive(Debug, Clone)]
pub struct ExportPipe {
    stages: Stages,
}

impl ExportPipe {
    pub fn new(name: impl Into<String>, units: Vec<Unit>) -> Result<Self, PipelineError> {
        Self::with_logger(name, units, None)
    }

    pub fn with_logger(
        name: impl Into<String>,
        units: Vec<Unit>,
        logger: Option<Logger>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            stages: validated(Shape::Export, name.into(), units, logger)?,
        })
    }

    pub fn run(&self, table: &Table) -> Result<(), PipelineError> {
        run_stages(&self.stages, Shape::Export, Payload::One(table.clone()))?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.stages.name()
    }

    pub fn units(&self) -> &[Unit] {
        self.stages.units()
    }
}

/// A pipeline of any shape.
#[derive(Debug, Clone)]
pub enum Pipeline {
    Loading(LoadingPipe),
    FlowThrough(FlowThroughPipe),
    Export(ExportPipe),
}

impl Pipeline {
    /// Build and validate a pipeline of the given shape.
    pub fn new(
        name: impl Into<String>,
        shape: Shape,
        units: Vec<Unit>,
        logger: Option<Logger>,
    ) -> Result<Self, PipelineError> {
        Ok(match shape {
            Shape::Loading => Pipeline::Loading(LoadingPipe::with_logger(name, units, logger)?),
            Shape::FlowThrough => {
                Pipeline::FlowThrough(FlowThroughPipe::with_logger(name, units, logger)?)
            }
            Shape::Export => Pipeline::Export(ExportPipe::with_logger(name, units, logger)?),
        })
    }

    pub fn shape(&self) -> Shape {
        match self {
            Pipeline::Loading(_) => Shape::Loading,
            Pipeline::FlowThrough(_) => Shape::FlowThrough,
            Pipeline::Export(_) => Shape::Export,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Pipeline::Loading(p) => p.name(),
            Pipeline::FlowThrough(p) => p.name(),
            Pipeline::Export(p) => p.name(),
        }
    }

    pub fn units(&self) -> &[Unit] {
        match self {
            Pipeline::Loading(p) => p.units(),
            Pipeline::FlowThrough(p) => p.units(),
            Pipeline::Export(p) => p.units(),
        }
    }

    /// Shape-agnostic entry point: LOADING ignores `input`, the other shapes
    /// require it. EXPORT returns `None`.
    pub fn run(&self, input: Option<&Table>) -> Result<Option<Table>, PipelineError> {
        match self {
            Pipeline::Loading(p) => p.run().map(Some),
            Pipeline::FlowThrough(p) => p.run(self.require(input)?).map(Some),
            Pipeline::Export(p) => p.run(self.require(input)?).map(|_| None),
        }
    }

    fn require<'a>(&self, input: Option<&'a Table>) -> Result<&'a Table, PipelineError> {
        input.ok_or_else(|| PipelineError::MissingInput {
            pipeline: self.name().to_string(),
            shape: self.shape(),
        })
    }
}

impl From<LoadingPipe> for Pipeline {
    fn from(pipe: LoadingPipe) -> Self {
        Pipeline::Loading(pipe)
    }
}

impl From<FlowThroughPipe> for Pipeline {
    fn from(pipe: FlowThroughPipe) -> Self {
        Pipeline::FlowThrough(pipe)
    }
}

impl From<ExportPipe> for Pipeline {
    fn from(pipe: ExportPipe) -> Self {
        Pipeline::Export(pipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::units::{GatherInputs, MergeTables, WriteMany};
    use crate::backends::stub::{
        AppendRowTransformer, FailingTransformer, FixedProducer, IdentityTransformer, RecordingSink,
    };
    use crate::errors::{BoundaryPosition, UnitError};
    use crate::traits::{Capability, MultiSink};
    use std::sync::Arc;

    #[test]
    fn test_flow_through_requires_transformer_first() {
        let err = FlowThroughPipe::new(
            "bad",
            vec![Unit::producer(FixedProducer::rows(1)), Unit::transformer(IdentityTransformer)],
        )
        .unwrap_err();
        match err {
            PipelineError::ShapeValidation { position, expected, found, .. } => {
                assert_eq!(position, BoundaryPosition::First);
                assert_eq!(expected, "Transformer");
                assert_eq!(found, Some(Capability::Producer));
            }
            other => panic!("Expected ShapeValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_export_requires_sink_last() {
        let err = ExportPipe::new(
            "bad",
            vec![Unit::transformer(IdentityTransformer), Unit::transformer(IdentityTransformer)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeValidation { position: BoundaryPosition::Last, .. }
        ));
    }

    #[test]
    fn test_empty_pipeline_is_rejected() {
        let err = LoadingPipe::new("empty", vec![]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeValidation { position: BoundaryPosition::First, found: None, .. }
        ));
    }

    #[test]
    fn test_flow_through_runs_left_to_right() {
        let pipe = FlowThroughPipe::new(
            "append",
            vec![
                Unit::transformer(AppendRowTransformer::new("a")),
                Unit::transformer(AppendRowTransformer::new("b")),
                Unit::transformer(AppendRowTransformer::new("c")),
            ],
        )
        .unwrap();
        let out = pipe.run(&AppendRowTransformer::seed()).unwrap();
        let tags: Vec<String> = out.column("tag").unwrap().values().iter().map(|v| v.to_string()).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_loading_concat_multiplies_rows() {
        let k = 4;
        let rows = 3;
        let producers = (0..k).map(|_| Unit::producer(FixedProducer::rows(rows))).collect();
        let pipe = LoadingPipe::new(
            "load",
            vec![
                Unit::collector(GatherInputs::new(producers)),
                Unit::reducer(MergeTables::concat()),
            ],
        )
        .unwrap();
        let out = pipe.run().unwrap();
        assert_eq!(out.height(), k * rows);
    }

    #[test]
    fn test_loading_single_producer_then_reducer() {
        let pipe = LoadingPipe::new(
            "load",
            vec![Unit::producer(FixedProducer::rows(5)), Unit::reducer(MergeTables::concat())],
        )
        .unwrap();
        assert_eq!(pipe.run().unwrap(), FixedProducer::rows(5).table());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let pipe = FlowThroughPipe::new(
            "twice",
            vec![Unit::transformer(AppendRowTransformer::new("x"))],
        )
        .unwrap();
        let input = AppendRowTransformer::seed();
        let first = pipe.run(&input).unwrap();
        let second = pipe.run(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(input.height(), 0);
    }

    #[test]
    fn test_failing_unit_reports_position_and_name() {
        let sink = Arc::new(RecordingSink::new());
        let pipe = ExportPipe::new(
            "export",
            vec![
                Unit::transformer(IdentityTransformer),
                Unit::transformer(FailingTransformer::new("boom")),
                Unit::Sink(sink.clone()),
            ],
        )
        .unwrap();
        let err = pipe.run(&FixedProducer::rows(1).table()).unwrap_err();
        match &err {
            PipelineError::UnitExecution { position, unit, source, .. } => {
                assert_eq!(*position, 1);
                assert_eq!(unit, "failing");
                assert!(matches!(source, UnitError::Failed(msg) if msg == "boom"));
            }
            other => panic!("Expected UnitExecution, got {:?}", other),
        }
        assert_eq!(sink.writes(), 0, "downstream units must not run after a failure");
    }

    #[test]
    fn test_interior_mismatch_surfaces_at_run_time() {
        // A sink in the middle passes construction but leaves nothing for the
        // final sink.
        let pipe = ExportPipe::new(
            "double_sink",
            vec![
                Unit::transformer(IdentityTransformer),
                Unit::sink(RecordingSink::new()),
                Unit::sink(RecordingSink::new()),
            ],
        )
        .unwrap();
        let err = pipe.run(&FixedProducer::rows(1).table()).unwrap_err();
        assert!(matches!(
            err.unit_error(),
            Some(UnitError::InputMismatch { found: "no input", .. })
        ));
    }

    #[test]
    fn test_multi_sink_arity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ["a.csv", "b.csv", "c.csv"]
            .iter()
            .map(|p| dir.path().join(p).display().to_string())
            .collect();
        let pipe = ExportPipe::new(
            "many",
            vec![
                Unit::transformer(IdentityTransformer),
                Unit::multi_sink(WriteMany::new(paths)),
            ],
        )
        .unwrap();
        let unit = WriteMany::new(vec!["x.csv".into(), "y.csv".into(), "z.csv".into()]);
        let table = FixedProducer::rows(1).table();
        let err = unit.write_all(&[table.clone(), table.clone()]).unwrap_err();
        assert!(matches!(err, UnitError::ArityMismatch { values: 2, destinations: 3 }));

        // through the pipeline a single table is a one-element list
        let err = pipe.run(&table).unwrap_err();
        assert!(matches!(
            err.unit_error(),
            Some(UnitError::ArityMismatch { values: 1, destinations: 3 })
        ));
    }

    #[test]
    fn test_pipeline_enum_dispatch() {
        let pipeline = Pipeline::new(
            "flow",
            Shape::FlowThrough,
            vec![Unit::transformer(IdentityTransformer)],
            None,
        )
        .unwrap();
        assert_eq!(pipeline.shape(), Shape::FlowThrough);
        let err = pipeline.run(None).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { ref pipeline, .. } if pipeline == "flow"));
    }
}
