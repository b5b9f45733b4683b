// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::errors::{BoundaryPosition, PipelineError};
use crate::traits::Capability;

/// Structural contract a pipeline declares once, at construction.
///
/// | Shape          | First unit             | Last unit            |
/// |----------------|------------------------|----------------------|
/// | `Loading`      | Producer or Collector  | Reducer              |
/// | `FlowThrough`  | Transformer            | Transformer          |
/// | `Export`       | Transformer            | Sink or MultiSink    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Loading,
    FlowThrough,
    Export,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Loading => "LOADING",
            Shape::FlowThrough => "FLOW_THROUGH",
            Shape::Export => "EXPORT",
        }
    }

    fn accepts(&self, position: BoundaryPosition, capability: Capability) -> bool {
        use Capability::*;
        match (self, position) {
            (Shape::Loading, BoundaryPosition::First) => matches!(capability, Producer | Collector),
            (Shape::Loading, BoundaryPosition::Last) => capability == Reducer,
            (Shape::FlowThrough, _) => capability == Transformer,
            (Shape::Export, BoundaryPosition::First) => capability == Transformer,
            (Shape::Export, BoundaryPosition::Last) => matches!(capability, Sink | MultiSink),
        }
    }

    fn expected(&self, position: BoundaryPosition) -> &'static str {
        match (self, position) {
            (Shape::Loading, BoundaryPosition::First) => "Producer or Collector",
            (Shape::Loading, BoundaryPosition::Last) => "Reducer",
            (Shape::FlowThrough, _) => "Transformer",
            (Shape::Export, BoundaryPosition::First) => "Transformer",
            (Shape::Export, BoundaryPosition::Last) => "Sink or MultiSink",
        }
    }

    /// Check the first and last capabilities against this shape's contract.
    ///
    /// Interior units are not inspected. `None` means the pipeline is empty.
    pub fn validate(
        &self,
        pipeline: &str,
        first: Option<Capability>,
        last: Option<Capability>,
    ) -> Result<(), PipelineError> {
        for (position, found) in [(BoundaryPosition::First, first), (BoundaryPosition::Last, last)] {
            let ok = found.map(|c| self.accepts(position, c)).unwrap_or(false);
            if !ok {
                return Err(PipelineError::ShapeValidation {
                    pipeline: pipeline.to_string(),
                    shape: *self,
                    position,
                    expected: self.expected(position),
                    found,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = PipelineError;

    /// Accepts `loading`, `flow_through`, `export` in any case, with `-`
    /// or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "loading" => Ok(Shape::Loading),
            "flow_through" => Ok(Shape::FlowThrough),
            "export" => Ok(Shape::Export),
            _ => Err(PipelineError::UnknownPipelineShape {
                shape: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
