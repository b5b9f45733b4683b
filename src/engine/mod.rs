// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod pipeline;
pub mod sequence;
pub mod shape;
mod stages;
pub mod strategy;
#[cfg(test)]
pub mod integration_tests;

pub use pipeline::{ExportPipe, FlowThroughPipe, LoadingPipe, Pipeline};
pub use sequence::Sequence;
pub use shape::Shape;
pub use strategy::Strategy;
