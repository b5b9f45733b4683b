// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod pipeline;
mod unit;

pub use loader::LoaderError;
pub use pipeline::{BoundaryPosition, PipelineError};
pub use unit::{UnitError, UnitResult};
