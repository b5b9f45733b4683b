// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
mod definition;
mod loader;
mod options;
mod registry;


pub use definition::{
    EntrySource, PipelineDefinition, SequenceDefinition, SequenceEntry, StrategyDefinition,
    UnitSpec,
};
pub use loader::{definition_path, PipeLoader, RunnableHandle, SequenceLoader, StrategyLoader};
pub use options::Options;
pub use registry::{PipelineFactory, Registry, StrategyFn, UnitFactory};
