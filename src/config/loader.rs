// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Name-to-runnable resolution.
//!
//! Every loader variant resolves `<folder>/<name>.yaml`, requires one
//! top-level binding in it (`PIPELINE`, `SEQUENCE` or `strategy`) and builds
//! the bound definition against a [`Registry`]. Nothing is cached: each
//! `load` re-reads the file, so edits on disk are picked up by the next call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::config::consts::{
    DEFINITION_EXTENSION, PIPELINE_BINDING, SEQUENCE_BINDING, STRATEGY_BINDING,
};
use crate::config::definition::{PipelineDefinition, SequenceDefinition, StrategyDefinition};
use crate::config::Registry;
use crate::engine::{Pipeline, Sequence, Strategy};
use crate::errors::{LoaderError, PipelineError};
use crate::observability::messages::loader::{DefinitionLoadFailed, DefinitionLoaded};
use crate::table::Table;

/// Path a logical name resolves to inside `folder`.
pub fn definition_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.{}", name, DEFINITION_EXTENSION))
}

/// Read `<folder>/<name>.yaml` and deserialize the value under `binding`.
fn resolve<T: DeserializeOwned>(
    folder: &Path,
    name: &str,
    binding: &'static str,
    registry: &Registry,
) -> Result<T, LoaderError> {
    let result = read_binding(folder, name, binding, registry);
    if let (Err(error), Some(logger)) = (&result, registry.logger()) {
        logger.error(DefinitionLoadFailed {
            name,
            folder: &folder.display().to_string(),
            error,
        });
    }
    result
}

fn read_binding<T: DeserializeOwned>(
    folder: &Path,
    name: &str,
    binding: &'static str,
    registry: &Registry,
) -> Result<T, LoaderError> {
    let path = definition_path(folder, name);
    if !path.is_file() {
        return Err(LoaderError::FileNotFound { path });
    }
    let content = fs::read_to_string(&path).map_err(|source| LoaderError::Io {
        path: path.clone(),
        source,
    })?;
    let file = path.display().to_string();

    let document: Value = serde_yaml::from_str(&content).map_err(|source| LoaderError::Parse {
        file: file.clone(),
        source,
    })?;
    let node = document
        .as_mapping()
        .and_then(|mapping| mapping.get(binding))
        .filter(|node| !node.is_null())
        .ok_or_else(|| LoaderError::DefinitionNotFound {
            binding,
            file: file.clone(),
        })?;
    let definition = serde_yaml::from_value(node.clone()).map_err(|source| LoaderError::Parse {
        file: file.clone(),
        source,
    })?;

    if let Some(logger) = registry.logger() {
        logger.debug(DefinitionLoaded {
            binding,
            path: &file,
            size_bytes: content.len(),
        });
    }
    Ok(definition)
}

/// A loaded definition, ready to run.
#[derive(Debug, Clone)]
pub enum RunnableHandle {
    Pipeline(Pipeline),
    Sequence(Sequence),
    Strategy(Strategy),
}

impl RunnableHandle {
    /// Forward to the loaded definition's own `run`.
    ///
    /// Pipelines take the input their shape calls for, sequences start
    /// from it, strategies require it.
    pub fn run(&self, input: Option<Table>) -> Result<Option<Table>, PipelineError> {
        match self {
            RunnableHandle::Pipeline(pipeline) => pipeline.run(input.as_ref()),
            RunnableHandle::Sequence(sequence) => sequence.run(input),
            RunnableHandle::Strategy(strategy) => {
                let table = input.ok_or_else(|| PipelineError::MissingStrategyInput {
                    strategy: strategy.name().to_string(),
                })?;
                strategy.apply(&table).map(Some)
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RunnableHandle::Pipeline(pipeline) => pipeline.name(),
            RunnableHandle::Sequence(sequence) => sequence.name(),
            RunnableHandle::Strategy(strategy) => strategy.name(),
        }
    }
}

/// Loads `PIPELINE` definitions from one folder.
#[derive(Debug, Clone)]
pub struct PipeLoader {
    folder: PathBuf,
    registry: Arc<Registry>,
}

impl PipeLoader {
    pub fn new(folder: impl Into<PathBuf>, registry: Arc<Registry>) -> Self {
        Self {
            folder: folder.into(),
            registry,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn load_pipeline(&self, name: &str) -> Result<Pipeline, LoaderError> {
        let definition: PipelineDefinition =
            resolve(&self.folder, name, PIPELINE_BINDING, &self.registry)?;
        definition.build(name, false, &self.registry)
    }

    pub fn load(&self, name: &str) -> Result<RunnableHandle, LoaderError> {
        self.load_pipeline(name).map(RunnableHandle::Pipeline)
    }
}

/// Loads `SEQUENCE` definitions; `load:` entries resolve through a
/// [`PipeLoader`] over the pipes folder.
#[derive(Debug, Clone)]
pub struct SequenceLoader {
    folder: PathBuf,
    pipes: PipeLoader,
}

impl SequenceLoader {
    pub fn new(
        folder: impl Into<PathBuf>,
        pipes_folder: impl Into<PathBuf>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            folder: folder.into(),
            pipes: PipeLoader::new(pipes_folder, registry),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn load_sequence(&self, name: &str) -> Result<Sequence, LoaderError> {
        let registry = &self.pipes.registry;
        let definition: SequenceDefinition =
            resolve(&self.folder, name, SEQUENCE_BINDING, registry)?;
        definition.build(name, registry, |pipe| self.pipes.load_pipeline(pipe))
    }

    pub fn load(&self, name: &str) -> Result<RunnableHandle, LoaderError> {
        self.load_sequence(name).map(RunnableHandle::Sequence)
    }
}

/// Loads `strategy` definitions from one folder.
#[derive(Debug, Clone)]
pub struct StrategyLoader {
    folder: PathBuf,
    registry: Arc<Registry>,
}

impl StrategyLoader {
    pub fn new(folder: impl Into<PathBuf>, registry: Arc<Registry>) -> Self {
        Self {
            folder: folder.into(),
            registry,
        }
    }

    pub fn load_strategy(&self, name: &str) -> Result<Strategy, LoaderError> {
        let definition: StrategyDefinition =
            resolve(&self.folder, name, STRATEGY_BINDING, &self.registry)?;
        definition.build(name, &self.registry)
    }

    pub fn load(&self, name: &str) -> Result<RunnableHandle, LoaderError> {
        self.load_strategy(name).map(RunnableHandle::Strategy)
    }

    /// Load `name` and apply it to `table` in one step.
    pub fn apply(&self, name: &str, table: &Table) -> Result<Table, LoaderError> {
        Ok(self.load_strategy(name)?.apply(table)?)
    }
}
