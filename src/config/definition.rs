// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Serde models for definition files and the code that turns them into
//! runnable values.
//!
//! A pipeline file looks like:
//!
//! ```yaml
//! PIPELINE:
//!   name: load_orders
//!   shape: loading
//!   log: true
//!   units:
//!     - kind: gather
//!       inputs:
//!         - { kind: read_table, src: data/orders_2023.csv }
//!         - { kind: read_table, src: data/orders_2024.csv }
//!     - kind: merge
//!       how: concat
//! ```
//!
//! and a sequence file like:
//!
//! ```yaml
//! SEQUENCE:
//!   name: nightly
//!   log: true
//!   pipelines:
//!     - load: load_orders
//!     - factory: cast_fill_and_export
//!       args:
//!         cols_and_types: { amount: float64 }
//!         fill_by: { float64: 0.0 }
//!         export_to: out/orders.pq
//! ```

use serde::Deserialize;

use crate::config::consts::LOG_OPTION;
use crate::config::{Options, Registry};
use crate::engine::{Pipeline, Sequence, Shape, Strategy};
use crate::errors::LoaderError;

/// One unit: a registered `kind` plus its flattened options (`log`
/// included).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitSpec {
    pub kind: String,
    #[serde(flatten)]
    pub options: Options,
}

impl UnitSpec {
    pub fn new(kind: impl Into<String>, options: Options) -> Self {
        Self {
            kind: kind.into(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub name: Option<String>,
    /// Parsed on build so an unknown shape surfaces as
    /// `PipelineError::UnknownPipelineShape` rather than a YAML error.
    pub shape: String,
    #[serde(default)]
    pub log: Option<bool>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl PipelineDefinition {
    /// Build the pipeline. `fallback_name` is used when the definition has
    /// no `name`; `inherited_log` applies when it has no `log`.
    pub fn build(
        &self,
        fallback_name: &str,
        inherited_log: bool,
        registry: &Registry,
    ) -> Result<Pipeline, LoaderError> {
        let shape: Shape = self.shape.parse()?;
        let log = self.log.unwrap_or(inherited_log);
        let units = registry.build_units(&self.units, log)?;
        let logger = if log { registry.logger().cloned() } else { None };
        let name = self.name.as_deref().unwrap_or(fallback_name);
        Ok(Pipeline::new(name, shape, units, logger)?)
    }
}

/// Exactly one of `load`, `factory` (with `args`) or `pipeline` per entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SequenceEntry {
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub factory: Option<String>,
    #[serde(default)]
    pub args: Options,
    #[serde(default)]
    pub pipeline: Option<PipelineDefinition>,
}

/// Where a sequence entry's pipeline comes from.
pub enum EntrySource<'a> {
    Load(&'a str),
    Factory(&'a str, &'a Options),
    Inline(&'a PipelineDefinition),
}

impl SequenceEntry {
    pub fn source(&self, index: usize) -> Result<EntrySource<'_>, LoaderError> {
        match (&self.load, &self.factory, &self.pipeline) {
            (Some(name), None, None) => Ok(EntrySource::Load(name)),
            (None, Some(name), None) => Ok(EntrySource::Factory(name, &self.args)),
            (None, None, Some(definition)) => Ok(EntrySource::Inline(definition)),
            _ => Err(LoaderError::InvalidDefinition(format!(
                "sequence entry {} must set exactly one of 'load', 'factory' or 'pipeline'",
                index
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SequenceDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub log: bool,
    pub pipelines: Vec<SequenceEntry>,
}

impl SequenceDefinition {
    /// Build the sequence. `load` resolves `load:` entries by pipeline name.
    pub fn build<F>(
        &self,
        fallback_name: &str,
        registry: &Registry,
        mut load: F,
    ) -> Result<Sequence, LoaderError>
    where
        F: FnMut(&str) -> Result<Pipeline, LoaderError>,
    {
        let mut pipelines = Vec::with_capacity(self.pipelines.len());
        for (index, entry) in self.pipelines.iter().enumerate() {
            let pipeline = match entry.source(index)? {
                EntrySource::Load(name) => load(name)?,
                EntrySource::Factory(name, args) => {
                    let factory = registry.pipeline_factory(name)?;
                    let mut args = args.clone();
                    args.set_default(LOG_OPTION, self.log);
                    factory(&args, registry)?
                }
                EntrySource::Inline(definition) => {
                    let fallback = format!("{}[{}]", fallback_name, index);
                    definition.build(&fallback, self.log, registry)?
                }
            };
            pipelines.push(pipeline);
        }

        let logger = if self.log { registry.logger().cloned() } else { None };
        let name = self.name.as_deref().unwrap_or(fallback_name);
        Ok(Sequence::named(name, pipelines).with_logger(logger))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategyDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub log: bool,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub function: Option<String>,
}

impl StrategyDefinition {
    pub fn build(&self, fallback_name: &str, registry: &Registry) -> Result<Strategy, LoaderError> {
        let name = self.name.as_deref().unwrap_or(fallback_name);
        match &self.function {
            Some(function) if self.units.is_empty() => {
                Ok(Strategy::from_fn(name, registry.strategy(function)?))
            }
            Some(_) => Err(LoaderError::InvalidDefinition(format!(
                "strategy '{}' sets both 'function' and 'units'",
                name
            ))),
            None => {
                let units = registry.build_units(&self.units, self.log)?;
                let logger = if self.log { registry.logger().cloned() } else { None };
                Ok(Strategy::new(name, units, logger))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[test]
    fn test_unit_spec_flattens_options() {
        let spec: UnitSpec = serde_yaml::from_str("kind: read_table\nsrc: a.csv\nlog: true\n").unwrap();
        assert_eq!(spec.kind, "read_table");
        assert!(spec.options.log_enabled());
        assert!(spec.options.contains("src"));
        assert!(!spec.options.contains("kind"));
    }

    #[test]
    fn test_unknown_shape_is_pipeline_error() {
        let definition: PipelineDefinition =
            serde_yaml::from_str("shape: sideways\nunits: []\n").unwrap();
        let err = definition
            .build("p", false, &Registry::with_builtins(None))
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Pipeline(PipelineError::UnknownPipelineShape { ref shape }) if shape == "sideways"
        ));
    }

    #[test]
    fn test_build_inline_pipeline_uses_fallback_name() {
        let yaml = "shape: flow_through\nunits:\n  - kind: replace_pattern\n    columns: [a]\n    pattern: x\n    replace: y\n";
        let definition: PipelineDefinition = serde_yaml::from_str(yaml).unwrap();
        let pipeline = definition
            .build("fallback", false, &Registry::with_builtins(None))
            .unwrap();
        assert_eq!(pipeline.name(), "fallback");
        assert_eq!(pipeline.shape(), Shape::FlowThrough);
    }

    #[test]
    fn test_sequence_entry_must_pick_one_source() {
        let entry: SequenceEntry = serde_yaml::from_str("load: a\nfactory: b\n").unwrap();
        assert!(matches!(entry.source(3), Err(LoaderError::InvalidDefinition(msg)) if msg.contains("entry 3")));

        let empty: SequenceEntry = serde_yaml::from_str("args: {}\n").unwrap();
        assert!(empty.source(0).is_err());
    }

    #[test]
    fn test_sequence_factory_entry_inherits_log() {
        let mut registry = Registry::new(None);
        registry.register_pipeline("echo_args", |args: &Options, _: &Registry| {
            Err(LoaderError::InvalidDefinition(format!("log={}", args.log_enabled())))
        });
        let definition: SequenceDefinition =
            serde_yaml::from_str("log: true\npipelines:\n  - factory: echo_args\n").unwrap();
        let err = definition
            .build("seq", &registry, |_| unreachable!())
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDefinition(msg) if msg == "log=true"));
    }

    #[test]
    fn test_strategy_rejects_function_and_units() {
        let definition: StrategyDefinition =
            serde_yaml::from_str("function: f\nunits:\n  - kind: log_message\n").unwrap();
        let err = definition.build("s", &Registry::new(None)).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDefinition(_)));
    }
}
