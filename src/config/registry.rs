// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backends::local::LocalUnitFactory;
use crate::config::consts::LOG_OPTION;
use crate::config::definition::UnitSpec;
use crate::config::Options;
use crate::engine::Pipeline;
use crate::errors::{LoaderError, UnitResult};
use crate::observability::{Logger, UnitLogger};
use crate::table::Table;
use crate::traits::Unit;

/// Builds one unit from its options. The registry is passed back in so
/// compound units can build their nested units.
pub type UnitFactory = Arc<dyn Fn(&Options, &Registry) -> Result<Unit, LoaderError> + Send + Sync>;

/// Builds one ready-to-run pipeline from keyword arguments.
pub type PipelineFactory =
    Arc<dyn Fn(&Options, &Registry) -> Result<Pipeline, LoaderError> + Send + Sync>;

/// A named table-to-table function usable as a strategy or a unit.
pub type StrategyFn = Arc<dyn Fn(&Table) -> UnitResult<Table> + Send + Sync>;

/// Compiled plugin table: every name a definition file may reference.
///
/// Definition files never name Rust types directly. A unit definition's `kind`,
/// a sequence entry's `factory` and a strategy's `function` are all looked
/// up here, so anything a definition can build must be registered first.
///
/// # Examples
/// ```rust
/// use the_pipewood::config::{Options, Registry};
///
/// let registry = Registry::with_builtins(None);
/// let options = Options::new().with("how", "concat");
/// let unit = registry.build("merge", &options).unwrap();
/// assert_eq!(unit.name(), "merge");
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    units: HashMap<String, UnitFactory>,
    pipelines: HashMap<String, PipelineFactory>,
    strategies: HashMap<String, StrategyFn>,
    logger: Option<Logger>,
}

impl Registry {
    /// Empty registry. `logger` is injected into units built with `log: true`.
    pub fn new(logger: Option<Logger>) -> Self {
        Self {
            logger,
            ..Self::default()
        }
    }

    /// Registry with every local unit kind and built-in pipeline factory.
    pub fn with_builtins(logger: Option<Logger>) -> Self {
        let mut registry = Self::new(logger);
        LocalUnitFactory::register_all(&mut registry);
        registry
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Per-unit logging handle honoring the `log` option.
    pub fn unit_logger(&self, unit: &'static str, options: &Options) -> UnitLogger {
        UnitLogger::new(unit, options.log_enabled(), self.logger())
    }

    pub fn register_unit<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&Options, &Registry) -> Result<Unit, LoaderError> + Send + Sync + 'static,
    {
        self.units.insert(kind.into(), Arc::new(factory));
    }

    pub fn register_pipeline<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Options, &Registry) -> Result<Pipeline, LoaderError> + Send + Sync + 'static,
    {
        self.pipelines.insert(name.into(), Arc::new(factory));
    }

    pub fn register_strategy<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&Table) -> UnitResult<Table> + Send + Sync + 'static,
    {
        self.strategies.insert(name.into(), Arc::new(function));
    }

    /// Build a unit of `kind` from `options`.
    pub fn build(&self, kind: &str, options: &Options) -> Result<Unit, LoaderError> {
        let factory = self
            .units
            .get(kind)
            .ok_or_else(|| LoaderError::UnknownUnit {
                kind: kind.to_string(),
            })?;
        factory(options, self)
    }

    pub fn build_unit(&self, spec: &UnitSpec) -> Result<Unit, LoaderError> {
        self.build(&spec.kind, &spec.options)
    }

    /// Build every unit definition in order; `log` is the default for those
    /// that do not set it themselves.
    pub fn build_units(&self, specs: &[UnitSpec], log: bool) -> Result<Vec<Unit>, LoaderError> {
        specs
            .iter()
            .map(|spec| {
                let mut options = spec.options.clone();
                options.set_default(LOG_OPTION, log);
                self.build(&spec.kind, &options)
            })
            .collect()
    }

    pub fn pipeline_factory(&self, name: &str) -> Result<PipelineFactory, LoaderError> {
        self.pipelines
            .get(name)
            .cloned()
            .ok_or_else(|| LoaderError::UnknownFactory {
                name: name.to_string(),
            })
    }

    pub fn strategy(&self, name: &str) -> Result<StrategyFn, LoaderError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| LoaderError::UnknownStrategy {
                name: name.to_string(),
            })
    }

    pub fn is_unit_registered(&self, kind: &str) -> bool {
        self.units.contains_key(kind)
    }

    /// Registered unit kinds, sorted.
    pub fn unit_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.units.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Registered pipeline factory names, sorted.
    pub fn pipeline_factories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut strategies: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        strategies.sort_unstable();
        f.debug_struct("Registry")
            .field("units", &self.unit_kinds())
            .field("pipelines", &self.pipeline_factories())
            .field("strategies", &strategies)
            .field("logger", &self.logger.as_ref().map(Logger::name))
            .finish()
    }
}
