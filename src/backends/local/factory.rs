// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Deserialize;

use crate::config::consts::LOG_OPTION;
use crate::config::{Options, Registry, UnitSpec};
use crate::errors::LoaderError;
use crate::traits::{Reducer, Transformer, Unit};

use super::pipelines;
use super::units::*;

/// Registers the in-process unit kinds and pipeline factories.
///
/// Unit kinds and the options each one reads:
/// - `read_table` -> [`ReadTable`] (`src`)
/// - `write_table` -> [`WriteTable`] (`save_to`)
/// - `write_many` -> [`WriteMany`] (`save_to: [..]`)
/// - `gather` -> [`GatherInputs`] (`inputs: [UnitSpec]`)
/// - `gather_and_reduce` -> [`GatherAndReduce`] (`inputs`, `reducer: UnitSpec`)
/// - `fan_out` -> [`FanOut`] (`branches: [UnitSpec]`, `reducer: UnitSpec`)
/// - `merge` -> [`MergeTables`] (`how`, `on`)
/// - `cast_columns` -> [`CastColumns`] (`columns: {name: type}`)
/// - `fill_nulls` -> [`FillNulls`] (`fill_by: {type: value}`)
/// - `replace_pattern` -> [`ReplacePattern`] (`columns`, `pattern`, `replace`, `is_regex`)
/// - `binary_replace` -> [`BinaryReplace`] (`replacement: {column: {old: new}}`)
/// - `format_dates` -> [`FormatDates`] (`columns`, `format`, `strict`)
/// - `split_time` -> [`SplitTime`] (`time_col`, `time_format`, `hour_col`, `minute_col`)
/// - `generate_timestamp` -> [`GenerateTimestamp`] (`format`, part columns, `output`)
/// - `check_types` -> [`CheckTypes`] (`expected: {name: type}`, `raise_on_mismatch`)
/// - `log_message` -> [`LogMessage`] (`message`, `level`)
///
/// Every kind also honors `log`.
pub struct LocalUnitFactory;

#[derive(Debug, Deserialize)]
struct CompoundConfig {
    #[serde(default)]
    inputs: Vec<UnitSpec>,
    #[serde(default)]
    branches: Vec<UnitSpec>,
    reducer: Option<UnitSpec>,
}

impl LocalUnitFactory {
    pub fn register_all(registry: &mut Registry) {
        registry.register_unit(READ_TABLE, |options: &Options, registry: &Registry| {
            let unit = ReadTable::from_config(options.parse(READ_TABLE)?)
                .with_logger(registry.unit_logger(READ_TABLE, options));
            Ok(Unit::producer(unit))
        });
        registry.register_unit(WRITE_TABLE, |options: &Options, registry: &Registry| {
            let unit = WriteTable::from_config(options.parse(WRITE_TABLE)?)
                .with_logger(registry.unit_logger(WRITE_TABLE, options));
            Ok(Unit::sink(unit))
        });
        registry.register_unit(WRITE_MANY, |options: &Options, registry: &Registry| {
            let unit = WriteMany::from_config(options.parse(WRITE_MANY)?)
                .with_logger(registry.unit_logger(WRITE_MANY, options));
            Ok(Unit::multi_sink(unit))
        });

        registry.register_unit(GATHER, |options: &Options, registry: &Registry| {
            let config: CompoundConfig = options.parse(GATHER)?;
            let inputs = registry.build_units(&config.inputs, options.log_enabled())?;
            let unit = GatherInputs::new(inputs).with_logger(registry.unit_logger(GATHER, options));
            Ok(Unit::collector(unit))
        });
        registry.register_unit(GATHER_AND_REDUCE, |options: &Options, registry: &Registry| {
            let config: CompoundConfig = options.parse(GATHER_AND_REDUCE)?;
            let log = options.log_enabled();
            let inputs = registry.build_units(&config.inputs, log)?;
            let reducer = Self::reducer(GATHER_AND_REDUCE, config.reducer.as_ref(), log, registry)?;
            let unit = GatherAndReduce::new(inputs, reducer)
                .with_logger(registry.unit_logger(GATHER_AND_REDUCE, options));
            Ok(Unit::producer(unit))
        });
        registry.register_unit(FAN_OUT, |options: &Options, registry: &Registry| {
            let config: CompoundConfig = options.parse(FAN_OUT)?;
            let log = options.log_enabled();
            let branches = registry
                .build_units(&config.branches, log)?
                .into_iter()
                .map(|unit| Self::transformer(FAN_OUT, unit))
                .collect::<Result<Vec<_>, _>>()?;
            let reducer = Self::reducer(FAN_OUT, config.reducer.as_ref(), log, registry)?;
            let unit = FanOut::new(branches, reducer).with_logger(registry.unit_logger(FAN_OUT, options));
            Ok(Unit::transformer(unit))
        });

        registry.register_unit(MERGE, |options: &Options, registry: &Registry| {
            let config: MergeConfig = options.parse(MERGE)?;
            let unit = MergeTables::from_config(&config)
                .map_err(|reason| LoaderError::invalid_options(MERGE, reason))?
                .with_logger(registry.unit_logger(MERGE, options));
            Ok(Unit::reducer(unit))
        });

        registry.register_unit(CAST_COLUMNS, |options: &Options, registry: &Registry| {
            let unit = CastColumns::from_config(options.parse(CAST_COLUMNS)?)
                .with_logger(registry.unit_logger(CAST_COLUMNS, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(FILL_NULLS, |options: &Options, registry: &Registry| {
            let unit = FillNulls::from_config(options.parse(FILL_NULLS)?)
                .with_logger(registry.unit_logger(FILL_NULLS, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(REPLACE_PATTERN, |options: &Options, registry: &Registry| {
            let unit = ReplacePattern::from_config(options.parse(REPLACE_PATTERN)?)
                .map_err(|reason| LoaderError::invalid_options(REPLACE_PATTERN, reason))?
                .with_logger(registry.unit_logger(REPLACE_PATTERN, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(BINARY_REPLACE, |options: &Options, registry: &Registry| {
            let unit = BinaryReplace::from_config(options.parse(BINARY_REPLACE)?)
                .map_err(|reason| LoaderError::invalid_options(BINARY_REPLACE, reason))?
                .with_logger(registry.unit_logger(BINARY_REPLACE, options));
            Ok(Unit::transformer(unit))
        });

        registry.register_unit(FORMAT_DATES, |options: &Options, registry: &Registry| {
            let unit = FormatDates::from_config(options.parse(FORMAT_DATES)?)
                .with_logger(registry.unit_logger(FORMAT_DATES, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(SPLIT_TIME, |options: &Options, registry: &Registry| {
            let unit = SplitTime::from_config(options.parse(SPLIT_TIME)?)
                .with_logger(registry.unit_logger(SPLIT_TIME, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(GENERATE_TIMESTAMP, |options: &Options, registry: &Registry| {
            let unit = GenerateTimestamp::from_config(options.parse(GENERATE_TIMESTAMP)?)
                .with_logger(registry.unit_logger(GENERATE_TIMESTAMP, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(CHECK_TYPES, |options: &Options, registry: &Registry| {
            let unit = CheckTypes::from_config(options.parse(CHECK_TYPES)?)
                .with_logger(registry.unit_logger(CHECK_TYPES, options));
            Ok(Unit::transformer(unit))
        });
        registry.register_unit(LOG_MESSAGE, |options: &Options, registry: &Registry| {
            let unit = LogMessage::from_config(options.parse(LOG_MESSAGE)?)
                .with_logger(registry.unit_logger(LOG_MESSAGE, options));
            Ok(Unit::transformer(unit))
        });

        pipelines::register_all(registry);
    }

    /// Build the `reducer` entry of a compound unit; it must be a reducer.
    fn reducer(
        kind: &str,
        spec: Option<&UnitSpec>,
        log: bool,
        registry: &Registry,
    ) -> Result<Arc<dyn Reducer>, LoaderError> {
        let spec = spec.ok_or_else(|| LoaderError::invalid_options(kind, "missing field `reducer`"))?;
        let mut spec = spec.clone();
        spec.options.set_default(LOG_OPTION, log);
        match registry.build_unit(&spec)? {
            Unit::Reducer(reducer) => Ok(reducer),
            other => Err(LoaderError::invalid_options(
                kind,
                format!("'reducer' must be a Reducer, found {}", other.capability()),
            )),
        }
    }

    fn transformer(kind: &str, unit: Unit) -> Result<Arc<dyn Transformer>, LoaderError> {
        match unit {
            Unit::Transformer(transformer) => Ok(transformer),
            other => Err(LoaderError::invalid_options(
                kind,
                format!("'{}' is a {}, expected a Transformer", other.name(), other.capability()),
            )),
        }
    }
}
