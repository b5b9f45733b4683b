// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made pipeline factories, referenced from sequence definitions by
//! name (`factory: merge_data`) with their keyword arguments under `args`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::config::{Options, Registry};
use crate::engine::{ExportPipe, FlowThroughPipe, LoadingPipe, Pipeline};
use crate::errors::LoaderError;
use crate::table::{DataType, Value};
use crate::traits::Unit;

use super::units::*;

pub const MERGE_DATA: &str = "merge_data";
pub const REPLACE_IN_COLUMNS: &str = "replace_in_columns";
pub const CAST_FILL_AND_EXPORT: &str = "cast_fill_and_export";
pub const HANDLE_DATE_COLUMNS: &str = "handle_date_columns";

#[derive(Debug, Clone, Deserialize)]
pub struct MergeDataArgs {
    pub inputs: Vec<String>,
    pub merge_type: String,
    #[serde(default)]
    pub pk: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceInColumnsArgs {
    pub cols: Vec<String>,
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastFillAndExportArgs {
    pub cols_and_types: BTreeMap<String, DataType>,
    #[serde(default)]
    pub fill_by: HashMap<DataType, Value>,
    pub export_to: String,
}

fn default_date_format() -> String {
    "%m/%Y".to_string()
}

fn default_tms_format() -> String {
    "%Y-%m-%d-%H-%M".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandleDateColumnsArgs {
    pub cols: Vec<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_tms_format")]
    pub tms_format: String,
}

pub(crate) fn register_all(registry: &mut Registry) {
    registry.register_pipeline(MERGE_DATA, merge_data);
    registry.register_pipeline(REPLACE_IN_COLUMNS, replace_in_columns);
    registry.register_pipeline(CAST_FILL_AND_EXPORT, cast_fill_and_export);
    registry.register_pipeline(HANDLE_DATE_COLUMNS, handle_date_columns);
}

fn logger_for(options: &Options, registry: &Registry) -> Option<crate::observability::Logger> {
    if options.log_enabled() {
        registry.logger().cloned()
    } else {
        None
    }
}

/// LOADING: read every input, then merge them with `merge_type` on `pk`.
pub fn merge_data(options: &Options, registry: &Registry) -> Result<Pipeline, LoaderError> {
    let args: MergeDataArgs = options.parse(MERGE_DATA)?;
    let readers = args
        .inputs
        .iter()
        .map(|src| Unit::producer(ReadTable::new(src).with_logger(registry.unit_logger(READ_TABLE, options))))
        .collect();
    let merge = MergeTables::from_config(&MergeConfig {
        how: args.merge_type,
        on: args.pk,
    })
    .map_err(|reason| LoaderError::invalid_options(MERGE_DATA, reason))?
    .with_logger(registry.unit_logger(MERGE, options));

    let units = vec![
        Unit::collector(GatherInputs::new(readers).with_logger(registry.unit_logger(GATHER, options))),
        Unit::reducer(merge),
    ];
    Ok(LoadingPipe::with_logger(MERGE_DATA, units, logger_for(options, registry))?.into())
}

/// FLOW_THROUGH: literal replacement of `pattern` in `cols`.
pub fn replace_in_columns(options: &Options, registry: &Registry) -> Result<Pipeline, LoaderError> {
    let args: ReplaceInColumnsArgs = options.parse(REPLACE_IN_COLUMNS)?;
    let unit = ReplacePattern::literal(args.cols, args.pattern, args.replace)
        .with_logger(registry.unit_logger(REPLACE_PATTERN, options));
    Ok(FlowThroughPipe::with_logger(
        REPLACE_IN_COLUMNS,
        vec![Unit::transformer(unit)],
        logger_for(options, registry),
    )?
    .into())
}

/// EXPORT: cast `cols_and_types`, fill nulls by type, write to `export_to`.
pub fn cast_fill_and_export(options: &Options, registry: &Registry) -> Result<Pipeline, LoaderError> {
    let args: CastFillAndExportArgs = options.parse(CAST_FILL_AND_EXPORT)?;
    let units = vec![
        Unit::transformer(
            CastColumns::new(args.cols_and_types).with_logger(registry.unit_logger(CAST_COLUMNS, options)),
        ),
        Unit::transformer(
            FillNulls::new(args.fill_by).with_logger(registry.unit_logger(FILL_NULLS, options)),
        ),
        Unit::sink(WriteTable::new(args.export_to).with_logger(registry.unit_logger(WRITE_TABLE, options))),
    ];
    Ok(ExportPipe::with_logger(CAST_FILL_AND_EXPORT, units, logger_for(options, registry))?.into())
}

/// FLOW_THROUGH: parse `cols` as dates, split `Time` into `Hour` and
/// `Minute`, then build `Datetime` from the date and time parts.
pub fn handle_date_columns(options: &Options, registry: &Registry) -> Result<Pipeline, LoaderError> {
    let args: HandleDateColumnsArgs = options.parse(HANDLE_DATE_COLUMNS)?;
    let units = vec![
        Unit::transformer(
            FormatDates::new(args.cols, args.date_format, false)
                .with_logger(registry.unit_logger(FORMAT_DATES, options)),
        ),
        Unit::transformer(
            SplitTime::from_config(SplitTimeConfig::default())
                .with_logger(registry.unit_logger(SPLIT_TIME, options)),
        ),
        Unit::transformer(
            GenerateTimestamp::from_config(GenerateTimestampConfig::new(args.tms_format))
                .with_logger(registry.unit_logger(GENERATE_TIMESTAMP, options)),
        ),
    ];
    Ok(FlowThroughPipe::with_logger(HANDLE_DATE_COLUMNS, units, logger_for(options, registry))?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::formats::{read_table, write_table};
    use crate::engine::Shape;
    use crate::table::{Column, Table};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn users() -> Table {
        Table::new(vec![
            Column::int64("User", [Some(1), Some(2)]),
            Column::utf8("Name", [Some("ada"), Some("bob")]),
        ])
        .unwrap()
    }

    fn cards() -> Table {
        Table::new(vec![
            Column::int64("User", [Some(2), Some(3)]),
            Column::utf8("Limit", [Some("$500"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_factories_have_expected_shapes() {
        let registry = Registry::with_builtins(None);
        let merge = merge_data(
            &Options::new()
                .with("inputs", vec!["a.csv", "b.csv"])
                .with("merge_type", "concat"),
            &registry,
        )
        .unwrap();
        assert_eq!(merge.shape(), Shape::Loading);

        let replace = replace_in_columns(
            &Options::new().with("cols", vec!["a"]).with("pattern", "$"),
            &registry,
        )
        .unwrap();
        assert_eq!(replace.shape(), Shape::FlowThrough);
    }

    #[test]
    fn test_merge_then_clean_then_export() {
        let dir = TempDir::new().unwrap();
        let users_path = dir.path().join("users.pq").display().to_string();
        let cards_path = dir.path().join("cards.json").display().to_string();
        let out_path = dir.path().join("out/clean.csv").display().to_string();
        write_table(&users_path, &users()).unwrap();
        write_table(&cards_path, &cards()).unwrap();

        let registry = Registry::with_builtins(None);
        let merged = merge_data(
            &Options::new()
                .with("inputs", vec![users_path.as_str(), cards_path.as_str()])
                .with("merge_type", "join-outer")
                .with("pk", "User"),
            &registry,
        )
        .unwrap()
        .run(None)
        .unwrap()
        .unwrap();
        assert_eq!(merged.height(), 3);

        let replaced = replace_in_columns(
            &Options::new().with("cols", vec!["Limit"]).with("pattern", "$"),
            &registry,
        )
        .unwrap()
        .run(Some(&merged))
        .unwrap()
        .unwrap();

        let export_args: Options = serde_yaml::from_str(&format!(
            "cols_and_types: {{Limit: float64}}\nfill_by: {{float64: 0.0, utf8: unknown}}\nexport_to: {}\n",
            out_path
        ))
        .unwrap();
        let exported = cast_fill_and_export(&export_args, &registry)
            .unwrap()
            .run(Some(&replaced))
            .unwrap();
        assert!(exported.is_none());

        let written = read_table(&out_path).unwrap();
        let limits = written.column("Limit").unwrap().values();
        assert_eq!(limits, vec![Value::Float(0.0), Value::Float(500.0), Value::Float(0.0)]);
        assert_eq!(written.column("Name").unwrap().value(2), Value::from("unknown"));
    }

    #[test]
    fn test_handle_date_columns() {
        let registry = Registry::with_builtins(None);
        let pipe = handle_date_columns(&Options::new().with("cols", vec!["Period"]), &registry).unwrap();
        assert_eq!(pipe.shape(), Shape::FlowThrough);

        let input = Table::new(vec![
            Column::utf8("Period", [Some("11/2023"), Some("n/a")]),
            Column::int64("Year", [Some(2023), Some(2024)]),
            Column::int64("Month", [Some(11), Some(1)]),
            Column::int64("Day", [Some(5), Some(20)]),
            Column::utf8("Time", [Some("9:15"), Some("18:00")]),
        ])
        .unwrap();
        let output = pipe.run(Some(&input)).unwrap().unwrap();

        let period = output.column("Period").unwrap();
        assert_eq!(period.dtype(), DataType::Date);
        assert_eq!(
            period.values(),
            vec![Value::Date(NaiveDate::from_ymd_opt(2023, 11, 1).unwrap()), Value::Null]
        );
        assert_eq!(output.column("Hour").unwrap().value(0), Value::Int(9));
        let stamp = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap().and_hms_opt(18, 0, 0).unwrap();
        assert_eq!(output.column("Datetime").unwrap().value(1), Value::Datetime(stamp));
    }

    #[test]
    fn test_join_without_pk_is_invalid() {
        let registry = Registry::with_builtins(None);
        let err = merge_data(
            &Options::new()
                .with("inputs", vec!["a.csv"])
                .with("merge_type", "join-inner"),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidOptions { ref kind, .. } if kind == MERGE_DATA));
    }
}
