// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::path::Path;

use tempfile::TempDir;

use crate::backends::local::units::{
    CastColumns, GatherInputs, MergeTables, ReadTable, ReplacePattern, WriteTable,
};
use crate::backends::local::{read_table, write_table};
use crate::engine::{ExportPipe, FlowThroughPipe, LoadingPipe, Pipeline, Sequence, Strategy};
use crate::errors::{PipelineError, UnitError};
use crate::observability::Logger;
use crate::table::{Column, DataType, JoinKind, Table, Value};
use crate::traits::Unit;

/// End-to-end flows over real files using local units
#[cfg(test)]
mod tests {
    use super::*;

    fn path(dir: &TempDir, file: &str) -> String {
        dir.path().join(file).display().to_string()
    }

    /// users.csv and balances.json keyed by `id`
    fn seed_inputs(dir: &TempDir) -> (String, String) {
        let users = Table::new(vec![
            Column::int64("id", [Some(1), Some(2), Some(3)]),
            Column::utf8("name", [Some("ada"), Some("bob"), Some("cy")]),
        ])
        .unwrap();
        let balances = Table::new(vec![
            Column::int64("id", [Some(3), Some(1)]),
            Column::utf8("balance", [Some("$30.5"), Some("$10")]),
        ])
        .unwrap();

        let users_path = path(dir, "users.csv");
        let balances_path = path(dir, "balances.json");
        write_table(&users_path, &users).unwrap();
        write_table(&balances_path, &balances).unwrap();
        (users_path, balances_path)
    }

    fn load_and_join(users: &str, balances: &str) -> Pipeline {
        LoadingPipe::new(
            "load",
            vec![
                Unit::collector(GatherInputs::new(vec![
                    Unit::producer(ReadTable::new(users)),
                    Unit::producer(ReadTable::new(balances)),
                ])),
                Unit::reducer(MergeTables::join(JoinKind::Inner, "id")),
            ],
        )
        .unwrap()
        .into()
    }

    fn clean() -> Pipeline {
        FlowThroughPipe::new(
            "clean",
            vec![
                Unit::transformer(ReplacePattern::literal(vec!["balance".to_string()], "$", "")),
                Unit::transformer(CastColumns::new(BTreeMap::from([(
                    "balance".to_string(),
                    DataType::Float64,
                )]))),
            ],
        )
        .unwrap()
        .into()
    }

    fn export(to: &str) -> Pipeline {
        ExportPipe::new(
            "export",
            vec![
                Unit::transformer(CastColumns::new(BTreeMap::new())),
                Unit::sink(WriteTable::new(to)),
            ],
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_load_clean_export_sequence() {
        let dir = TempDir::new().unwrap();
        let (users, balances) = seed_inputs(&dir);
        let out = path(&dir, "exports/joined.pq");

        let sequence = Sequence::named(
            "nightly",
            vec![load_and_join(&users, &balances), clean(), export(&out)],
        )
        .with_logger(Some(Logger::detached("integration")));

        let result = sequence.run(None).unwrap();
        assert!(result.is_none());

        let written = read_table(&out).unwrap();
        assert_eq!(written.column_names(), vec!["id", "name", "balance"]);
        assert_eq!(written.height(), 2);
        assert_eq!(
            written.column("balance").unwrap().values(),
            vec![Value::Float(10.0), Value::Float(30.5)]
        );
    }

    #[test]
    fn test_failure_stops_before_export() {
        let dir = TempDir::new().unwrap();
        let (users, balances) = seed_inputs(&dir);
        let out = path(&dir, "never.csv");

        // `name` cannot be cast to Int64
        let broken: Pipeline = FlowThroughPipe::new(
            "broken",
            vec![Unit::transformer(CastColumns::new(BTreeMap::from([(
                "name".to_string(),
                DataType::Int64,
            )])))],
        )
        .unwrap()
        .into();
        let sequence = Sequence::new(vec![load_and_join(&users, &balances), broken, export(&out)]);

        let err = sequence.run(None).unwrap_err();
        match &err {
            PipelineError::UnitExecution { pipeline, position, unit, source } => {
                assert_eq!(pipeline, "broken");
                assert_eq!(*position, 0);
                assert_eq!(unit, "cast_columns");
                assert!(matches!(source, UnitError::Cast { column, .. } if column == "name"));
            }
            other => panic!("Expected UnitExecution, got {:?}", other),
        }
        assert!(!Path::new(&out).exists());
    }

    #[test]
    fn test_join_on_text_and_integer_keys_fails() {
        let dir = TempDir::new().unwrap();
        let (users, _) = seed_inputs(&dir);
        let text_keys = path(&dir, "text_keys.json");
        std::fs::write(&text_keys, r#"[{"id": "1", "balance": "$10"}]"#).unwrap();

        let err = load_and_join(&users, &text_keys).run(None).unwrap_err();
        match err.unit_error() {
            Some(UnitError::ColumnType { column, expected, found }) => {
                assert_eq!(column, "id");
                assert_eq!(expected, "int64");
                assert_eq!(found, "utf8");
            }
            other => panic!("Expected ColumnType, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_file_fails_loading() {
        let dir = TempDir::new().unwrap();
        let pipe = load_and_join(&path(&dir, "absent.csv"), &path(&dir, "absent.json"));
        let err = pipe.run(None).unwrap_err();
        assert!(matches!(err.unit_error(), Some(UnitError::Io { .. })));
    }

    #[test]
    fn test_strategy_applied_to_loaded_table() {
        let dir = TempDir::new().unwrap();
        let (users, balances) = seed_inputs(&dir);
        let loaded = load_and_join(&users, &balances).run(None).unwrap().unwrap();

        let strategy = Strategy::new(
            "strip",
            vec![Unit::transformer(ReplacePattern::literal(vec!["balance".to_string()], "$", ""))],
            None,
        );
        let stripped = strategy.apply(&loaded).unwrap();
        assert_eq!(
            stripped.column("balance").unwrap().values(),
            vec![Value::from("10"), Value::from("30.5")]
        );
        // input is left untouched
        assert_eq!(loaded.column("balance").unwrap().value(0), Value::from("$10"));
    }
}
