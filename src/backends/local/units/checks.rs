// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::{DataType, Table};
use crate::traits::Transformer;

pub const CHECK_TYPES: &str = "check_types";

#[derive(Debug, Clone, Deserialize)]
pub struct CheckTypesConfig {
    pub expected: BTreeMap<String, DataType>,
    #[serde(default)]
    pub raise_on_mismatch: bool,
}

/// Compares column types against an expected map and passes the table
/// through unchanged. Each mismatch is logged as a warning; with
/// `raise_on_mismatch` any mismatch fails the unit.
pub struct CheckTypes {
    config: CheckTypesConfig,
    logger: UnitLogger,
}

impl CheckTypes {
    pub fn new(expected: BTreeMap<String, DataType>, raise_on_mismatch: bool) -> Self {
        Self::from_config(CheckTypesConfig {
            expected,
            raise_on_mismatch,
        })
    }

    pub fn from_config(config: CheckTypesConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(CHECK_TYPES),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    fn mismatches(&self, table: &Table) -> Vec<String> {
        self.config
            .expected
            .iter()
            .filter_map(|(name, expected)| match table.column(name) {
                None => Some(format!("'{}' is missing, expected {}", name, expected)),
                Some(column) if column.dtype() != *expected => Some(format!(
                    "'{}' has type {}, expected {}",
                    name,
                    column.dtype(),
                    expected
                )),
                Some(_) => None,
            })
            .collect()
    }
}

impl Transformer for CheckTypes {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mismatches = self.mismatches(table);
        for mismatch in &mismatches {
            self.logger.warning(mismatch);
        }
        if self.config.raise_on_mismatch && !mismatches.is_empty() {
            return Err(UnitError::TypeCheck(mismatches.join("; ")));
        }
        Ok(table.clone())
    }

    fn name(&self) -> &'static str {
        CHECK_TYPES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::int64("id", [Some(1)]),
            Column::utf8("amount", [Some("12.50")]),
        ])
        .unwrap()
    }

    fn expected() -> BTreeMap<String, DataType> {
        BTreeMap::from([
            ("id".to_string(), DataType::Int64),
            ("amount".to_string(), DataType::Float64),
            ("when".to_string(), DataType::Date),
        ])
    }

    #[test]
    fn test_mismatches_pass_through_by_default() {
        let unit = CheckTypes::new(expected(), false);
        assert_eq!(unit.transform(&table()).unwrap(), table());
        assert_eq!(unit.mismatches(&table()).len(), 2);
    }

    #[test]
    fn test_raise_on_mismatch_names_every_column() {
        let unit = CheckTypes::new(expected(), true);
        match unit.transform(&table()).unwrap_err() {
            UnitError::TypeCheck(message) => {
                assert!(message.contains("'amount' has type utf8, expected float64"));
                assert!(message.contains("'when' is missing"));
                assert!(!message.contains("'id'"));
            }
            other => panic!("Expected TypeCheck, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_types_never_raise() {
        let unit = CheckTypes::new(BTreeMap::from([("id".to_string(), DataType::Int64)]), true);
        assert!(unit.transform(&table()).is_ok());
    }
}
