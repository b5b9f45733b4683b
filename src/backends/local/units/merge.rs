// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::{JoinKind, Table};
use crate::traits::Reducer;

pub const MERGE: &str = "merge";

fn default_how() -> String {
    "concat".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// `concat` or `join-<inner|outer|left|right>`
    #[serde(default = "default_how")]
    pub how: String,
    #[serde(default)]
    pub on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeMethod {
    Concat,
    Join { kind: JoinKind, on: String },
}

impl MergeMethod {
    /// Validate a `how`/`on` pair.
    pub fn parse(how: &str, on: Option<&str>) -> Result<Self, String> {
        if how == "concat" {
            return Ok(MergeMethod::Concat);
        }
        let Some(kind) = how.strip_prefix("join-") else {
            return Err(format!(
                "Unsupported merge method '{}'. Use 'concat' or 'join-[type]' where [type] is inner, outer, left, or right.",
                how
            ));
        };
        let kind: JoinKind = kind.parse()?;
        let on = on.ok_or_else(|| "A column name must be specified in `on` for joining.".to_string())?;
        Ok(MergeMethod::Join {
            kind,
            on: on.to_string(),
        })
    }
}

/// Reduces a list of tables to one, by stacking or by successive joins
/// (left to right, on one key column).
pub struct MergeTables {
    method: MergeMethod,
    logger: UnitLogger,
}

impl MergeTables {
    pub fn new(method: MergeMethod) -> Self {
        Self {
            method,
            logger: UnitLogger::disabled(MERGE),
        }
    }

    pub fn concat() -> Self {
        Self::new(MergeMethod::Concat)
    }

    pub fn join(kind: JoinKind, on: impl Into<String>) -> Self {
        Self::new(MergeMethod::Join { kind, on: on.into() })
    }

    pub fn from_config(config: &MergeConfig) -> Result<Self, String> {
        MergeMethod::parse(&config.how, config.on.as_deref()).map(Self::new)
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn method(&self) -> &MergeMethod {
        &self.method
    }
}

impl Reducer for MergeTables {
    fn reduce(&self, tables: &[Table]) -> UnitResult<Table> {
        let (first, rest) = tables.split_first().ok_or_else(|| UnitError::EmptyReduction {
            unit: MERGE.to_string(),
        })?;
        if rest.is_empty() {
            return Ok(first.clone());
        }

        let merged = match &self.method {
            MergeMethod::Concat => Table::vstack(tables)?,
            MergeMethod::Join { kind, on } => rest
                .iter()
                .try_fold(first.clone(), |acc, table| acc.join(table, on, *kind))?,
        };
        self.logger.info(format_args!(
            "Merged {} tables into {} rows x {} columns",
            tables.len(),
            merged.height(),
            merged.width()
        ));
        Ok(merged)
    }

    fn name(&self) -> &'static str {
        MERGE
    }
}
