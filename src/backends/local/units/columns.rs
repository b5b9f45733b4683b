// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Column-level cleaning transformers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arrow::array::{AsArray, StringArray};
use regex::Regex;
use serde::Deserialize;

use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::{Column, DataType, Table, Value};
use crate::traits::Transformer;

pub const CAST_COLUMNS: &str = "cast_columns";
pub const FILL_NULLS: &str = "fill_nulls";
pub const REPLACE_PATTERN: &str = "replace_pattern";
pub const BINARY_REPLACE: &str = "binary_replace";

#[derive(Debug, Clone, Deserialize)]
pub struct CastColumnsConfig {
    pub columns: BTreeMap<String, DataType>,
}

/// Casts the named columns to new types. Every value must convert.
pub struct CastColumns {
    columns: BTreeMap<String, DataType>,
    logger: UnitLogger,
}

impl CastColumns {
    pub fn new(columns: BTreeMap<String, DataType>) -> Self {
        Self {
            columns,
            logger: UnitLogger::disabled(CAST_COLUMNS),
        }
    }

    pub fn from_config(config: CastColumnsConfig) -> Self {
        Self::new(config.columns)
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for CastColumns {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mut output = table.clone();
        for (name, dtype) in &self.columns {
            let column = table.require_column(name)?.cast(*dtype)?;
            output = output.with_column(column)?;
        }
        self.logger
            .info(format_args!("Cast {} columns", self.columns.len()));
        Ok(output)
    }

    fn name(&self) -> &'static str {
        CAST_COLUMNS
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FillNullsConfig {
    pub fill_by: HashMap<DataType, Value>,
}

/// Replaces nulls with a per-type default. Columns whose type has no
/// entry are left alone.
pub struct FillNulls {
    fill_by: HashMap<DataType, Value>,
    logger: UnitLogger,
}

impl FillNulls {
    pub fn new(fill_by: HashMap<DataType, Value>) -> Self {
        Self {
            fill_by,
            logger: UnitLogger::disabled(FILL_NULLS),
        }
    }

    pub fn from_config(config: FillNullsConfig) -> Self {
        Self::new(config.fill_by)
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for FillNulls {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mut filled = 0;
        let columns = table
            .columns()
            .into_iter()
            .map(|column| match self.fill_by.get(&column.dtype()) {
                Some(fill) => {
                    filled += column.null_count();
                    column.fill_nulls(fill)
                }
                None => Ok(column),
            })
            .collect::<UnitResult<Vec<_>>>()?;
        self.logger.info(format_args!("Filled {} null values", filled));
        Table::new(columns)
    }

    fn name(&self) -> &'static str {
        FILL_NULLS
    }
}

fn default_is_regex() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplacePatternConfig {
    pub columns: Vec<String>,
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
    /// Treat `pattern` as a regular expression and replace every match.
    /// When false, only the first literal occurrence is replaced.
    #[serde(default = "default_is_regex")]
    pub is_regex: bool,
}

enum Matcher {
    Literal(String),
    Regex(Regex),
}

/// Pattern replacement in each value of the named Utf8 columns.
pub struct ReplacePattern {
    columns: Vec<String>,
    matcher: Matcher,
    replace: String,
    logger: UnitLogger,
}

impl ReplacePattern {
    /// Replace the first literal occurrence of `pattern`.
    pub fn literal(columns: Vec<String>, pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            columns,
            matcher: Matcher::Literal(pattern.into()),
            replace: replace.into(),
            logger: UnitLogger::disabled(REPLACE_PATTERN),
        }
    }

    /// Replace every match of the regular expression `pattern`. `replace`
    /// may refer to capture groups as `$1` or `${name}`.
    pub fn regex(columns: Vec<String>, pattern: &str, replace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            columns,
            matcher: Matcher::Regex(Regex::new(pattern)?),
            replace: replace.into(),
            logger: UnitLogger::disabled(REPLACE_PATTERN),
        })
    }

    pub fn from_config(config: ReplacePatternConfig) -> Result<Self, String> {
        if config.is_regex {
            Self::regex(config.columns, &config.pattern, config.replace)
                .map_err(|e| format!("invalid pattern '{}': {}", config.pattern, e))
        } else {
            Ok(Self::literal(config.columns, config.pattern, config.replace))
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    fn replace_in(&self, value: &str) -> String {
        match &self.matcher {
            Matcher::Literal(pattern) => value.replacen(pattern.as_str(), &self.replace, 1),
            Matcher::Regex(regex) => regex.replace_all(value, self.replace.as_str()).into_owned(),
        }
    }

    fn pattern(&self) -> &str {
        match &self.matcher {
            Matcher::Literal(pattern) => pattern,
            Matcher::Regex(regex) => regex.as_str(),
        }
    }
}

impl Transformer for ReplacePattern {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mut output = table.clone();
        for name in &self.columns {
            let column = table.require_column(name)?;
            let Some(text) = column.array().as_string_opt::<i32>() else {
                return Err(UnitError::ColumnType {
                    column: name.clone(),
                    expected: DataType::Utf8.to_string(),
                    found: column.dtype().to_string(),
                });
            };
            let replaced: StringArray = text.iter().map(|v| v.map(|s| self.replace_in(s))).collect();
            output = output.with_column(Column::new(name.as_str(), Arc::new(replaced))?)?;
        }
        self.logger.info(format_args!(
            "Replaced '{}' with '{}' in {:?}",
            self.pattern(),
            self.replace,
            self.columns
        ));
        Ok(output)
    }

    fn name(&self) -> &'static str {
        REPLACE_PATTERN
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinaryReplaceConfig {
    pub replacement: BTreeMap<String, serde_yaml::Mapping>,
}

/// Old-to-new value mapping for one column.
pub type ReplacementRules = Vec<(Value, Value)>;

/// Maps individual values of categorical columns, e.g. `Yes`/`No` to
/// `1`/`0`.
///
/// The result takes the type of the replacement values. Values with no
/// rule are kept, cast strictly to that type when it differs from the
/// column's. Columns absent from the table are skipped.
pub struct BinaryReplace {
    rules: Vec<(String, ReplacementRules)>,
    logger: UnitLogger,
}

impl BinaryReplace {
    pub fn new(rules: Vec<(String, ReplacementRules)>) -> Result<Self, String> {
        if rules.is_empty() {
            return Err("replacement rules cannot be empty".to_string());
        }
        Ok(Self {
            rules,
            logger: UnitLogger::disabled(BINARY_REPLACE),
        })
    }

    pub fn from_config(config: BinaryReplaceConfig) -> Result<Self, String> {
        let cell = |yaml: &serde_yaml::Value| {
            serde_yaml::from_value::<Value>(yaml.clone()).map_err(|e| format!("invalid value {:?}: {}", yaml, e))
        };
        let rules = config
            .replacement
            .iter()
            .map(|(column, mapping)| {
                let pairs = mapping
                    .iter()
                    .map(|(old, new)| Ok((cell(old)?, cell(new)?)))
                    .collect::<Result<Vec<_>, String>>()?;
                Ok((column.clone(), pairs))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Self::new(rules)
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    fn replace_column(column: &Column, mapping: &[(Value, Value)]) -> UnitResult<Column> {
        let target = mapping
            .iter()
            .find_map(|(_, new)| new.dtype())
            .unwrap_or(column.dtype());
        let named = |e: UnitError| match e {
            UnitError::Cast { dtype, reason, .. } => UnitError::Cast {
                column: column.name().to_string(),
                dtype,
                reason,
            },
            other => other,
        };

        // keys not expressible in the column's type can never match
        let mut rules = Vec::with_capacity(mapping.len());
        for (old, new) in mapping {
            let new = new.cast(target).map_err(named)?;
            if let Ok(old) = old.cast(column.dtype()) {
                if !old.is_null() {
                    rules.push((old, new));
                }
            }
        }

        let values = column
            .values()
            .into_iter()
            .map(|cell| match rules.iter().find(|(old, _)| *old == cell) {
                Some((_, new)) => Ok(new.clone()),
                None => cell.cast(target).map_err(named),
            })
            .collect::<UnitResult<Vec<_>>>()?;
        Column::from_values(column.name(), target, &values)
    }
}

impl Transformer for BinaryReplace {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mut output = table.clone();
        for (name, mapping) in &self.rules {
            if let Some(column) = table.column(name) {
                output = output.with_column(Self::replace_column(&column, mapping)?)?;
            }
        }
        self.logger
            .info(format_args!("Applied replacements to {} columns", self.rules.len()));
        Ok(output)
    }

    fn name(&self) -> &'static str {
        BINARY_REPLACE
    }
}
