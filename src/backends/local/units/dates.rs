// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Date and time parsing transformers.

use arrow::array::{Array, AsArray, StringArray};
use chrono::format::ParseErrorKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseResult, Timelike};
use serde::Deserialize;

use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::{Column, DataType, Table, Value};
use crate::traits::Transformer;

pub const FORMAT_DATES: &str = "format_dates";
pub const SPLIT_TIME: &str = "split_time";
pub const GENERATE_TIMESTAMP: &str = "generate_timestamp";

fn text_column(column: &Column) -> UnitResult<StringArray> {
    match column.array().as_string_opt::<i32>() {
        Some(text) => Ok(text.clone()),
        None => Err(UnitError::ColumnType {
            column: column.name().to_string(),
            expected: DataType::Utf8.to_string(),
            found: column.dtype().to_string(),
        }),
    }
}

/// Parse a date, defaulting the day to 1 for day-less formats like `%m/%Y`.
fn parse_date(value: &str, format: &str) -> ParseResult<NaiveDate> {
    match NaiveDate::parse_from_str(value, format) {
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            NaiveDate::parse_from_str(&format!("{} 1", value), &format!("{} %d", format))
        }
        parsed => parsed,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatDatesConfig {
    pub columns: Vec<String>,
    pub format: String,
    #[serde(default)]
    pub strict: bool,
}

/// Parses text columns into Date columns with a `strftime` format.
///
/// Cells that do not match become null, unless `strict` is set, in which
/// case the first such cell fails the unit. Columns that are already dates
/// pass through.
pub struct FormatDates {
    config: FormatDatesConfig,
    logger: UnitLogger,
}

impl FormatDates {
    pub fn new(columns: Vec<String>, format: impl Into<String>, strict: bool) -> Self {
        Self::from_config(FormatDatesConfig {
            columns,
            format: format.into(),
            strict,
        })
    }

    pub fn from_config(config: FormatDatesConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(FORMAT_DATES),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for FormatDates {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let format = self.config.format.as_str();
        let mut output = table.clone();
        let mut unparsed = 0;
        for name in &self.config.columns {
            let column = table.require_column(name)?;
            if column.dtype() == DataType::Date {
                continue;
            }
            let text = text_column(&column)?;
            let mut dates = Vec::with_capacity(text.len());
            for cell in text.iter() {
                let parsed = match cell {
                    None => None,
                    Some(value) => match parse_date(value, format) {
                        Ok(date) => Some(date),
                        Err(e) if self.config.strict => {
                            return Err(UnitError::Cast {
                                column: name.clone(),
                                dtype: DataType::Date.to_string(),
                                reason: format!("'{}' does not match '{}': {}", value, format, e),
                            })
                        }
                        Err(_) => {
                            unparsed += 1;
                            None
                        }
                    },
                };
                dates.push(parsed);
            }
            output = output.with_column(Column::date(name.as_str(), dates))?;
        }
        self.logger.info(format_args!(
            "Parsed {:?} as '{}' ({} unparsed cells)",
            self.config.columns, format, unparsed
        ));
        Ok(output)
    }

    fn name(&self) -> &'static str {
        FORMAT_DATES
    }
}

fn default_time_col() -> String {
    "Time".to_string()
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_hour_col() -> String {
    "Hour".to_string()
}

fn default_minute_col() -> String {
    "Minute".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitTimeConfig {
    #[serde(default = "default_time_col")]
    pub time_col: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default = "default_hour_col")]
    pub hour_col: String,
    #[serde(default = "default_minute_col")]
    pub minute_col: String,
}

impl Default for SplitTimeConfig {
    fn default() -> Self {
        Self {
            time_col: default_time_col(),
            time_format: default_time_format(),
            hour_col: default_hour_col(),
            minute_col: default_minute_col(),
        }
    }
}

/// Splits a text time-of-day column into Int64 hour and minute columns.
pub struct SplitTime {
    config: SplitTimeConfig,
    logger: UnitLogger,
}

impl SplitTime {
    pub fn from_config(config: SplitTimeConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(SPLIT_TIME),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for SplitTime {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let config = &self.config;
        let column = table.require_column(&config.time_col)?;
        let text = text_column(&column)?;

        let mut hours = Vec::with_capacity(text.len());
        let mut minutes = Vec::with_capacity(text.len());
        for cell in text.iter() {
            let time = cell
                .map(|value| {
                    NaiveTime::parse_from_str(value.trim(), &config.time_format).map_err(|e| {
                        UnitError::Cast {
                            column: config.time_col.clone(),
                            dtype: "time".to_string(),
                            reason: format!("'{}' does not match '{}': {}", value, config.time_format, e),
                        }
                    })
                })
                .transpose()?;
            hours.push(time.map(|t| i64::from(t.hour())));
            minutes.push(time.map(|t| i64::from(t.minute())));
        }

        self.logger.info(format_args!(
            "Split '{}' into '{}' and '{}'",
            config.time_col, config.hour_col, config.minute_col
        ));
        table
            .with_column(Column::int64(config.hour_col.as_str(), hours))?
            .with_column(Column::int64(config.minute_col.as_str(), minutes))
    }

    fn name(&self) -> &'static str {
        SPLIT_TIME
    }
}

fn default_year_col() -> String {
    "Year".to_string()
}

fn default_month_col() -> String {
    "Month".to_string()
}

fn default_day_col() -> String {
    "Day".to_string()
}

fn default_second_col() -> String {
    "Second".to_string()
}

fn default_timestamp_col() -> String {
    "Datetime".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTimestampConfig {
    pub format: String,
    #[serde(default = "default_year_col")]
    pub year_col: String,
    #[serde(default = "default_month_col")]
    pub month_col: String,
    #[serde(default = "default_day_col")]
    pub day_col: String,
    #[serde(default = "default_hour_col")]
    pub hour_col: String,
    #[serde(default = "default_minute_col")]
    pub minute_col: String,
    #[serde(default = "default_second_col")]
    pub second_col: String,
    #[serde(default = "default_timestamp_col")]
    pub output: String,
}

impl GenerateTimestampConfig {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            year_col: default_year_col(),
            month_col: default_month_col(),
            day_col: default_day_col(),
            hour_col: default_hour_col(),
            minute_col: default_minute_col(),
            second_col: default_second_col(),
            output: default_timestamp_col(),
        }
    }

    /// Columns named by the format's specifiers, in the order the
    /// specifiers appear in it.
    fn components(&self) -> Vec<&str> {
        let mut found: Vec<(usize, &str)> = [
            ("%Y", &self.year_col),
            ("%m", &self.month_col),
            ("%d", &self.day_col),
            ("%H", &self.hour_col),
            ("%M", &self.minute_col),
            ("%S", &self.second_col),
        ]
        .into_iter()
        .filter_map(|(specifier, column)| self.format.find(specifier).map(|at| (at, column.as_str())))
        .collect();
        found.sort_by_key(|(at, _)| *at);
        found.into_iter().map(|(_, column)| column).collect()
    }

    fn has_time(&self) -> bool {
        ["%H", "%M", "%S"].iter().any(|s| self.format.contains(s))
    }
}

/// Builds a Datetime column from separate date and time part columns.
///
/// The parts named by `format` are zero-padded to two digits, joined with
/// `-` and parsed with `format`, so formats are written like
/// `%Y-%m-%d-%H-%M`. A null part makes the row's timestamp null.
pub struct GenerateTimestamp {
    config: GenerateTimestampConfig,
    logger: UnitLogger,
}

impl GenerateTimestamp {
    pub fn from_config(config: GenerateTimestampConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(GENERATE_TIMESTAMP),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    fn parse(&self, joined: &str) -> ParseResult<NaiveDateTime> {
        if self.config.has_time() {
            NaiveDateTime::parse_from_str(joined, &self.config.format)
        } else {
            NaiveDate::parse_from_str(joined, &self.config.format).map(|d| d.and_time(NaiveTime::MIN))
        }
    }
}

impl Transformer for GenerateTimestamp {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let names = self.config.components();
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| table.column(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(UnitError::ColumnNotFound {
                column: missing.join(", "),
            });
        }
        let parts = names
            .iter()
            .map(|name| table.require_column(name))
            .collect::<UnitResult<Vec<_>>>()?;

        let mut stamps = Vec::with_capacity(table.height());
        for row in 0..table.height() {
            let cells: Vec<Value> = parts.iter().map(|part| part.value(row)).collect();
            if cells.iter().any(Value::is_null) {
                stamps.push(None);
                continue;
            }
            let joined = cells
                .iter()
                .map(|cell| format!("{:0>2}", cell.to_string()))
                .collect::<Vec<_>>()
                .join("-");
            let stamp = self.parse(&joined).map_err(|e| UnitError::Cast {
                column: self.config.output.clone(),
                dtype: DataType::Datetime.to_string(),
                reason: format!("'{}' does not match '{}': {}", joined, self.config.format, e),
            })?;
            stamps.push(Some(stamp));
        }

        self.logger.info(format_args!(
            "Generated '{}' from {:?}",
            self.config.output, names
        ));
        table.with_column(Column::datetime(self.config.output.as_str(), stamps))
    }

    fn name(&self) -> &'static str {
        GENERATE_TIMESTAMP
    }
}
