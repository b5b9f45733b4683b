// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::backends::local::formats::{read_table, write_table};
use crate::errors::{UnitError, UnitResult};
use crate::observability::UnitLogger;
use crate::table::Table;
use crate::traits::{MultiSink, Producer, Sink};

pub const READ_TABLE: &str = "read_table";
pub const WRITE_TABLE: &str = "write_table";
pub const WRITE_MANY: &str = "write_many";

#[derive(Debug, Clone, Deserialize)]
pub struct ReadTableConfig {
    pub src: String,
}

/// Loads one table from `src`; the format comes from the extension.
pub struct ReadTable {
    config: ReadTableConfig,
    logger: UnitLogger,
}

impl ReadTable {
    pub fn new(src: impl Into<String>) -> Self {
        Self::from_config(ReadTableConfig { src: src.into() })
    }

    pub fn from_config(config: ReadTableConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(READ_TABLE),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Producer for ReadTable {
    fn produce(&self) -> UnitResult<Table> {
        self.logger.info(format_args!("Reading data from {}", self.config.src));
        let table = read_table(&self.config.src)?;
        self.logger.info(format_args!(
            "Read {} rows x {} columns from {}",
            table.height(),
            table.width(),
            self.config.src
        ));
        Ok(table)
    }

    fn name(&self) -> &'static str {
        READ_TABLE
    }

    fn source(&self) -> &str {
        &self.config.src
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteTableConfig {
    pub save_to: String,
}

/// Persists its input to `save_to`.
pub struct WriteTable {
    config: WriteTableConfig,
    logger: UnitLogger,
}

impl WriteTable {
    pub fn new(save_to: impl Into<String>) -> Self {
        Self::from_config(WriteTableConfig {
            save_to: save_to.into(),
        })
    }

    pub fn from_config(config: WriteTableConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(WRITE_TABLE),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Sink for WriteTable {
    fn write(&self, table: &Table) -> UnitResult<()> {
        write_table(&self.config.save_to, table)?;
        self.logger.info(format_args!(
            "Wrote {} rows to {}",
            table.height(),
            self.config.save_to
        ));
        Ok(())
    }

    fn name(&self) -> &'static str {
        WRITE_TABLE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteManyConfig {
    pub save_to: Vec<String>,
}

/// Writes the i-th table to the i-th destination.
pub struct WriteMany {
    config: WriteManyConfig,
    logger: UnitLogger,
}

impl WriteMany {
    pub fn new(save_to: Vec<String>) -> Self {
        Self::from_config(WriteManyConfig { save_to })
    }

    pub fn from_config(config: WriteManyConfig) -> Self {
        Self {
            config,
            logger: UnitLogger::disabled(WRITE_MANY),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl MultiSink for WriteMany {
    /// Arity is checked before anything is written.
    fn write_all(&self, tables: &[Table]) -> UnitResult<()> {
        if tables.len() != self.config.save_to.len() {
            let error = UnitError::ArityMismatch {
                values: tables.len(),
                destinations: self.config.save_to.len(),
            };
            self.logger.error(&error);
            return Err(error);
        }
        for (table, path) in tables.iter().zip(&self.config.save_to) {
            write_table(path, table)?;
            self.logger
                .info(format_args!("Wrote {} rows to {}", table.height(), path));
        }
        Ok(())
    }

    fn destinations(&self) -> usize {
        self.config.save_to.len()
    }

    fn name(&self) -> &'static str {
        WRITE_MANY
    }
}
