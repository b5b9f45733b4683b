// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::Deserialize;

use crate::config::StrategyFn;
use crate::errors::UnitResult;
use crate::observability::{LogLevel, UnitLogger};
use crate::table::Table;
use crate::traits::Transformer;

pub const LOG_MESSAGE: &str = "log_message";
pub const CONDITIONAL_FLOW: &str = "conditional_flow";
pub const FUNCTION: &str = "function";

#[derive(Debug, Clone, Deserialize)]
pub struct LogMessageConfig {
    pub message: String,
    /// Unknown level names fall back to INFO.
    #[serde(default)]
    pub level: Option<String>,
}

/// Identity transformer that logs a fixed message when logging is on.
pub struct LogMessage {
    message: String,
    level: LogLevel,
    logger: UnitLogger,
}

impl LogMessage {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
            logger: UnitLogger::disabled(LOG_MESSAGE),
        }
    }

    pub fn from_config(config: LogMessageConfig) -> Self {
        let level = config
            .level
            .as_deref()
            .map(LogLevel::parse_or_info)
            .unwrap_or_default();
        Self::new(config.message, level)
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Transformer for LogMessage {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        self.logger.log(self.level, &self.message);
        Ok(table.clone())
    }

    fn name(&self) -> &'static str {
        LOG_MESSAGE
    }
}

pub type Predicate = Arc<dyn Fn(&Table) -> bool + Send + Sync>;

/// Routes the input through one of two transformers depending on a
/// predicate evaluated against it.
pub struct ConditionalFlow {
    condition: Predicate,
    when_true: Arc<dyn Transformer>,
    when_false: Arc<dyn Transformer>,
    logger: UnitLogger,
}

impl ConditionalFlow {
    pub fn new(
        condition: impl Fn(&Table) -> bool + Send + Sync + 'static,
        when_true: Arc<dyn Transformer>,
        when_false: Arc<dyn Transformer>,
    ) -> Self {
        Self {
            condition: Arc::new(condition),
            when_true,
            when_false,
            logger: UnitLogger::disabled(CONDITIONAL_FLOW),
        }
    }

    pub fn with_logger(mut self, logger: UnitLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl Transformer for ConditionalFlow {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        if (self.condition)(table) {
            self.logger.info(format_args!(
                "Condition evaluated to true, running '{}'",
                self.when_true.name()
            ));
            self.when_true.transform(table)
        } else {
            self.logger.info(format_args!(
                "Condition evaluated to false, running '{}'",
                self.when_false.name()
            ));
            self.when_false.transform(table)
        }
    }

    fn name(&self) -> &'static str {
        CONDITIONAL_FLOW
    }
}

/// Adapts a registered table function to the transformer capability.
pub struct FnTransformer {
    function: StrategyFn,
}

impl FnTransformer {
    pub fn new(function: StrategyFn) -> Self {
        Self { function }
    }
}

impl Transformer for FnTransformer {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        (self.function)(table)
    }

    fn name(&self) -> &'static str {
        FUNCTION
    }
}
