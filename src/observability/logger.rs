// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The shared logging service.
//!
//! One [`Logger`] is constructed explicitly by the host (usually in `main`)
//! with [`Logger::init`] and handed by reference to everything that logs:
//! the [`Registry`](crate::config::Registry) passes it to units built with
//! `log: true`, pipelines and sequences keep a clone. `init` installs the
//! `tracing-subscriber` formatter exactly once per process; every later
//! call returns the same handle.
//!
//! Logging never fails. A handle that has been [`shut down`](Logger::shutdown)
//! silently drops messages, and a unit built without logging holds no
//! handle at all, so it never reaches this module.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Name used for the process-wide handle.
pub const CENTRAL_LOGGER: &str = "central";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Lenient parse: unknown level names fall back to `Info`.
    pub fn parse_or_info(level: &str) -> Self {
        level.parse().unwrap_or(LogLevel::Info)
    }

    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Subscriber settings applied by [`Logger::init`].
///
/// `filter` takes an `EnvFilter` directive string. When absent, `RUST_LOG`
/// is consulted, then `level`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub filter: Option<String>,
}

impl LogSettings {
    fn env_filter(&self) -> EnvFilter {
        match &self.filter {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_filter())),
        }
    }
}

struct LoggerState {
    name: String,
    active: AtomicBool,
}

/// Cheap, cloneable handle to the logging service.
#[derive(Clone)]
pub struct Logger {
    state: Arc<LoggerState>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.state.name)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Logger {
    /// Initialize the process-wide logger. First caller wins: later calls
    /// ignore `settings` and return the existing handle, re-activated.
    pub fn init(settings: &LogSettings) -> Logger {
        let logger = GLOBAL.get_or_init(|| {
            // Another subscriber may already be installed (tests, embedding
            // hosts); that one keeps receiving our events.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(settings.env_filter())
                .with_target(false)
                .try_init();
            Logger::detached(CENTRAL_LOGGER)
        });
        logger.state.active.store(true, Ordering::SeqCst);
        logger.clone()
    }

    /// The process-wide handle, if [`Logger::init`] has run.
    pub fn global() -> Option<Logger> {
        GLOBAL.get().cloned()
    }

    /// A handle that emits through whatever subscriber is current without
    /// installing one.
    pub fn detached(name: impl Into<String>) -> Logger {
        Logger {
            state: Arc::new(LoggerState {
                name: name.into(),
                active: AtomicBool::new(true),
            }),
        }
    }

    /// Stop emitting. Pending and future `log` calls become no-ops until the
    /// handle is re-initialized.
    pub fn shutdown(&self) {
        self.state.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn log(&self, level: LogLevel, message: impl Display) {
        if !self.is_active() {
            return;
        }
        let logger = self.state.name.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(logger, "{}", message),
            LogLevel::Info => tracing::info!(logger, "{}", message),
            LogLevel::Warning => tracing::warn!(logger, "{}", message),
            LogLevel::Error => tracing::error!(logger, "{}", message),
            LogLevel::Critical => tracing::error!(logger, critical = true, "{}", message),
        }
    }

    pub fn debug(&self, message: impl Display) {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Display) {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&self, message: impl Display) {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&self, message: impl Display) {
        self.log(LogLevel::Error, message)
    }
}

/// Per-unit logging handle.
///
/// Holds the unit's name and, when logging was enabled at construction, a
/// [`Logger`]. Disabled handles return before formatting anything.
#[derive(Debug, Clone)]
pub struct UnitLogger {
    unit: &'static str,
    logger: Option<Logger>,
}

impl UnitLogger {
    pub fn disabled(unit: &'static str) -> Self {
        Self { unit, logger: None }
    }

    pub fn enabled(unit: &'static str, logger: Logger) -> Self {
        Self {
            unit,
            logger: Some(logger),
        }
    }

    /// Enabled only when `enabled` is set and a logger is available.
    pub fn new(unit: &'static str, enabled: bool, logger: Option<&Logger>) -> Self {
        match (enabled, logger) {
            (true, Some(logger)) => Self::enabled(unit, logger.clone()),
            _ => Self::disabled(unit),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.logger.is_some()
    }

    pub fn log(&self, level: LogLevel, message: impl Display) {
        if let Some(logger) = &self.logger {
            logger.log(level, format_args!("[{}] {}", self.unit, message));
        }
    }

    pub fn info(&self, message: impl Display) {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&self, message: impl Display) {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&self, message: impl Display) {
        self.log(LogLevel::Error, message)
    }
}
