// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Logging service and structured message types.
//!
//! [`logger`] holds the shared [`Logger`] handle and the per-unit
//! [`UnitLogger`]. [`messages`] holds one `Display` struct per diagnostic
//! event so the engine and loaders never format ad-hoc strings:
//!
//! * `messages::pipeline` - pipeline assembly and unit execution
//! * `messages::sequence` - sequence orchestration
//! * `messages::loader` - definition file resolution
//!
//! ```rust
//! use the_pipewood::observability::{Logger, LogLevel};
//! use the_pipewood::observability::messages::pipeline::PipelineStarted;
//!
//! let logger = Logger::detached("docs");
//! logger.log(LogLevel::Info, PipelineStarted {
//!     pipeline: "clean",
//!     shape: "FLOW_THROUGH",
//!     unit_count: 3,
//! });
//! ```

pub mod logger;
pub mod messages;

pub use logger::{LogLevel, LogSettings, Logger, UnitLogger};
