// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Top-level binding a pipeline definition file must expose
pub const PIPELINE_BINDING: &str = "PIPELINE";
/// Top-level binding a sequence definition file must expose
pub const SEQUENCE_BINDING: &str = "SEQUENCE";
/// Top-level binding a strategy definition file must expose
pub const STRATEGY_BINDING: &str = "strategy";

/// Extension appended to logical names when resolving definition files
pub const DEFINITION_EXTENSION: &str = "yaml";

/// Option key that switches logging on for a unit or pipeline
pub const LOG_OPTION: &str = "log";

pub const DEFAULT_PIPES_FOLDER: &str = "pipes";
pub const DEFAULT_SEQUENCES_FOLDER: &str = "sequences";
pub const DEFAULT_STRATEGIES_FOLDER: &str = "strategies";
