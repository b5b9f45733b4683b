// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for definition file resolution.

use std::fmt::{Display, Formatter};

/// A definition file was read and its binding extracted.
///
/// # Log Level
/// `debug` - Routine lifecycle event
pub struct DefinitionLoaded<'a> {
    pub binding: &'a str,
    pub path: &'a str,
    pub size_bytes: usize,
}

impl Display for DefinitionLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded '{}' definition from {} ({} bytes)",
            self.binding, self.path, self.size_bytes
        )
    }
}

/// A definition file could not be resolved.
///
/// # Log Level
/// `error` - Failure requiring attention
pub struct DefinitionLoadFailed<'a> {
    pub name: &'a str,
    pub folder: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DefinitionLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load '{}' from folder '{}': {}",
            self.name, self.folder, self.error
        )
    }
}
