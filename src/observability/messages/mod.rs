// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for diagnostic logging, organized by subsystem.

pub mod loader;
pub mod pipeline;
pub mod sequence;
