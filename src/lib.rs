// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // unit implementations
pub mod config;     // definitions, registry, loaders
pub mod engine;     // pipelines, sequences, strategies
pub mod errors;     // error handling
pub mod observability;
pub mod table;      // tabular value
pub mod traits;     // capability contracts
