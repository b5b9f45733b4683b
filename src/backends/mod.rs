// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unit implementations.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process units over [`Table`](crate::table::Table) values:
//! - **Filesystem**: read and write csv, Parquet (`.pq`) and json files
//! - **Compound**: gather several inputs, fan one input out to branches
//! - **Merging**: concatenation and key joins
//! - **Cleaning**: type casts, null filling, literal pattern replacement
//! - **Flow**: log messages, conditional branches, wrapped functions
//!
//! Every kind is registered by [`LocalUnitFactory`](local::LocalUnitFactory)
//! together with the built-in pipeline factories.
//!
//! ## Stub Backend (Test-Only)
//! Small deterministic units for exercising the engine:
//! - **FixedProducer**: produces an `n`-row table
//! - **IdentityTransformer**, **AppendRowTransformer**: trivial transformers
//! - **FailingTransformer**: always fails with a given message
//! - **RecordingSink**: counts what it was asked to write
//!
//! # Architecture
//!
//! ```text
//! Definition file → Registry → Unit → Pipeline / Sequence / Strategy
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_pipewood::backends::local::units::ReplacePattern;
//! use the_pipewood::engine::FlowThroughPipe;
//! use the_pipewood::traits::Unit;
//!
//! let pipe = FlowThroughPipe::new(
//!     "strip_dollars",
//!     vec![Unit::transformer(ReplacePattern::literal(vec!["amount".into()], "$", ""))],
//! )?;
//! assert_eq!(pipe.units().len(), 1);
//! # Ok::<(), the_pipewood::errors::PipelineError>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
