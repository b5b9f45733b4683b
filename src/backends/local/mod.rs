// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod formats;
pub mod pipelines;
pub mod units;

pub use factory::LocalUnitFactory;
pub use formats::{read_table, write_table, Format};
