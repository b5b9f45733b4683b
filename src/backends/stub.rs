// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Mutex;

use crate::errors::{UnitError, UnitResult};
use crate::table::{Column, DataType, Table, Value};
use crate::traits::{Producer, Sink, Transformer};

/// Produces the same `n`-row table (`id`, `label`) on every call
pub struct FixedProducer {
    rows: usize,
}

impl FixedProducer {
    pub fn rows(rows: usize) -> Self {
        Self { rows }
    }

    pub fn table(&self) -> Table {
        Table::new(vec![
            Column::int64("id", (0..self.rows as i64).map(Some)),
            Column::utf8("label", (0..self.rows).map(|i| Some(format!("row-{}", i)))),
        ])
        .unwrap()
    }
}

impl Producer for FixedProducer {
    fn produce(&self) -> UnitResult<Table> {
        Ok(self.table())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }

    fn source(&self) -> &str {
        "memory"
    }
}

/// Returns its input unchanged
pub struct IdentityTransformer;

impl Transformer for IdentityTransformer {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        Ok(table.clone())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Always fails with the configured message
pub struct FailingTransformer {
    message: String,
}

impl FailingTransformer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Transformer for FailingTransformer {
    fn transform(&self, _table: &Table) -> UnitResult<Table> {
        Err(UnitError::Failed(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Appends one row carrying its tag to a single-column `tag` table,
/// which makes execution order visible in the output.
pub struct AppendRowTransformer {
    tag: String,
}

impl AppendRowTransformer {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Empty `tag` table to start from.
    pub fn seed() -> Table {
        Table::new(vec![Column::utf8::<&str>("tag", [])]).unwrap()
    }
}

impl Transformer for AppendRowTransformer {
    fn transform(&self, table: &Table) -> UnitResult<Table> {
        let mut values = table.require_column("tag")?.values();
        values.push(Value::Str(self.tag.clone()));
        Table::new(vec![Column::from_values("tag", DataType::Utf8, &values)?])
    }

    fn name(&self) -> &'static str {
        "append_row"
    }
}

/// Records the height of every table it is asked to write
#[derive(Default)]
pub struct RecordingSink {
    heights: Mutex<Vec<usize>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.heights.lock().unwrap().len()
    }

    pub fn last_height(&self) -> Option<usize> {
        self.heights.lock().unwrap().last().copied()
    }
}

impl Sink for RecordingSink {
    fn write(&self, table: &Table) -> UnitResult<()> {
        self.heights.lock().unwrap().push(table.height());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
