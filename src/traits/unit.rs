// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability contracts every unit satisfies.
//!
//! A unit is a named, stateless-between-calls step with exactly one
//! capability. Each capability is its own trait with a fixed input/output
//! arity, and [`Unit`] tags a shared trait object with its capability so
//! pipelines can check their boundaries without probing for methods.
//!
//! | Capability    | Consumes        | Produces      |
//! |---------------|-----------------|---------------|
//! | `Producer`    | nothing         | one table     |
//! | `Collector`   | nothing         | list of tables|
//! | `Transformer` | one table       | one table     |
//! | `Reducer`     | list of tables  | one table     |
//! | `Sink`        | one table       | nothing       |
//! | `MultiSink`   | list of tables  | nothing       |

use std::fmt;
use std::sync::Arc;

use crate::errors::{UnitError, UnitResult};
use crate::table::Table;

/// Source unit: no input, one table out.
pub trait Producer: Send + Sync {
    fn produce(&self) -> UnitResult<Table>;

    fn name(&self) -> &'static str;

    /// Where the data comes from; diagnostics only.
    fn source(&self) -> &str;
}

/// Compound source: no input, several tables out.
pub trait Collector: Send + Sync {
    fn collect(&self) -> UnitResult<Vec<Table>>;

    fn name(&self) -> &'static str;
}

/// Pure function of one table, configured at construction.
pub trait Transformer: Send + Sync {
    fn transform(&self, table: &Table) -> UnitResult<Table>;

    fn name(&self) -> &'static str;
}

/// Combines an ordered list of tables into one.
///
/// A single-element list must come back as that element (no combination
/// logic for n = 1). An empty list fails with
/// [`UnitError::EmptyReduction`] unless the reducer defines an identity.
pub trait Reducer: Send + Sync {
    fn reduce(&self, tables: &[Table]) -> UnitResult<Table>;

    fn name(&self) -> &'static str;
}

/// Side-effecting terminal for one table.
pub trait Sink: Send + Sync {
    fn write(&self, table: &Table) -> UnitResult<()>;

    fn name(&self) -> &'static str;
}

/// Side-effecting terminal for a list of tables, one per destination.
pub trait MultiSink: Send + Sync {
    /// Fails with [`UnitError::ArityMismatch`] when `tables.len()` differs
    /// from [`MultiSink::destinations`].
    fn write_all(&self, tables: &[Table]) -> UnitResult<()>;

    fn destinations(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Capability tag carried by every [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Producer,
    Collector,
    Transformer,
    Reducer,
    Sink,
    MultiSink,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Producer => "Producer",
            Capability::Collector => "Collector",
            Capability::Transformer => "Transformer",
            Capability::Reducer => "Reducer",
            Capability::Sink => "Sink",
            Capability::MultiSink => "MultiSink",
        };
        f.write_str(name)
    }
}

/// Data threaded from one unit to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    One(Table),
    Many(Vec<Table>),
}

impl Payload {
    pub fn describe(&self) -> &'static str {
        match self {
            Payload::Empty => "no input",
            Payload::One(_) => "one table",
            Payload::Many(_) => "a list of tables",
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Payload::One(table) => Some(table),
            _ => None,
        }
    }
}

impl From<Option<Table>> for Payload {
    fn from(value: Option<Table>) -> Self {
        match value {
            Some(table) => Payload::One(table),
            None => Payload::Empty,
        }
    }
}

/// A unit tagged with its capability.
///
/// Cloning shares the underlying unit; the framework never mutates it.
#[derive(Clone)]
pub enum Unit {
    Producer(Arc<dyn Producer>),
    Collector(Arc<dyn Collector>),
    Transformer(Arc<dyn Transformer>),
    Reducer(Arc<dyn Reducer>),
    Sink(Arc<dyn Sink>),
    MultiSink(Arc<dyn MultiSink>),
}

impl Unit {
    pub fn producer(unit: impl Producer + 'static) -> Self {
        Unit::Producer(Arc::new(unit))
    }

    pub fn collector(unit: impl Collector + 'static) -> Self {
        Unit::Collector(Arc::new(unit))
    }

    pub fn transformer(unit: impl Transformer + 'static) -> Self {
        Unit::Transformer(Arc::new(unit))
    }

    pub fn reducer(unit: impl Reducer + 'static) -> Self {
        Unit::Reducer(Arc::new(unit))
    }

    pub fn sink(unit: impl Sink + 'static) -> Self {
        Unit::Sink(Arc::new(unit))
    }

    pub fn multi_sink(unit: impl MultiSink + 'static) -> Self {
        Unit::MultiSink(Arc::new(unit))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Unit::Producer(_) => Capability::Producer,
            Unit::Collector(_) => Capability::Collector,
            Unit::Transformer(_) => Capability::Transformer,
            Unit::Reducer(_) => Capability::Reducer,
            Unit::Sink(_) => Capability::Sink,
            Unit::MultiSink(_) => Capability::MultiSink,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unit::Producer(u) => u.name(),
            Unit::Collector(u) => u.name(),
            Unit::Transformer(u) => u.name(),
            Unit::Reducer(u) => u.name(),
            Unit::Sink(u) => u.name(),
            Unit::MultiSink(u) => u.name(),
        }
    }

    /// Run the unit on whatever the previous unit left behind.
    ///
    /// Only pipeline boundaries are checked at construction, so interior
    /// mismatches (a transformer handed a list, anything after a sink)
    /// surface here as [`UnitError::InputMismatch`]. Reducers and multi
    /// sinks accept a single table as a one-element list.
    pub fn invoke(&self, payload: Payload) -> UnitResult<Payload> {
        match (self, payload) {
            (Unit::Producer(u), Payload::Empty) => u.produce().map(Payload::One),
            (Unit::Collector(u), Payload::Empty) => u.collect().map(Payload::Many),
            (Unit::Transformer(u), Payload::One(table)) => u.transform(&table).map(Payload::One),
            (Unit::Reducer(u), Payload::Many(tables)) => u.reduce(&tables).map(Payload::One),
            (Unit::Reducer(u), Payload::One(table)) => {
                u.reduce(std::slice::from_ref(&table)).map(Payload::One)
            }
            (Unit::Sink(u), Payload::One(table)) => u.write(&table).map(|_| Payload::Empty),
            (Unit::MultiSink(u), Payload::Many(tables)) => {
                u.write_all(&tables).map(|_| Payload::Empty)
            }
            (Unit::MultiSink(u), Payload::One(table)) => u
                .write_all(std::slice::from_ref(&table))
                .map(|_| Payload::Empty),
            (unit, payload) => Err(UnitError::InputMismatch {
                unit: unit.name().to_string(),
                expected: unit.expects(),
                found: payload.describe(),
            }),
        }
    }

    fn expects(&self) -> &'static str {
        match self {
            Unit::Producer(_) | Unit::Collector(_) => "no input",
            Unit::Transformer(_) | Unit::Sink(_) => "one table",
            Unit::Reducer(_) | Unit::MultiSink(_) => "a list of tables",
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FixedProducer, IdentityTransformer, RecordingSink};
    use crate::backends::local::units::MergeTables;

    #[test]
    fn test_capability_tags() {
        assert_eq!(Unit::producer(FixedProducer::rows(1)).capability(), Capability::Producer);
        assert_eq!(Unit::transformer(IdentityTransformer).capability(), Capability::Transformer);
        assert_eq!(Unit::sink(RecordingSink::new()).capability(), Capability::Sink);
    }

    #[test]
    fn test_transformer_rejects_empty_payload() {
        let unit = Unit::transformer(IdentityTransformer);
        let err = unit.invoke(Payload::Empty).unwrap_err();
        match err {
            UnitError::InputMismatch { unit, expected, found } => {
                assert_eq!(unit, "identity");
                assert_eq!(expected, "one table");
                assert_eq!(found, "no input");
            }
            other => panic!("Expected InputMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_producer_rejects_input() {
        let unit = Unit::producer(FixedProducer::rows(2));
        let result = unit.invoke(Payload::One(Table::empty()));
        assert!(matches!(result, Err(UnitError::InputMismatch { .. })));
    }

    #[test]
    fn test_reducer_lifts_single_table() {
        let table = FixedProducer::rows(3).produce().unwrap();
        let unit = Unit::reducer(MergeTables::concat());
        let out = unit.invoke(Payload::One(table.clone())).unwrap();
        assert_eq!(out, Payload::One(table));
    }

    #[test]
    fn test_sink_consumes_payload() {
        let sink = Arc::new(RecordingSink::new());
        let unit = Unit::Sink(sink.clone());
        let out = unit.invoke(Payload::One(Table::empty())).unwrap();
        assert_eq!(out, Payload::Empty);
        assert_eq!(sink.writes(), 1);
    }
}
