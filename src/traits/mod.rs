// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod unit;

pub use unit::{Capability, Collector, MultiSink, Payload, Producer, Reducer, Sink, Transformer, Unit};
