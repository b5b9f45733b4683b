// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Strictly sequential unit runner shared by every pipeline shape and by
//! strategies.

use std::time::Instant;

use crate::errors::PipelineError;
use crate::observability::messages::pipeline::{UnitCompleted, UnitFailed};
use crate::observability::Logger;
use crate::traits::{Payload, Unit};

/// Ordered units plus the name and logger used for diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct Stages {
    name: String,
    units: Vec<Unit>,
    logger: Option<Logger>,
}

impl Stages {
    pub(crate) fn new(name: String, units: Vec<Unit>, logger: Option<Logger>) -> Self {
        Self { name, units, logger }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn units(&self) -> &[Unit] {
        &self.units
    }

    pub(crate) fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Thread `payload` through every unit, left to right.
    ///
    /// The first failure aborts the run; whatever upstream units produced is
    /// dropped with it. The failure is logged at ERROR (when a logger is
    /// attached) and returned wrapped with the unit's position and name.
    pub(crate) fn execute(&self, mut payload: Payload) -> Result<Payload, PipelineError> {
        for (position, unit) in self.units.iter().enumerate() {
            let started = Instant::now();
            payload = match unit.invoke(payload) {
                Ok(next) => next,
                Err(source) => {
                    if let Some(logger) = &self.logger {
                        logger.error(UnitFailed {
                            pipeline: &self.name,
                            position,
                            unit: unit.name(),
                            error: &source,
                        });
                    }
                    return Err(PipelineError::UnitExecution {
                        pipeline: self.name.clone(),
                        position,
                        unit: unit.name().to_string(),
                        source,
                    });
                }
            };
            if let Some(logger) = &self.logger {
                logger.debug(UnitCompleted {
                    pipeline: &self.name,
                    position,
                    unit: unit.name(),
                    duration: started.elapsed(),
                });
            }
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingTransformer, IdentityTransformer};
    use crate::table::Table;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Collects formatted events so tests can inspect them.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_captured(stages: &Stages) -> (Result<Payload, PipelineError>, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            stages.execute(Payload::One(Table::empty()))
        });
        (result, captured.text())
    }

    fn failing_second(logger: Option<Logger>) -> Stages {
        Stages::new(
            "nightly".to_string(),
            vec![
                Unit::transformer(IdentityTransformer),
                Unit::transformer(FailingTransformer::new("disk on fire")),
            ],
            logger,
        )
    }

    #[test]
    fn test_failing_unit_logs_error_with_location() {
        let (result, output) = run_captured(&failing_second(Some(Logger::detached("stages"))));
        assert!(matches!(result, Err(PipelineError::UnitExecution { position: 1, .. })));

        let line = output
            .lines()
            .find(|line| line.contains("ERROR"))
            .unwrap_or_else(|| panic!("no ERROR line in {:?}", output));
        assert!(line.contains("Pipeline 'nightly' unit 1 ('failing') failed: disk on fire"));
        assert!(output.contains("unit 0 ('identity') completed"));
    }

    #[test]
    fn test_no_logger_emits_nothing() {
        let (result, output) = run_captured(&failing_second(None));
        assert!(result.is_err());
        assert!(output.is_empty(), "unexpected output: {:?}", output);
    }
}
