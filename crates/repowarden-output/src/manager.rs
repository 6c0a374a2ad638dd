//! `OutputManager` — fan-out coordinator (SPEC_FULL.md §4.7, §5): every
//! `write`/`close` calls each sink in turn, collecting failures rather than
//! short-circuiting on the first one.

use crate::error::{OutputError, SinkError};
use crate::output_value::OutputValue;
use crate::sink::Sink;

pub struct OutputManager {
    sinks: Vec<Box<dyn Sink>>,
}

impl OutputManager {
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub async fn write(&self, value: &OutputValue) -> Result<(), OutputError> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(err) = sink.write(value).await {
                tracing::warn!(error = %err, "sink write failed");
                failures.push(err);
            }
        }
        match OutputError::from_failures(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub async fn close(&self) -> Result<(), OutputError> {
        let mut failures: Vec<SinkError> = Vec::new();
        for sink in &self.sinks {
            if let Err(err) = sink.close().await {
                tracing::warn!(error = %err, "sink close failed");
                failures.push(err);
            }
        }
        match OutputError::from_failures(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
