//! Console sink (spec.md §4.7): human text or structured output to stdout,
//! with an optional status filter.

use crate::error::SinkError;
use crate::format::OutputFormat;
use crate::output_value::OutputValue;
use crate::sink::Sink;
use crate::sinks::writer_core::WriterCore;
use async_trait::async_trait;
use repowarden_core::RuleStatus;
use std::collections::HashSet;

pub struct ConsoleSink {
    core: WriterCore<tokio::io::Stdout>,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, status_filter: Option<HashSet<RuleStatus>>) -> Self {
        Self { core: WriterCore::new(tokio::io::stdout(), format, status_filter) }
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        self.core.write(value).await
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.core.close().await
    }
}
