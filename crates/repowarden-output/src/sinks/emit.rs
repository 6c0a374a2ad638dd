//! Emit sink (spec.md §4.7): an additional stream written to a caller-
//! supplied writer, same json/ndjson semantics as the Console sink, no text
//! mode.

use crate::error::SinkError;
use crate::format::OutputFormat;
use crate::output_value::OutputValue;
use crate::sink::Sink;
use crate::sinks::writer_core::WriterCore;
use async_trait::async_trait;
use repowarden_core::RuleStatus;
use std::collections::HashSet;
use tokio::io::AsyncWrite;

pub struct EmitSink {
    core: WriterCore<Box<dyn AsyncWrite + Unpin + Send>>,
}

impl EmitSink {
    /// `format` must be `Json` or `Ndjson`; `Text` degrades to `Ndjson`
    /// since the Emit sink has no text mode.
    pub fn new(
        writer: Box<dyn AsyncWrite + Unpin + Send>,
        format: OutputFormat,
        status_filter: Option<HashSet<RuleStatus>>,
    ) -> Self {
        let format = match format {
            OutputFormat::Text => OutputFormat::Ndjson,
            other => other,
        };
        Self { core: WriterCore::new(writer, format, status_filter) }
    }
}

#[async_trait]
impl Sink for EmitSink {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        self.core.write(value).await
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.core.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[tokio::test]
    async fn text_format_degrades_to_ndjson() {
        let buf: Vec<u8> = Vec::new();
        let sink = EmitSink::new(Box::new(buf), OutputFormat::Text, None);
        sink.write(&OutputValue::Event(Event::RunFinished { exit_code: 0 })).await.unwrap();
        sink.close().await.unwrap();
    }
}
