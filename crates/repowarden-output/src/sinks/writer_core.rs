//! Shared write/close logic for the three writer-backed sinks (Console,
//! Emit, File): same json/ndjson/text semantics over any
//! `AsyncWrite`-compatible destination (spec.md §4.7: "Emit sink — ...same
//! json/ndjson semantics as above").

use crate::error::SinkError;
use crate::format::OutputFormat;
use crate::output_value::OutputValue;
use repowarden_core::{RuleResult, RuleStatus};
use std::collections::HashSet;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

struct State<W> {
    writer: W,
    buffer: Vec<RuleResult>,
    closed: bool,
}

pub struct WriterCore<W> {
    format: OutputFormat,
    status_filter: Option<HashSet<RuleStatus>>,
    state: Mutex<State<W>>,
}

impl<W: AsyncWrite + Unpin + Send> WriterCore<W> {
    pub fn new(writer: W, format: OutputFormat, status_filter: Option<HashSet<RuleStatus>>) -> Self {
        Self {
            format,
            status_filter,
            state: Mutex::new(State { writer, buffer: Vec::new(), closed: false }),
        }
    }

    fn passes_filter(&self, result: &RuleResult) -> bool {
        match &self.status_filter {
            Some(allowed) => allowed.contains(&result.status),
            None => true,
        }
    }

    pub async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SinkError::Closed);
        }

        match self.format {
            OutputFormat::Json => {
                if let Some(result) = value.as_result() {
                    if self.passes_filter(result) {
                        state.buffer.push(result.clone());
                    }
                }
                Ok(())
            }
            OutputFormat::Ndjson => {
                if let Some(result) = value.as_result() {
                    if !self.passes_filter(result) {
                        return Ok(());
                    }
                }
                let line = serde_json::to_string(&value.to_json())
                    .map_err(|e| SinkError::Serialize(e.to_string()))?;
                write_line(&mut state.writer, &line).await
            }
            OutputFormat::Text => {
                if let Some(result) = value.as_result() {
                    if self.passes_filter(result) {
                        let line = format!(
                            "{} {} {}{}",
                            result.repo,
                            result.rule_id,
                            result.status.as_str(),
                            result.message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
                        );
                        write_line(&mut state.writer, &line).await?;
                    }
                }
                Ok(())
            }
        }
    }

    pub async fn close(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        if self.format == OutputFormat::Json {
            let rendered = serde_json::to_string_pretty(&state.buffer)
                .map_err(|e| SinkError::Serialize(e.to_string()))?;
            write_line(&mut state.writer, &rendered).await?;
        }
        state.writer.flush().await.map_err(|e| SinkError::Io(e.to_string()))
    }
}

async fn write_line<W: AsyncWrite + Unpin + Send>(writer: &mut W, line: &str) -> Result<(), SinkError> {
    writer.write_all(line.as_bytes()).await.map_err(|e| SinkError::Io(e.to_string()))?;
    writer.write_all(b"\n").await.map_err(|e| SinkError::Io(e.to_string()))?;
    writer.flush().await.map_err(|e| SinkError::Io(e.to_string()))
}
