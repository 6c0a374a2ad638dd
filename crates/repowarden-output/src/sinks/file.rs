//! File sink (spec.md §4.7): same json/ndjson semantics, writing to a file
//! path; format inferred from the path's extension when not given
//! explicitly, parent directory created if missing.

use crate::error::SinkError;
use crate::format::OutputFormat;
use crate::output_value::OutputValue;
use crate::sink::Sink;
use crate::sinks::writer_core::WriterCore;
use async_trait::async_trait;
use repowarden_core::RuleStatus;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct FileSink {
    core: WriterCore<tokio::fs::File>,
}

impl FileSink {
    pub async fn open(
        path: impl AsRef<Path>,
        format: Option<OutputFormat>,
        status_filter: Option<HashSet<RuleStatus>>,
    ) -> Result<Self, SinkError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let format = format.unwrap_or_else(|| OutputFormat::infer_from_path(&path));

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SinkError::Io(e.to_string()))?;
            }
        }

        let file = tokio::fs::File::create(&path).await.map_err(|e| SinkError::Io(e.to_string()))?;
        Ok(Self { core: WriterCore::new(file, format, status_filter) })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError> {
        self.core.write(value).await
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.core.close().await
    }
}
