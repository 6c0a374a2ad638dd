//! The `Sink` capability (SPEC_FULL.md §4.7): `async fn write`/`async fn
//! close`, each concrete sink owning its own `tokio::sync::Mutex` around its
//! writer/buffer so writes are serialized per sink (spec.md §5: "every sink
//! must be goroutine-safe via its own lock").

use crate::error::SinkError;
use crate::output_value::OutputValue;
use async_trait::async_trait;

#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, value: &OutputValue) -> Result<(), SinkError>;

    async fn close(&self) -> Result<(), SinkError>;
}
