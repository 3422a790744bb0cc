// Time-series sink: one batch per collection cycle.

use crate::error::SinkError;
use crate::models::Batch;

#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn write_batch(&self, batch: &Batch) -> Result<(), SinkError>;
}
