//! Where flushed batches go.

use std::future::Future;
use std::sync::Arc;

use crate::error::ClientError;
use crate::http::{RequestExecutor, RequestSpec};
use crate::queue::event::{EventBatch, QueuedEvent};

/// Remote destination for event batches.
///
/// `Ok` means the batch was acknowledged and may be forgotten.
pub trait EventSink: Send + Sync + 'static {
    fn submit(
        &self,
        batch: &[QueuedEvent],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Posts `{ "events": [...] }` to a batch endpoint.
#[derive(Debug, Clone)]
pub struct HttpEventSink {
    executor: Arc<RequestExecutor>,
    path: String,
}

impl HttpEventSink {
    pub fn new(executor: Arc<RequestExecutor>, path: impl Into<String>) -> Self {
        Self {
            executor,
            path: path.into(),
        }
    }
}

impl EventSink for HttpEventSink {
    async fn submit(&self, batch: &[QueuedEvent]) -> Result<(), ClientError> {
        let spec = RequestSpec::post(self.path.as_str()).json(&EventBatch { events: batch })?;
        self.executor.execute(&spec).await?;
        Ok(())
    }
}
