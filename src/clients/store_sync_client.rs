use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};
use crate::error::PipelineError;
use crate::messages::SyncRequest;
use crate::store::StoreEvent;

/// Handle to the store sync worker. The queue is unbounded, so recording
/// never waits on the store, however slow it is.
#[derive(Clone)]
pub struct StoreSyncClient {
    sender: mpsc::UnboundedSender<SyncRequest>,
}

impl StoreSyncClient {
    pub fn new(sender: mpsc::UnboundedSender<SyncRequest>) -> Self {
        Self { sender }
    }

    #[instrument(fields(order_id = %event.order_id(), event = event.kind()), skip(self, event))]
    pub fn record(&self, event: StoreEvent) -> Result<(), PipelineError> {
        debug!("Queueing store event");
        self.sender
            .send(SyncRequest::Record(event))
            .map_err(|_| PipelineError::ActorCommunicationError("Store sync closed".to_string()))
    }

    /// Waits until every event queued so far has been handled.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<(), PipelineError> {
        debug!("Sending flush request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SyncRequest::Flush { respond_to })
            .map_err(|_| PipelineError::ActorCommunicationError("Store sync closed".to_string()))?;
        response
            .await
            .map_err(|_| PipelineError::ActorCommunicationError("Store sync dropped".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), PipelineError> {
        debug!("Sending shutdown request");
        self.sender
            .send(SyncRequest::Shutdown)
            .map_err(|e| PipelineError::ActorCommunicationError(e.to_string()))?;
        Ok(())
    }
}
