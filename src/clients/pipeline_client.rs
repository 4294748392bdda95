use tokio::sync::mpsc;
use tracing::{debug, instrument};
use crate::domain::{Order, OrderDraft, OrderId};
use crate::error::PipelineError;
use crate::messages::PipelineRequest;
use crate::pipeline::{BoardSnapshot, StagePartitions};
use crate::policy::{ActionDescriptor, ActionKind};

/// Command and query surface of the order board. This is all a presentation
/// layer gets; it never touches the live collection directly.
#[derive(Clone)]
pub struct PipelineClient {
    sender: mpsc::Sender<PipelineRequest>,
}

impl PipelineClient {
    pub fn new(sender: mpsc::Sender<PipelineRequest>) -> Self {
        Self { sender }
    }

    pub async fn accept_order(&self, id: OrderId) -> Result<Order, PipelineError> {
        self.apply_action(id, ActionKind::Accept).await
    }

    pub async fn advance_order(&self, id: OrderId) -> Result<Order, PipelineError> {
        self.apply_action(id, ActionKind::Advance).await
    }

    /// Returns the delivered order's final record.
    pub async fn finalize_order(&self, id: OrderId) -> Result<Order, PipelineError> {
        self.apply_action(id, ActionKind::Finalize).await
    }

    /// Fails with `NotFound` when the order is already gone.
    pub async fn reject_order(&self, id: OrderId) -> Result<Order, PipelineError> {
        self.apply_action(id, ActionKind::Reject).await
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), PipelineError> {
        debug!("Sending shutdown request");
        self.sender
            .send(PipelineRequest::Shutdown)
            .await
            .map_err(|e| PipelineError::ActorCommunicationError(e.to_string()))?;
        Ok(())
    }
}

client_method!(PipelineClient => fn create_order(draft: OrderDraft) -> OrderId as PipelineRequest::CreateOrder);
client_method!(PipelineClient => fn apply_action(id: OrderId, action: ActionKind) -> Order as PipelineRequest::ApplyAction);
client_method!(PipelineClient => fn get_order(id: OrderId) -> Option<Order> as PipelineRequest::GetOrder);
client_method!(PipelineClient => fn actions_for_order(id: OrderId) -> Vec<ActionDescriptor> as PipelineRequest::ActionsForOrder);
client_method!(PipelineClient => fn partition_by_stage() -> StagePartitions as PipelineRequest::PartitionByStage);
client_method!(PipelineClient => fn board() -> BoardSnapshot as PipelineRequest::Board);

// Test-only method for internal state inspection
#[cfg(test)]
client_method!(PipelineClient => fn get_order_count() -> usize as PipelineRequest::GetOrderCount);
