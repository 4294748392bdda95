use tokio::sync::oneshot;
use crate::domain::{Order, OrderDraft, OrderId};
use crate::error::PipelineError;
use crate::pipeline::{BoardSnapshot, StagePartitions};
use crate::policy::{ActionDescriptor, ActionKind};
use crate::store::StoreEvent;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests served by the pipeline service. Every variant except `Shutdown`
/// carries the oneshot the caller waits on.
#[derive(Debug)]
pub enum PipelineRequest {
    CreateOrder {
        draft: OrderDraft,
        respond_to: ServiceResponse<OrderId, PipelineError>,
    },
    /// Accept, advance, finalize and reject all travel as an action.
    ApplyAction {
        id: OrderId,
        action: ActionKind,
        respond_to: ServiceResponse<Order, PipelineError>,
    },
    GetOrder {
        id: OrderId,
        respond_to: ServiceResponse<Option<Order>, PipelineError>,
    },
    ActionsForOrder {
        id: OrderId,
        respond_to: ServiceResponse<Vec<ActionDescriptor>, PipelineError>,
    },
    PartitionByStage {
        respond_to: ServiceResponse<StagePartitions, PipelineError>,
    },
    Board {
        respond_to: ServiceResponse<BoardSnapshot, PipelineError>,
    },
    Shutdown,
    #[cfg(test)]
    GetOrderCount {
        respond_to: ServiceResponse<usize, PipelineError>,
    },
}

/// Work for the store sync worker, handled strictly in arrival order.
#[derive(Debug)]
pub enum SyncRequest {
    Record(StoreEvent),
    /// Answers once every event queued before it has been handled.
    Flush {
        respond_to: oneshot::Sender<()>,
    },
    Shutdown,
}
