use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use crate::clients::{PipelineClient, StoreSyncClient};
use crate::domain::{Order, OrderDraft, OrderId};
use crate::error::PipelineError;
use crate::messages::{PipelineRequest, ServiceResponse};
use crate::notify::{Notification, Notifier};
use crate::pipeline::{BoardSnapshot, OrderPipeline, StagePartitions};
use crate::policy::{ActionDescriptor, ActionKind, Transition};
use crate::store::StoreEvent;

/// Owns the [`OrderPipeline`] and serializes every command and query on it.
///
/// Each request runs to completion before the next one is read, so no caller
/// ever sees a half-applied transition. Follow-ups (notification, store sync)
/// are handed off before the reply; the service never waits on remote I/O.
pub struct PipelineService {
    receiver: mpsc::Receiver<PipelineRequest>,
    pipeline: OrderPipeline,
    notifier: Arc<dyn Notifier>,
    sync: StoreSyncClient,
}

impl PipelineService {
    pub fn new(
        buffer_size: usize,
        pipeline: OrderPipeline,
        notifier: Arc<dyn Notifier>,
        sync: StoreSyncClient,
    ) -> (Self, PipelineClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            pipeline,
            notifier,
            sync,
        };
        let client = PipelineClient::new(sender);
        (service, client)
    }

    #[instrument(name = "pipeline_service", skip(self))]
    pub async fn run(mut self) {
        info!("PipelineService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                PipelineRequest::CreateOrder { draft, respond_to } => {
                    self.handle_create_order(draft, respond_to);
                }
                PipelineRequest::ApplyAction { id, action, respond_to } => {
                    self.handle_apply_action(id, action, respond_to);
                }
                PipelineRequest::GetOrder { id, respond_to } => {
                    self.handle_get_order(id, respond_to);
                }
                PipelineRequest::ActionsForOrder { id, respond_to } => {
                    self.handle_actions_for_order(id, respond_to);
                }
                PipelineRequest::PartitionByStage { respond_to } => {
                    self.handle_partition_by_stage(respond_to);
                }
                PipelineRequest::Board { respond_to } => {
                    self.handle_board(respond_to);
                }
                PipelineRequest::Shutdown => {
                    info!("PipelineService shutting down");
                    break;
                }
                #[cfg(test)]
                PipelineRequest::GetOrderCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.pipeline.len()));
                }
            }
        }

        info!("PipelineService stopped");
    }

    #[instrument(
        fields(
            items = draft.line_items.len(),
            payment = %draft.payment_method
        ),
        skip(self, draft, respond_to)
    )]
    fn handle_create_order(
        &mut self,
        draft: OrderDraft,
        respond_to: ServiceResponse<OrderId, PipelineError>,
    ) {
        debug!("Processing create_order request");

        match self.pipeline.create(draft) {
            Ok(id) => {
                if let Some(order) = self.pipeline.get(&id).cloned() {
                    info!(
                        order_id = %id,
                        display_code = %order.display_code(),
                        total = %order.total_value(),
                        "Order received"
                    );
                    self.notifier.notify(Notification::success(format!(
                        "Order {} received and waiting for review",
                        order.display_code()
                    )));
                    self.record(StoreEvent::Created(order));
                }
                let _ = respond_to.send(Ok(id));
            }
            Err(e) => {
                warn!(error = %e, "Order refused");
                self.notifier.notify(Notification::failure(e.to_string()));
                let _ = respond_to.send(Err(e));
            }
        }
    }

    /// The stage policy check happens inside the pipeline. Notification and
    /// store event are queued before the reply so they follow command order.
    #[instrument(fields(order_id = %id, action = %action), skip(self, respond_to))]
    fn handle_apply_action(
        &mut self,
        id: OrderId,
        action: ActionKind,
        respond_to: ServiceResponse<Order, PipelineError>,
    ) {
        debug!("Processing apply_action request");

        match self.pipeline.apply(&id, action) {
            Ok(order) => {
                info!(
                    display_code = %order.display_code(),
                    stage = %order.stage(),
                    "Action applied"
                );
                self.notifier.notify(Notification::success(format!(
                    "Order {} {}",
                    order.display_code(),
                    action.success_message()
                )));
                self.record(store_event_for(action, &order));
                let _ = respond_to.send(Ok(order));
            }
            Err(e) => {
                warn!(error = %e, "Action refused");
                self.notifier.notify(Notification::failure(e.to_string()));
                let _ = respond_to.send(Err(e));
            }
        }
    }

    #[instrument(fields(order_id = %id), skip(self, respond_to))]
    fn handle_get_order(&self, id: OrderId, respond_to: ServiceResponse<Option<Order>, PipelineError>) {
        debug!("Processing get_order request");

        let order = self.pipeline.get(&id).cloned();

        match &order {
            Some(order) => debug!(stage = %order.stage(), "Order found"),
            None => debug!("Order not found"),
        }

        let _ = respond_to.send(Ok(order));
    }

    #[instrument(fields(order_id = %id), skip(self, respond_to))]
    fn handle_actions_for_order(
        &self,
        id: OrderId,
        respond_to: ServiceResponse<Vec<ActionDescriptor>, PipelineError>,
    ) {
        debug!("Processing actions_for_order request");

        let result = match self.pipeline.actions_for_order(&id) {
            Some(actions) => Ok(actions.to_vec()),
            None => Err(PipelineError::NotFound(id)),
        };

        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_partition_by_stage(&self, respond_to: ServiceResponse<StagePartitions, PipelineError>) {
        debug!("Processing partition_by_stage request");
        let _ = respond_to.send(Ok(self.pipeline.partition_by_stage()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_board(&self, respond_to: ServiceResponse<BoardSnapshot, PipelineError>) {
        debug!("Processing board request");

        let board = BoardSnapshot::from_partitions(self.pipeline.partition_by_stage());
        debug!(live_orders = self.pipeline.len(), "Board built");

        let _ = respond_to.send(Ok(board));
    }

    fn record(&self, event: StoreEvent) {
        if let Err(e) = self.sync.record(event) {
            error!(error = %e, "Store sync worker unavailable, change kept locally only");
        }
    }
}

fn store_event_for(action: ActionKind, order: &Order) -> StoreEvent {
    match action.transition() {
        Transition::MoveTo(stage) => StoreEvent::StageChanged {
            id: order.id().clone(),
            display_code: order.display_code(),
            stage,
            at: order.last_transition_at().unwrap_or_default(),
        },
        Transition::Close(outcome) => StoreEvent::Closed {
            id: order.id().clone(),
            display_code: order.display_code(),
            outcome,
        },
    }
}
