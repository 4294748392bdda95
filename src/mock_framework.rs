//! # Mock Framework
//!
//! Utilities for testing the pipeline client in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers
//! like [`expect_create`] or [`expect_action`] to assert what the client sent
//! and answer on its behalf.

use tokio::sync::{mpsc, oneshot};
use crate::clients::PipelineClient;
use crate::domain::{Order, OrderDraft, OrderId};
use crate::error::PipelineError;
use crate::messages::PipelineRequest;
use crate::pipeline::BoardSnapshot;
use crate::policy::ActionKind;

/// Creates a client whose requests land on `receiver` instead of a running
/// `PipelineService`, so the test plays the service deterministically.
pub fn create_mock_client(buffer_size: usize) -> (PipelineClient, mpsc::Receiver<PipelineRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (PipelineClient::new(sender), receiver)
}

/// Helper to verify that the next message is a CreateOrder request
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<PipelineRequest>,
) -> Option<(OrderDraft, oneshot::Sender<Result<OrderId, PipelineError>>)> {
    match receiver.recv().await {
        Some(PipelineRequest::CreateOrder { draft, respond_to }) => Some((draft, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an ApplyAction request
pub async fn expect_action(
    receiver: &mut mpsc::Receiver<PipelineRequest>,
) -> Option<(OrderId, ActionKind, oneshot::Sender<Result<Order, PipelineError>>)> {
    match receiver.recv().await {
        Some(PipelineRequest::ApplyAction { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Board request
pub async fn expect_board(
    receiver: &mut mpsc::Receiver<PipelineRequest>,
) -> Option<oneshot::Sender<Result<BoardSnapshot, PipelineError>>> {
    match receiver.recv().await {
        Some(PipelineRequest::Board { respond_to }) => Some(respond_to),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, Money, PaymentMethod, Stage};
    use crate::pipeline::{OrderPipeline, StagePartitions};
    use crate::pipeline::clock::ManualClock;

    fn draft() -> OrderDraft {
        OrderDraft::new(PaymentMethod::Pix).item(LineItem::new("Pão de queijo", 6, Money::from_cents(250)))
    }

    #[tokio::test]
    async fn test_create_passes_draft_through() {
        let (client, mut receiver) = create_mock_client(10);

        let create_task = tokio::spawn(async move { client.create_order(draft()).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected CreateOrder request");
        assert_eq!(payload.line_items.len(), 1);
        assert_eq!(payload.payment_method, PaymentMethod::Pix);
        responder.send(Ok(OrderId::from("order_1"))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(OrderId::from("order_1")));
    }

    #[tokio::test]
    async fn test_named_commands_map_to_actions() {
        let (client, mut receiver) = create_mock_client(10);
        let mut pipeline = OrderPipeline::new(ManualClock::at(0), || OrderId::from("order_1"));
        let id = pipeline.create(draft()).unwrap();

        let expected = [
            ActionKind::Accept,
            ActionKind::Advance,
            ActionKind::Finalize,
            ActionKind::Reject,
        ];

        let task_client = client.clone();
        let task_id = id.clone();
        let commands = tokio::spawn(async move {
            let _ = task_client.accept_order(task_id.clone()).await;
            let _ = task_client.advance_order(task_id.clone()).await;
            let _ = task_client.finalize_order(task_id.clone()).await;
            task_client.reject_order(task_id).await
        });

        for kind in expected {
            let (sent_id, action, responder) = expect_action(&mut receiver).await.expect("Expected ApplyAction request");
            assert_eq!(sent_id, id);
            assert_eq!(action, kind);
            if kind == ActionKind::Reject {
                responder.send(Err(PipelineError::NotFound(sent_id))).unwrap();
            } else {
                responder.send(pipeline.apply(&sent_id, action)).unwrap();
            }
        }

        let last = commands.await.unwrap();
        assert_eq!(last, Err(PipelineError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_communication_error() {
        let (client, mut receiver) = create_mock_client(10);

        let board_task = tokio::spawn(async move { client.board().await });

        let responder = expect_board(&mut receiver).await.expect("Expected Board request");
        drop(responder);

        let result = board_task.await.unwrap();
        assert!(matches!(result, Err(PipelineError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_closed_service_is_communication_error() {
        let (client, receiver) = create_mock_client(10);
        drop(receiver);

        let result = client.get_order(OrderId::from("order_1")).await;
        assert!(matches!(result, Err(PipelineError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_board_answer_is_returned_untouched() {
        let (client, mut receiver) = create_mock_client(10);
        let board_task = tokio::spawn(async move { client.board().await });

        let responder = expect_board(&mut receiver).await.expect("Expected Board request");
        let empty = BoardSnapshot::from_partitions(StagePartitions::default());
        responder.send(Ok(empty.clone())).unwrap();

        let board = board_task.await.unwrap().unwrap();
        assert_eq!(board, empty);
        assert_eq!(board.aggregate(Stage::OutForDelivery).count, 0);
    }
}
