//! Order persistence collaborator.
//!
//! Every pipeline command produces a [`StoreEvent`]; the store sync worker
//! replays them in command order against an [`OrderStore`].

pub mod memory;

pub use memory::*;

use async_trait::async_trait;
use thiserror::Error;
use crate::domain::{Order, OrderId, Outcome, Stage};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Order not found in store: {0}")]
    NotFound(OrderId),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Saves a newly created order and returns the store's durable id for it.
    async fn insert(&self, order: &Order) -> Result<String, StoreError>;

    async fn update_stage(&self, id: &OrderId, stage: Stage, at: i64) -> Result<(), StoreError>;

    /// Records the terminal outcome of an order that left the board.
    async fn close(&self, id: &OrderId, outcome: Outcome) -> Result<(), StoreError>;
}

/// A committed pipeline change waiting to be persisted.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Created(Order),
    StageChanged {
        id: OrderId,
        display_code: String,
        stage: Stage,
        at: i64,
    },
    Closed {
        id: OrderId,
        display_code: String,
        outcome: Outcome,
    },
}

impl StoreEvent {
    pub fn order_id(&self) -> &OrderId {
        match self {
            StoreEvent::Created(order) => order.id(),
            StoreEvent::StageChanged { id, .. } | StoreEvent::Closed { id, .. } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::Created(_) => "created",
            StoreEvent::StageChanged { .. } => "stage_changed",
            StoreEvent::Closed { .. } => "closed",
        }
    }

    /// Operator-facing description, used in failure notifications.
    pub fn describe(&self) -> String {
        match self {
            StoreEvent::Created(order) => format!("new order {}", order.display_code()),
            StoreEvent::StageChanged { display_code, stage, .. } => {
                format!("order {} moving to {}", display_code, stage.title().to_lowercase())
            }
            StoreEvent::Closed { display_code, outcome, .. } => {
                format!("order {} as {}", display_code, outcome)
            }
        }
    }

    /// Applies the event. Returns the durable id when the event created a record.
    pub async fn apply_to(&self, store: &dyn OrderStore) -> Result<Option<String>, StoreError> {
        match self {
            StoreEvent::Created(order) => store.insert(order).await.map(Some),
            StoreEvent::StageChanged { id, stage, at, .. } => {
                store.update_stage(id, *stage, *at).await.map(|_| None)
            }
            StoreEvent::Closed { id, outcome, .. } => store.close(id, *outcome).await.map(|_| None),
        }
    }
}
