//! In-process order store. Keeps closed orders as history, which makes it
//! usable as the archive for a single console session and as a test double.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use crate::domain::{Order, OrderId, Outcome, Stage};
use crate::store::{OrderStore, StoreError};

/// What the store knows about one order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub durable_id: String,
    pub order: Order,
    pub stage: Stage,
    pub last_transition_at: Option<i64>,
    pub outcome: Option<Outcome>,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    records: Arc<RwLock<HashMap<OrderId, StoredOrder>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub async fn get(&self, id: &OrderId) -> Option<StoredOrder> {
        self.records.read().await.get(id).cloned()
    }

    /// Orders that reached a terminal outcome.
    pub async fn history(&self) -> Vec<StoredOrder> {
        let mut closed: Vec<StoredOrder> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.outcome.is_some())
            .cloned()
            .collect();
        closed.sort_by_key(|record| record.order.display_number());
        closed
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<String, StoreError> {
        let durable_id = format!("store_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = StoredOrder {
            durable_id: durable_id.clone(),
            order: order.clone(),
            stage: order.stage(),
            last_transition_at: order.last_transition_at(),
            outcome: None,
        };
        self.records.write().await.insert(order.id().clone(), record);
        debug!(order_id = %order.id(), durable_id = %durable_id, "Order stored");
        Ok(durable_id)
    }

    async fn update_stage(&self, id: &OrderId, stage: Stage, at: i64) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.stage = stage;
        record.last_transition_at = Some(at);
        Ok(())
    }

    async fn close(&self, id: &OrderId, outcome: Outcome) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.outcome = Some(outcome);
        Ok(())
    }
}
