use std::cmp::Ordering;
use std::collections::HashMap;
use serde::Serialize;
use tracing::debug;
use crate::domain::{Order, OrderDraft, OrderId, Stage};
use crate::error::PipelineError;
use crate::pipeline::clock::{time_label, Clock, SystemClock};
use crate::policy::{self, ActionDescriptor, ActionKind, Transition};

/// The live collection, split by stage and sorted for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StagePartitions {
    pub under_review: Vec<Order>,
    pub preparing: Vec<Order>,
    pub out_for_delivery: Vec<Order>,
}

impl StagePartitions {
    pub fn get(&self, stage: Stage) -> &[Order] {
        match stage {
            Stage::UnderReview => &self.under_review,
            Stage::Preparing => &self.preparing,
            Stage::OutForDelivery => &self.out_for_delivery,
        }
    }

    fn get_mut(&mut self, stage: Stage) -> &mut Vec<Order> {
        match stage {
            Stage::UnderReview => &mut self.under_review,
            Stage::Preparing => &mut self.preparing,
            Stage::OutForDelivery => &mut self.out_for_delivery,
        }
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        Stage::ALL
            .iter()
            .any(|stage| self.get(*stage).iter().any(|order| order.id() == id))
    }

    pub fn len(&self) -> usize {
        Stage::ALL.iter().map(|stage| self.get(*stage).len()).sum()
    }
}

/// Owner of the live order collection.
///
/// Every mutation goes through a command here; each command either applies
/// completely or returns an error and changes nothing.
pub struct OrderPipeline {
    orders: HashMap<OrderId, Order>,
    next_display_number: u64,
    last_stamp: Option<i64>,
    clock: Box<dyn Clock>,
    next_id_fn: Box<dyn Fn() -> OrderId + Send + Sync>,
}

impl Default for OrderPipeline {
    fn default() -> Self {
        Self::new(SystemClock, OrderId::generate)
    }
}

impl OrderPipeline {
    pub fn new(
        clock: impl Clock + 'static,
        next_id_fn: impl Fn() -> OrderId + Send + Sync + 'static,
    ) -> Self {
        Self {
            orders: HashMap::new(),
            next_display_number: 1,
            last_stamp: None,
            clock: Box::new(clock),
            next_id_fn: Box::new(next_id_fn),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    pub fn create(&mut self, draft: OrderDraft) -> Result<OrderId, PipelineError> {
        let id = (self.next_id_fn)();
        if self.orders.contains_key(&id) {
            return Err(PipelineError::InvalidOrder(format!("duplicate order id {}", id)));
        }

        let label = time_label(self.clock.now_millis());
        let order = Order::from_draft(id.clone(), self.next_display_number, label, draft)?;
        self.next_display_number += 1;

        debug!(order_id = %id, display_number = order.display_number(), "Order inserted");
        self.orders.insert(id.clone(), order);
        Ok(id)
    }

    pub fn accept(&mut self, id: &OrderId) -> Result<Order, PipelineError> {
        self.move_forward(id, ActionKind::Accept)
    }

    /// Overwrites `last_transition_at`; `accepted_at` keeps the acceptance time.
    pub fn advance(&mut self, id: &OrderId) -> Result<Order, PipelineError> {
        self.move_forward(id, ActionKind::Advance)
    }

    /// Removes a delivered order and hands back its final record.
    pub fn finalize(&mut self, id: &OrderId) -> Result<Order, PipelineError> {
        self.require(id, ActionKind::Finalize)?;
        self.remove(id, ActionKind::Finalize)
    }

    /// Valid from every live stage. Unknown ids are `NotFound`, not
    /// `InvalidTransition`.
    pub fn reject(&mut self, id: &OrderId) -> Result<Order, PipelineError> {
        if !self.orders.contains_key(id) {
            return Err(PipelineError::NotFound(id.clone()));
        }
        self.require(id, ActionKind::Reject)?;
        self.remove(id, ActionKind::Reject)
    }

    /// Runs the command matching an action descriptor's kind.
    pub fn apply(&mut self, id: &OrderId, kind: ActionKind) -> Result<Order, PipelineError> {
        match kind {
            ActionKind::Accept => self.accept(id),
            ActionKind::Advance => self.advance(id),
            ActionKind::Finalize => self.finalize(id),
            ActionKind::Reject => self.reject(id),
        }
    }

    fn require(&self, id: &OrderId, action: ActionKind) -> Result<Stage, PipelineError> {
        let stage = self.orders.get(id).map(Order::stage);
        match stage {
            Some(current) if policy::permits(current, action) => Ok(current),
            _ => Err(PipelineError::InvalidTransition {
                id: id.clone(),
                stage,
                action,
            }),
        }
    }

    fn move_forward(&mut self, id: &OrderId, action: ActionKind) -> Result<Order, PipelineError> {
        let from = self.require(id, action)?;
        let Transition::MoveTo(target) = action.transition() else {
            return Err(PipelineError::InvalidTransition {
                id: id.clone(),
                stage: Some(from),
                action,
            });
        };

        let at = self.next_stamp();
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| PipelineError::InvalidTransition {
                id: id.clone(),
                stage: None,
                action,
            })?;
        order.enter_stage(target, at);

        debug!(order_id = %id, from = %from, to = %target, at, "Order moved");
        Ok(order.clone())
    }

    fn remove(&mut self, id: &OrderId, action: ActionKind) -> Result<Order, PipelineError> {
        let order = self
            .orders
            .remove(id)
            .ok_or_else(|| PipelineError::NotFound(id.clone()))?;
        debug!(order_id = %id, action = %action, "Order removed from board");
        Ok(order)
    }

    /// Stamps handed out by one pipeline strictly increase, so the
    /// most-recent-first sort has no ties between transitions.
    fn next_stamp(&mut self) -> i64 {
        let now = self.clock.now_millis();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Actions the order currently offers, or `None` if it is not live.
    pub fn actions_for_order(&self, id: &OrderId) -> Option<&'static [ActionDescriptor]> {
        self.orders.get(id).map(|order| policy::actions_for(order.stage()))
    }

    /// Review is first-in-first-out; the other stages show the most recently
    /// moved order first.
    pub fn partition_by_stage(&self) -> StagePartitions {
        let mut partitions = StagePartitions::default();
        for order in self.orders.values() {
            partitions.get_mut(order.stage()).push(order.clone());
        }

        partitions.under_review.sort_by(by_arrival);
        partitions.preparing.sort_by(by_latest_transition);
        partitions.out_for_delivery.sort_by(by_latest_transition);
        partitions
    }
}

fn by_arrival(a: &Order, b: &Order) -> Ordering {
    a.display_number().cmp(&b.display_number())
}

/// Descending by `last_transition_at`; unstamped orders go last.
fn by_latest_transition(a: &Order, b: &Order) -> Ordering {
    match (a.last_transition_at(), b.last_transition_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| by_arrival(a, b))
}
