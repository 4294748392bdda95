use serde::Serialize;
use crate::domain::{Money, Order, Stage};
use crate::pipeline::StagePartitions;

/// Count and value of one stage. Always derived from the partition it
/// describes, never kept as a running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageAggregate {
    pub count: usize,
    pub total_value: Money,
}

/// Order totals are capped at [`MAX_ORDER_TOTAL`](crate::domain::MAX_ORDER_TOTAL),
/// so the saturating sum never clamps for any collection that fits in memory.
pub fn aggregate_for(orders: &[Order]) -> StageAggregate {
    StageAggregate {
        count: orders.len(),
        total_value: orders
            .iter()
            .map(Order::total_value)
            .fold(Money::ZERO, Money::saturating_add),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageColumn {
    pub stage: Stage,
    pub title: &'static str,
    pub orders: Vec<Order>,
    pub aggregate: StageAggregate,
}

/// Everything a board renderer needs: one column per stage, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub columns: Vec<StageColumn>,
}

impl BoardSnapshot {
    pub fn from_partitions(partitions: StagePartitions) -> Self {
        let StagePartitions {
            under_review,
            preparing,
            out_for_delivery,
        } = partitions;

        let columns = [
            (Stage::UnderReview, under_review),
            (Stage::Preparing, preparing),
            (Stage::OutForDelivery, out_for_delivery),
        ]
        .into_iter()
        .map(|(stage, orders)| StageColumn {
            stage,
            title: stage.title(),
            aggregate: aggregate_for(&orders),
            orders,
        })
        .collect();

        Self { columns }
    }

    pub fn column(&self, stage: Stage) -> Option<&StageColumn> {
        self.columns.iter().find(|column| column.stage == stage)
    }

    pub fn aggregate(&self, stage: Stage) -> StageAggregate {
        self.column(stage)
            .map(|column| column.aggregate)
            .unwrap_or(StageAggregate {
                count: 0,
                total_value: Money::ZERO,
            })
    }
}
