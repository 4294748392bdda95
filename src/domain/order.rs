use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::{LineItem, Money};
use crate::error::PipelineError;

/// Largest total a single order may carry. Keeps any sum over the live
/// collection far inside the decimal range.
pub const MAX_ORDER_TOTAL: Money = Money::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

/// Opaque order identifier, unique across the live collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Operational stage of a live order. Terminal outcomes are not stages: an
/// order that reaches one leaves the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Stage {
    UnderReview,
    Preparing,
    OutForDelivery,
}

impl Stage {
    /// Board column order.
    pub const ALL: [Stage; 3] = [Stage::UnderReview, Stage::Preparing, Stage::OutForDelivery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::UnderReview => "under_review",
            Stage::Preparing => "preparing",
            Stage::OutForDelivery => "out_for_delivery",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::UnderReview => "Under review",
            Stage::Preparing => "Preparing",
            Stage::OutForDelivery => "Out for delivery",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "under_review" => Ok(Stage::UnderReview),
            "preparing" => Ok(Stage::Preparing),
            "out_for_delivery" => Ok(Stage::OutForDelivery),
            other => Err(PipelineError::InvalidOrder(format!("unknown stage: {}", other))),
        }
    }
}

impl TryFrom<String> for Stage {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How an order left the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Delivered,
    Rejected,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Delivered => f.write_str("delivered"),
            Outcome::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PaymentMethod {
    Cash,
    Pix,
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Pix => f.write_str("pix"),
            PaymentMethod::Card => f.write_str("card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "card" => Ok(PaymentMethod::Card),
            other => Err(PipelineError::InvalidOrder(format!(
                "unknown payment method: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Payload for creating a new order, as handed over by order intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    pub line_items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
}

impl OrderDraft {
    pub fn new(payment_method: PaymentMethod) -> Self {
        Self {
            customer_name: None,
            delivery_address: None,
            line_items: Vec::new(),
            payment_method,
        }
    }

    pub fn customer(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn deliver_to(mut self, address: impl Into<String>) -> Self {
        self.delivery_address = Some(address.into());
        self
    }

    pub fn item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.line_items.is_empty() {
            return Err(PipelineError::InvalidOrder(
                "an order needs at least one line item".to_string(),
            ));
        }
        self.line_items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| item.validate(index + 1))
    }
}

/// A live order on the board.
///
/// Fields are read-only outside the crate; stage changes go through
/// [`crate::pipeline::OrderPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    id: OrderId,
    display_number: u64,
    created_at_label: String,
    customer_name: Option<String>,
    delivery_address: Option<String>,
    line_items: Vec<LineItem>,
    total_value: Money,
    stage: Stage,
    payment_method: PaymentMethod,
    /// Epoch millis of the most recent stage change. Board sort key.
    last_transition_at: Option<i64>,
    /// Epoch millis of acceptance. Never overwritten.
    accepted_at: Option<i64>,
}

impl Order {
    /// Validates the draft and builds a record in `UnderReview`. The total is
    /// computed here once and never recomputed.
    pub(crate) fn from_draft(
        id: OrderId,
        display_number: u64,
        created_at_label: String,
        draft: OrderDraft,
    ) -> Result<Self, PipelineError> {
        draft.validate()?;

        let line_totals = draft
            .line_items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let total_value = Money::checked_sum(line_totals)
            .filter(|total| *total <= MAX_ORDER_TOTAL)
            .ok_or_else(|| {
                PipelineError::InvalidOrder(format!("order total exceeds {}", MAX_ORDER_TOTAL))
            })?;

        Ok(Self {
            id,
            display_number,
            created_at_label,
            customer_name: draft.customer_name.filter(|name| !name.trim().is_empty()),
            delivery_address: draft.delivery_address.filter(|addr| !addr.trim().is_empty()),
            line_items: draft.line_items,
            total_value,
            stage: Stage::UnderReview,
            payment_method: draft.payment_method,
            last_transition_at: None,
            accepted_at: None,
        })
    }

    pub(crate) fn enter_stage(&mut self, stage: Stage, at: i64) {
        self.stage = stage;
        self.last_transition_at = Some(at);
        // Orders only leave review through acceptance, so the first stamp is it.
        if self.accepted_at.is_none() {
            self.accepted_at = Some(at);
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn display_number(&self) -> u64 {
        self.display_number
    }

    /// Human-facing code, e.g. `#0042`.
    pub fn display_code(&self) -> String {
        format!("#{:04}", self.display_number)
    }

    pub fn created_at_label(&self) -> &str {
        &self.created_at_label
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn customer_label(&self) -> &str {
        self.customer_name().unwrap_or("customer not provided")
    }

    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total_value(&self) -> Money {
        self.total_value
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn last_transition_at(&self) -> Option<i64> {
        self.last_transition_at
    }

    pub fn accepted_at(&self) -> Option<i64> {
        self.accepted_at
    }
}
