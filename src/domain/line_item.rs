use serde::{Deserialize, Serialize};
use crate::domain::Money;
use crate::error::PipelineError;

/// An extra attached to a line item (sauce, side, topping). Applied per unit
/// of the item it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl Modifier {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }
}

/// One dish on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// `quantity × (unit_price + Σ modifier.quantity × modifier.unit_price)`.
    /// Fails with `InvalidOrder` when the amount leaves the decimal range.
    pub fn line_total(&self) -> Result<Money, PipelineError> {
        let per_unit = self
            .modifiers
            .iter()
            .try_fold(self.unit_price, |total, m| {
                m.unit_price.checked_mul(m.quantity).and_then(|extra| total.checked_add(extra))
            })
            .and_then(|per_unit| per_unit.checked_mul(self.quantity));

        per_unit.ok_or_else(|| {
            PipelineError::InvalidOrder(format!("line {} has an amount out of range", self.name))
        })
    }

    /// Checks the item against the order record invariants. `position` is
    /// 1-based and only used in the error message.
    pub(crate) fn validate(&self, position: usize) -> Result<(), PipelineError> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::InvalidOrder(format!(
                "line {} has no name",
                position
            )));
        }
        if self.quantity == 0 {
            return Err(PipelineError::InvalidOrder(format!(
                "line {} ({}) must have a quantity of at least 1",
                position, self.name
            )));
        }
        if !self.unit_price.is_positive() {
            return Err(PipelineError::InvalidOrder(format!(
                "line {} ({}) has non-positive unit price {}",
                position, self.name, self.unit_price
            )));
        }

        for modifier in &self.modifiers {
            if modifier.name.trim().is_empty() {
                return Err(PipelineError::InvalidOrder(format!(
                    "line {} ({}) has a modifier without a name",
                    position, self.name
                )));
            }
            if modifier.quantity == 0 {
                return Err(PipelineError::InvalidOrder(format!(
                    "modifier {} on line {} must have a quantity of at least 1",
                    modifier.name, position
                )));
            }
            // Free extras are fine, negative ones are not.
            if modifier.unit_price.is_negative() {
                return Err(PipelineError::InvalidOrder(format!(
                    "modifier {} on line {} has negative unit price {}",
                    modifier.name, position, modifier.unit_price
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_without_modifiers() {
        let item = LineItem::new("Feijoada", 2, Money::from_cents(1000));
        assert_eq!(item.line_total(), Ok(Money::from_cents(2000)));
    }

    #[test]
    fn test_modifiers_apply_per_unit() {
        let item = LineItem::new("Burger", 2, Money::from_cents(2000))
            .with_modifier(Modifier::new("Bacon", 1, Money::from_cents(400)))
            .with_modifier(Modifier::new("Extra cheese", 2, Money::from_cents(150)));
        // 2 × (20.00 + 4.00 + 3.00)
        assert_eq!(item.line_total(), Ok(Money::from_cents(5400)));
    }

    #[test]
    fn test_line_total_overflow_is_invalid_order() {
        let item = LineItem::new("Banquete", 2, Money::new(rust_decimal::Decimal::MAX));
        assert!(item.validate(1).is_ok());
        assert!(matches!(item.line_total(), Err(PipelineError::InvalidOrder(_))));

        let topped = LineItem::new("Banquete", 1, Money::from_cents(100))
            .with_modifier(Modifier::new("Trufa", 3, Money::new(rust_decimal::Decimal::MAX)));
        assert!(matches!(topped.line_total(), Err(PipelineError::InvalidOrder(_))));
    }

    #[test]
    fn test_free_modifier_is_valid() {
        let item = LineItem::new("Pizza", 1, Money::from_cents(4500))
            .with_modifier(Modifier::new("Oregano", 1, Money::ZERO));
        assert!(item.validate(1).is_ok());
    }

    #[test]
    fn test_rejects_zero_quantity_and_price() {
        let zero_qty = LineItem::new("Pastel", 0, Money::from_cents(800));
        assert!(matches!(zero_qty.validate(1), Err(PipelineError::InvalidOrder(_))));

        let free = LineItem::new("Pastel", 1, Money::ZERO);
        assert!(matches!(free.validate(2), Err(PipelineError::InvalidOrder(msg)) if msg.contains("line 2")));
    }

    #[test]
    fn test_rejects_negative_modifier() {
        let item = LineItem::new("Acai", 1, Money::from_cents(1500))
            .with_modifier(Modifier::new("Discount", 1, Money::from_cents(-200)));
        assert!(matches!(item.validate(1), Err(PipelineError::InvalidOrder(_))));
    }
}
