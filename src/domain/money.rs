use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact money amount. All arithmetic stays in decimal; formatting to a
/// display string only happens at the presentation boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Builds an amount from integer minor units, e.g. `from_cents(2500)` is 25.00.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `None` when the result falls outside the decimal range.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Clamps at the largest representable amount instead of overflowing.
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Formats with a currency symbol, e.g. `R$ 25.00`.
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{} {}", symbol, self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self.0.round_dp(2);
        rounded.rescale(2);
        write!(f, "{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_exact() {
        // 0.10 summed ten times drifts in f64; it must not here.
        let total = Money::checked_sum(std::iter::repeat(Money::from_cents(10)).take(10)).unwrap();
        assert_eq!(total, Money::from_cents(100));
        assert_eq!(total.to_string(), "1.00");
    }

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Money::new(Decimal::from(25)).to_string(), "25.00");
        assert_eq!(Money::from_cents(505).display_with("R$"), "R$ 5.05");
    }

    #[test]
    fn test_multiply_by_quantity() {
        assert_eq!(Money::from_cents(1000).checked_mul(2), Some(Money::from_cents(2000)));
        assert_eq!(Money::from_cents(999).checked_mul(0), Some(Money::ZERO));
    }

    #[test]
    fn test_overflow_is_reported_not_raised() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(max.checked_add(Money::from_cents(100)), None);
        assert_eq!(Money::checked_sum([max, max]), None);
        assert_eq!(max.saturating_add(max), max);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::from_cents(-1).is_negative());
    }
}
