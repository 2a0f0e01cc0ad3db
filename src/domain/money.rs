use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative wallet balance in minor currency units (cents).
///
/// Arithmetic is checked: credits that would overflow and debits that would
/// go below zero are rejected instead of wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(u64);

/// A strictly positive amount of money in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(cents: u64) -> Result<Self> {
        if cents > 0 {
            Ok(Self(cents))
        } else {
            Err(LedgerError::InvalidInput(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn cents(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = LedgerError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn checked_credit(self, cents: u64) -> Result<Self> {
        self.0
            .checked_add(cents)
            .map(Self)
            .ok_or_else(|| LedgerError::Overflow(format!("crediting {} to {}", cents, self.0)))
    }

    pub fn checked_debit(self, cents: u64) -> Result<Self> {
        self.0
            .checked_sub(cents)
            .map(Self)
            .ok_or(LedgerError::InsufficientFunds {
                required: cents,
                available: self.0,
            })
    }

    /// The balance in whole currency units, always with two decimal places.
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(Amount::new(0), Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_amount_deserialization_rejects_zero() {
        let parsed: std::result::Result<Amount, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
        let parsed: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(parsed.cents(), 250);
    }

    #[test]
    fn test_balance_credit_and_debit() {
        let balance = Balance::ZERO.checked_credit(500).unwrap();
        assert_eq!(balance.cents(), 500);
        let balance = balance.checked_debit(500).unwrap();
        assert_eq!(balance, Balance::ZERO);
    }

    #[test]
    fn test_balance_debit_insufficient() {
        let result = Balance::from_cents(100).checked_debit(101);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                required: 101,
                available: 100
            })
        ));
    }

    #[test]
    fn test_balance_credit_overflow() {
        let result = Balance::from_cents(u64::MAX).checked_credit(1);
        assert!(matches!(result, Err(LedgerError::Overflow(_))));
    }

    #[test]
    fn test_balance_display() {
        assert_eq!(Balance::from_cents(12345).to_decimal(), dec!(123.45));
        assert_eq!(Balance::from_cents(500).to_string(), "5.00");
        assert_eq!(Balance::ZERO.to_string(), "0.00");
    }
}
