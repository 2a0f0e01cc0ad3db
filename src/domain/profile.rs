use super::money::Balance;
use super::principal::Principal;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A registered user and their spendable wallet balance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UserProfile {
    pub owner: Principal,
    pub name: String,
    pub balance: Balance,
}

impl UserProfile {
    pub fn new(owner: Principal, name: String) -> Self {
        Self {
            owner,
            name,
            balance: Balance::ZERO,
        }
    }

    /// Adds funds to the balance.
    pub fn credit(&mut self, cents: u64) -> Result<()> {
        self.balance = self.balance.checked_credit(cents)?;
        Ok(())
    }

    /// Removes funds if the balance covers them; the balance is untouched on
    /// failure.
    pub fn debit(&mut self, cents: u64) -> Result<()> {
        self.balance = self.balance.checked_debit(cents)?;
        Ok(())
    }
}
