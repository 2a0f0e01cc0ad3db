use super::principal::Principal;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// A contest users pay an entry fee to join.
///
/// Participants are kept in join order and never contain the same principal
/// twice.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Contest {
    pub id: u64,
    pub name: String,
    /// Entry fee in cents.
    pub entry_fee: u64,
    /// Prize pool in cents. Informational until an admin awards prizes.
    pub prize_pool: u64,
    pub participants: Vec<Principal>,
}

impl Contest {
    pub fn new(id: u64, name: String, entry_fee: u64, prize_pool: u64) -> Self {
        Self {
            id,
            name,
            entry_fee,
            prize_pool,
            participants: Vec::new(),
        }
    }

    pub fn has_participant(&self, user: &Principal) -> bool {
        self.participants.contains(user)
    }

    /// Appends a participant, rejecting duplicates.
    pub fn add_participant(&mut self, user: Principal) -> Result<()> {
        if self.has_participant(&user) {
            return Err(LedgerError::AlreadyJoined(self.id));
        }
        self.participants.push(user);
        Ok(())
    }
}
