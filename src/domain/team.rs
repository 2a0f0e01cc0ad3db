use super::player::Player;
use super::principal::Principal;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_ROSTER_CAP: usize = 11;
/// $100 in cents.
pub const DEFAULT_BUDGET_CAP: u64 = 10_000;

/// A squad persisted on behalf of its owner. Immutable once created.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct FantasyTeam {
    pub id: u64,
    pub owner: Principal,
    pub player_ids: Vec<u64>,
}

/// Roster composition limits applied when a team is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadRules {
    pub roster_cap: usize,
    pub budget_cap: u64,
}

impl Default for SquadRules {
    fn default() -> Self {
        Self {
            roster_cap: DEFAULT_ROSTER_CAP,
            budget_cap: DEFAULT_BUDGET_CAP,
        }
    }
}

impl SquadRules {
    /// Shape checks that need no catalog access: non-empty, duplicate-free,
    /// within the roster cap.
    fn check_shape(&self, player_ids: &[u64]) -> Result<()> {
        if player_ids.is_empty() {
            return Err(LedgerError::InvalidInput(
                "A team needs at least one player".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(player_ids.len());
        if let Some(dup) = player_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(LedgerError::InvalidInput(format!(
                "Player {} selected more than once",
                dup
            )));
        }

        if player_ids.len() > self.roster_cap {
            return Err(LedgerError::InvalidInput(format!(
                "Team has {} players, maximum is {}",
                player_ids.len(),
                self.roster_cap
            )));
        }

        Ok(())
    }

    /// Resolves every id against the catalog snapshot and returns the total
    /// price when it fits the budget.
    fn check_cost(&self, player_ids: &[u64], catalog: &HashMap<u64, Player>) -> Result<u64> {
        let mut total: u64 = 0;
        for id in player_ids {
            let player = catalog.get(id).ok_or(LedgerError::UnknownPlayer(*id))?;
            // Saturation is enough here: any saturated total is over budget.
            total = total.saturating_add(player.price);
        }

        if total > self.budget_cap {
            return Err(LedgerError::BudgetExceeded {
                total,
                budget: self.budget_cap,
            });
        }

        Ok(total)
    }

    /// Runs the shape checks, then the catalog and budget checks, returning
    /// the squad's total price.
    pub fn validate(&self, player_ids: &[u64], catalog: &HashMap<u64, Player>) -> Result<u64> {
        self.check_shape(player_ids)?;
        self.check_cost(player_ids, catalog)
    }
}
