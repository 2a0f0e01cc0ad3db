use super::service::LedgerService;
use crate::domain::access::Operation;
use crate::domain::principal::Principal;
use crate::domain::team::FantasyTeam;
use crate::error::Result;
use std::collections::HashMap;

impl LedgerService {
    /// Validates and stores a squad for the caller, returning its id.
    ///
    /// The squad is checked against a catalog snapshot of the requested ids.
    /// Assembly is free; money only moves when the team's owner enters a
    /// contest.
    pub async fn create_team(&self, caller: &Principal, player_ids: Vec<u64>) -> Result<u64> {
        self.authorize(caller, Operation::AssembleTeam).await?;
        self.require_profile(caller).await?;

        let rules = self.config.squad_rules;

        // Ids past the roster cap fail the shape check, so they need no lookup.
        let mut catalog = HashMap::with_capacity(player_ids.len().min(rules.roster_cap));
        for id in player_ids.iter().take(rules.roster_cap) {
            if let Some(player) = self.stores.players.get(*id).await? {
                catalog.insert(*id, player);
            }
        }
        let total = match rules.validate(&player_ids, &catalog) {
            Ok(total) => total,
            Err(e) => {
                tracing::debug!(%caller, error = %e, "team rejected");
                return Err(e);
            }
        };

        let id = self.stores.teams.next_id().await?;
        self.stores
            .teams
            .store(FantasyTeam {
                id,
                owner: caller.clone(),
                player_ids,
            })
            .await?;
        tracing::info!(%caller, team_id = id, total, "team created");
        Ok(id)
    }

    pub async fn get_my_teams(&self, caller: &Principal) -> Result<Vec<FantasyTeam>> {
        self.stores.teams.get_by_owner(caller).await
    }

    pub async fn get_team(&self, team_id: u64) -> Result<Option<FantasyTeam>> {
        self.stores.teams.get(team_id).await
    }
}
