use super::service::LedgerService;
use crate::domain::access::Operation;
use crate::domain::player::Player;
use crate::domain::principal::Principal;
use crate::error::{LedgerError, Result};

fn validate_player(player: &Player) -> Result<()> {
    if player.name.trim().is_empty() {
        return Err(LedgerError::InvalidInput(
            "Player name must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl LedgerService {
    pub async fn add_player(&self, caller: &Principal, player: Player) -> Result<()> {
        self.authorize(caller, Operation::ManageCatalog).await?;
        validate_player(&player)?;

        let _guard = self.catalog_lock.lock().await;
        if self.stores.players.get(player.id).await?.is_some() {
            return Err(LedgerError::AlreadyExists(format!("player {}", player.id)));
        }

        let id = player.id;
        self.stores.players.store(player).await?;
        tracing::info!(%caller, player_id = id, "player added");
        Ok(())
    }

    /// Replaces the catalog entry for `player_id`. The stored id is always
    /// `player_id`, whatever `player.id` says.
    pub async fn update_player(
        &self,
        caller: &Principal,
        player_id: u64,
        mut player: Player,
    ) -> Result<()> {
        self.authorize(caller, Operation::ManageCatalog).await?;
        validate_player(&player)?;

        let _guard = self.catalog_lock.lock().await;
        if self.stores.players.get(player_id).await?.is_none() {
            return Err(LedgerError::NotFound(format!("player {}", player_id)));
        }

        player.id = player_id;
        self.stores.players.store(player).await?;
        tracing::info!(%caller, player_id, "player updated");
        Ok(())
    }

    pub async fn get_player(&self, caller: &Principal, player_id: u64) -> Result<Option<Player>> {
        self.authorize(caller, Operation::ReadCatalog).await?;
        self.stores.players.get(player_id).await
    }

    pub async fn get_all_players(&self, caller: &Principal) -> Result<Vec<Player>> {
        self.authorize(caller, Operation::ReadCatalog).await?;
        self.stores.players.get_all().await
    }
}
