use super::service::LedgerService;
use crate::domain::access::Operation;
use crate::domain::contest::Contest;
use crate::domain::principal::Principal;
use crate::error::{LedgerError, Result};

impl LedgerService {
    pub async fn create_contest(
        &self,
        caller: &Principal,
        name: &str,
        entry_fee: u64,
        prize_pool: u64,
    ) -> Result<u64> {
        self.authorize(caller, Operation::CreateContest).await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput(
                "Contest name must not be empty".to_string(),
            ));
        }

        let id = self.stores.contests.next_id().await?;
        self.stores
            .contests
            .store(Contest::new(id, name.to_string(), entry_fee, prize_pool))
            .await?;
        tracing::info!(%caller, contest_id = id, entry_fee, prize_pool, "contest created");
        Ok(id)
    }

    pub async fn get_all_contests(&self) -> Result<Vec<Contest>> {
        self.stores.contests.get_all().await
    }

    pub async fn get_contest(&self, contest_id: u64) -> Result<Option<Contest>> {
        self.stores.contests.get(contest_id).await
    }

    /// Enters the caller into a contest, debiting the entry fee.
    ///
    /// The debit and the participant add are persisted by one
    /// `commit_join`, so they land together or not at all. The whole
    /// check-and-commit runs under the contest lock and then the caller's
    /// lock, on a detached task so an abandoned request cannot stop it
    /// halfway.
    pub async fn join_contest(&self, caller: &Principal, contest_id: u64) -> Result<()> {
        self.authorize(caller, Operation::JoinContest).await?;
        let caller = caller.clone();
        self.commit_detached(move |svc| async move { svc.join_locked(&caller, contest_id).await })
            .await
    }

    async fn join_locked(&self, caller: &Principal, contest_id: u64) -> Result<()> {
        let _contest_guard = self.contest_locks.lock(&contest_id).await;
        let _user_guard = self.user_locks.lock(caller).await;

        let mut contest = self
            .stores
            .contests
            .get(contest_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("contest {}", contest_id)))?;

        if contest.has_participant(caller) {
            tracing::debug!(%caller, contest_id, "duplicate join refused");
            return Err(LedgerError::AlreadyJoined(contest_id));
        }

        if self.config.require_team_for_join
            && self.stores.teams.get_by_owner(caller).await?.is_empty()
        {
            return Err(LedgerError::InvalidInput(
                "Create a team before joining a contest".to_string(),
            ));
        }

        let mut after = self.require_profile(caller).await?;
        if let Err(e) = after.debit(contest.entry_fee) {
            tracing::info!(%caller, contest_id, error = %e, "join refused");
            return Err(e);
        }
        contest.add_participant(caller.clone())?;

        if let Err(e) = self.stores.commits.commit_join(after, contest).await {
            tracing::error!(%caller, contest_id, error = %e, "join commit failed, balance kept");
            return Err(e);
        }

        tracing::info!(%caller, contest_id, "contest joined");
        Ok(())
    }
}
