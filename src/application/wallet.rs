use super::service::LedgerService;
use crate::domain::access::Operation;
use crate::domain::money::{Amount, Balance};
use crate::domain::principal::Principal;
use crate::domain::profile::UserProfile;
use crate::error::Result;

impl LedgerService {
    /// Credits the caller's own wallet directly.
    ///
    /// Admins may always deposit; regular users only when open deposits are
    /// enabled. In production money arrives through checkout sessions.
    pub async fn deposit_funds(&self, caller: &Principal, amount: u64) -> Result<()> {
        let amount = Amount::new(amount)?;
        self.authorize(caller, Operation::Deposit).await?;

        let _guard = self.user_locks.lock(caller).await;
        let profile = self.credit_locked(caller, amount.cents()).await?;
        tracing::info!(%caller, amount = amount.cents(), balance = %profile.balance, "funds deposited");
        Ok(())
    }

    /// Credits `user` after a contest concludes. Not tied to any scoring.
    pub async fn award_prize(&self, caller: &Principal, user: &Principal, amount: u64) -> Result<()> {
        let amount = Amount::new(amount)?;
        self.authorize(caller, Operation::AwardPrize).await?;

        let _guard = self.user_locks.lock(user).await;
        let profile = self.credit_locked(user, amount.cents()).await?;
        tracing::info!(%caller, %user, amount = amount.cents(), balance = %profile.balance, "prize awarded");
        Ok(())
    }

    /// The caller's balance; zero before registration.
    pub async fn get_balance(&self, caller: &Principal) -> Result<Balance> {
        Ok(self
            .stores
            .profiles
            .get(caller)
            .await?
            .map(|profile| profile.balance)
            .unwrap_or(Balance::ZERO))
    }

    /// Caller must hold `user_locks` for `user`.
    pub(super) async fn credit_locked(&self, user: &Principal, cents: u64) -> Result<UserProfile> {
        let mut profile = self.require_profile(user).await?;
        profile.credit(cents)?;
        self.stores.profiles.store(profile.clone()).await?;
        Ok(profile)
    }
}
