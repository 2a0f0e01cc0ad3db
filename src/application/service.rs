use super::locks::KeyedLocks;
use crate::config::LedgerConfig;
use crate::domain::access::{Operation, UserRole};
use crate::domain::ports::{PaymentProviderBox, Stores};
use crate::domain::principal::Principal;
use crate::domain::profile::UserProfile;
use crate::error::{LedgerError, Result};
use std::future::Future;
use std::sync::Arc;

/// The ledger's single entry point.
///
/// `LedgerService` owns the storage ports and the payment provider, and
/// exposes every catalog, team, wallet, contest, payment and access
/// operation as an async method taking the caller's principal explicitly.
/// Cloning is cheap and every clone shares the same state and locks.
///
/// Compound operations (contest entry, session crediting, balance changes)
/// hold per-key locks for their whole read-check-write sequence. Locks are
/// taken in the fixed order contest, session, user.
#[derive(Clone)]
pub struct LedgerService {
    pub(super) stores: Arc<Stores>,
    pub(super) payments: Arc<PaymentProviderBox>,
    pub(super) config: Arc<LedgerConfig>,
    pub(super) user_locks: Arc<KeyedLocks<Principal>>,
    pub(super) contest_locks: Arc<KeyedLocks<u64>>,
    pub(super) session_locks: Arc<KeyedLocks<String>>,
    pub(super) catalog_lock: Arc<tokio::sync::Mutex<()>>,
}

impl LedgerService {
    /// Creates a service over the given stores and payment provider, granting
    /// the admin role to every bootstrap admin in `config`.
    pub async fn new(
        stores: Stores,
        payments: PaymentProviderBox,
        config: LedgerConfig,
    ) -> Result<Self> {
        for admin in &config.bootstrap_admins {
            stores.roles.assign(admin, UserRole::Admin).await?;
            tracing::info!(%admin, "bootstrap admin granted");
        }

        Ok(Self {
            stores: Arc::new(stores),
            payments: Arc::new(payments),
            config: Arc::new(config),
            user_locks: Arc::new(KeyedLocks::new()),
            contest_locks: Arc::new(KeyedLocks::new()),
            session_locks: Arc::new(KeyedLocks::new()),
            catalog_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Effective role: an explicit assignment wins, otherwise `User` once
    /// registered and `Guest` before.
    pub(super) async fn role_of(&self, user: &Principal) -> Result<UserRole> {
        if let Some(role) = self.stores.roles.get(user).await? {
            return Ok(role);
        }
        Ok(match self.stores.profiles.get(user).await? {
            Some(_) => UserRole::User,
            None => UserRole::Guest,
        })
    }

    pub(super) async fn authorize(&self, caller: &Principal, op: Operation) -> Result<UserRole> {
        let role = self.role_of(caller).await?;
        if let Err(e) = self.config.access_policy.authorize(role, op) {
            tracing::warn!(%caller, %role, %op, "operation refused");
            return Err(e);
        }
        Ok(role)
    }

    pub(super) async fn require_profile(&self, user: &Principal) -> Result<UserProfile> {
        self.stores
            .profiles
            .get(user)
            .await?
            .ok_or_else(|| LedgerError::Unauthorized(format!("{} is not registered", user)))
    }

    /// Runs a commit on its own task so that dropping the caller's future
    /// cannot interrupt it between writes.
    pub(super) async fn commit_detached<T, F, Fut>(&self, commit: F) -> Result<T>
    where
        F: FnOnce(LedgerService) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(commit(self.clone()))
            .await
            .map_err(LedgerError::storage)?
    }

    /// Every registered profile, for operator reports.
    pub async fn list_profiles(&self) -> Result<Vec<(UserProfile, UserRole)>> {
        let profiles = self.stores.profiles.get_all().await?;
        let mut report = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let role = self.role_of(&profile.owner).await?;
            report.push((profile, role));
        }
        Ok(report)
    }
}
