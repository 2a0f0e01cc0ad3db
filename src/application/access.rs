use super::service::LedgerService;
use crate::domain::access::{Operation, UserRole};
use crate::domain::principal::Principal;
use crate::domain::profile::UserProfile;
use crate::error::{LedgerError, Result};

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidInput(
            "Name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl LedgerService {
    /// Creates a zero-balance profile for a caller seen for the first time.
    pub async fn register_user(&self, caller: &Principal, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let _guard = self.user_locks.lock(caller).await;

        if self.stores.profiles.get(caller).await?.is_some() {
            return Err(LedgerError::AlreadyRegistered);
        }

        self.stores
            .profiles
            .store(UserProfile::new(caller.clone(), name))
            .await?;
        tracing::info!(%caller, "user registered");
        Ok(())
    }

    pub async fn get_caller_user_profile(&self, caller: &Principal) -> Result<Option<UserProfile>> {
        self.stores.profiles.get(caller).await
    }

    /// Like `get_caller_user_profile`, but a missing profile is an error.
    pub async fn get_user(&self, caller: &Principal) -> Result<UserProfile> {
        self.stores
            .profiles
            .get(caller)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("profile for {}", caller)))
    }

    /// Updates the caller's display name. The balance in `profile` is
    /// ignored: balances change only through wallet operations.
    pub async fn save_caller_user_profile(
        &self,
        caller: &Principal,
        profile: UserProfile,
    ) -> Result<()> {
        let name = validate_name(&profile.name)?;
        let _guard = self.user_locks.lock(caller).await;

        let mut current = self.require_profile(caller).await?;
        if profile.balance != current.balance {
            tracing::debug!(%caller, "ignoring balance in saved profile");
        }
        current.name = name;
        self.stores.profiles.store(current).await
    }

    /// Reads another user's profile. Callers may always read their own; any
    /// other profile requires the admin role.
    pub async fn get_user_profile(
        &self,
        caller: &Principal,
        user: &Principal,
    ) -> Result<Option<UserProfile>> {
        if caller != user {
            self.authorize(caller, Operation::ViewOtherProfile).await?;
        }
        self.stores.profiles.get(user).await
    }

    pub async fn get_caller_user_role(&self, caller: &Principal) -> Result<UserRole> {
        self.role_of(caller).await
    }

    pub async fn is_caller_admin(&self, caller: &Principal) -> Result<bool> {
        Ok(self.role_of(caller).await? == UserRole::Admin)
    }

    pub async fn assign_caller_user_role(
        &self,
        caller: &Principal,
        user: &Principal,
        role: UserRole,
    ) -> Result<()> {
        self.authorize(caller, Operation::AssignRole).await?;
        self.stores.roles.assign(user, role).await?;
        tracing::info!(%caller, %user, %role, "role assigned");
        Ok(())
    }
}
