use super::access::UserRole;
use super::contest::Contest;
use super::payment::{
    CheckoutSession, SessionRecord, SessionStatus, ShoppingItem, StripeConfiguration,
};
use super::player::Player;
use super::principal::Principal;
use super::profile::UserProfile;
use super::team::FantasyTeam;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn store(&self, player: Player) -> Result<()>;
    async fn get(&self, player_id: u64) -> Result<Option<Player>>;
    /// All players ordered by id.
    async fn get_all(&self) -> Result<Vec<Player>>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, team: FantasyTeam) -> Result<()>;
    async fn get(&self, team_id: u64) -> Result<Option<FantasyTeam>>;
    /// Teams owned by `owner`, ordered by id.
    async fn get_by_owner(&self, owner: &Principal) -> Result<Vec<FantasyTeam>>;
}

#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, contest: Contest) -> Result<()>;
    async fn get(&self, contest_id: u64) -> Result<Option<Contest>>;
    /// All contests ordered by id.
    async fn get_all(&self) -> Result<Vec<Contest>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn store(&self, profile: UserProfile) -> Result<()>;
    async fn get(&self, owner: &Principal) -> Result<Option<UserProfile>>;
    async fn get_all(&self) -> Result<Vec<UserProfile>>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn assign(&self, user: &Principal, role: UserRole) -> Result<()>;
    /// The explicitly assigned role, if any.
    async fn get(&self, user: &Principal) -> Result<Option<UserRole>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store(&self, record: SessionRecord) -> Result<()>;
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;
}

/// Writes that touch more than one table and must land together.
///
/// Either every value is persisted or none is; a crash mid-call never leaves
/// a debit without its participant or a credit without its session flag.
#[async_trait]
pub trait CommitStore: Send + Sync {
    /// Persists a debited profile and the contest it joined.
    async fn commit_join(&self, profile: UserProfile, contest: Contest) -> Result<()>;
    /// Persists a credited profile and the session record marked applied.
    async fn commit_credit(&self, profile: UserProfile, record: SessionRecord) -> Result<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn set_stripe_configuration(&self, config: StripeConfiguration) -> Result<()>;
    async fn stripe_configuration(&self) -> Result<Option<StripeConfiguration>>;
}

/// The external payment processor, reached over its HTTP API.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        config: &StripeConfiguration,
        owner: &Principal,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession>;

    async fn session_status(
        &self,
        config: &StripeConfiguration,
        session_id: &str,
    ) -> Result<SessionStatus>;
}

pub type PlayerStoreBox = Box<dyn PlayerStore>;
pub type TeamStoreBox = Box<dyn TeamStore>;
pub type ContestStoreBox = Box<dyn ContestStore>;
pub type ProfileStoreBox = Box<dyn ProfileStore>;
pub type RoleStoreBox = Box<dyn RoleStore>;
pub type SessionStoreBox = Box<dyn SessionStore>;
pub type SettingsStoreBox = Box<dyn SettingsStore>;
pub type CommitStoreBox = Box<dyn CommitStore>;
pub type PaymentProviderBox = Box<dyn PaymentProvider>;

/// Every storage backend the ledger needs, handed to the service as one unit.
pub struct Stores {
    pub players: PlayerStoreBox,
    pub teams: TeamStoreBox,
    pub contests: ContestStoreBox,
    pub profiles: ProfileStoreBox,
    pub roles: RoleStoreBox,
    pub sessions: SessionStoreBox,
    pub settings: SettingsStoreBox,
    pub commits: CommitStoreBox,
}
