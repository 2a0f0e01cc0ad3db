use crate::domain::access::UserRole;
use crate::domain::contest::Contest;
use crate::domain::payment::{
    CheckoutSession, SessionRecord, SessionStatus, ShoppingItem, StripeConfiguration, cart_total,
};
use crate::domain::player::Player;
use crate::domain::ports::{
    CommitStore, ContestStore, PaymentProvider, PlayerStore, ProfileStore, RoleStore,
    SessionStore, SettingsStore, Stores, TeamStore,
};
use crate::domain::principal::Principal;
use crate::domain::profile::UserProfile;
use crate::domain::team::FantasyTeam;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    players: RwLock<BTreeMap<u64, Player>>,
    teams: RwLock<BTreeMap<u64, FantasyTeam>>,
    contests: RwLock<BTreeMap<u64, Contest>>,
    profiles: RwLock<HashMap<Principal, UserProfile>>,
    roles: RwLock<HashMap<Principal, UserRole>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
    stripe: RwLock<Option<StripeConfiguration>>,
    next_team_id: AtomicU64,
    next_contest_id: AtomicU64,
}

/// A thread-safe in-memory store for every ledger entity.
///
/// Each table sits behind its own `tokio::sync::RwLock`; `Clone` shares the
/// tables. Ideal for testing or deployments where persistence is not
/// required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Tables>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxes shared handles to this store for every port.
    pub fn stores(&self) -> Stores {
        Stores {
            players: Box::new(self.clone()),
            teams: Box::new(self.clone()),
            contests: Box::new(self.clone()),
            profiles: Box::new(self.clone()),
            roles: Box::new(self.clone()),
            sessions: Box::new(self.clone()),
            settings: Box::new(self.clone()),
            commits: Box::new(self.clone()),
        }
    }
}

#[async_trait]
impl PlayerStore for InMemoryStore {
    async fn store(&self, player: Player) -> Result<()> {
        let mut players = self.tables.players.write().await;
        players.insert(player.id, player);
        Ok(())
    }

    async fn get(&self, player_id: u64) -> Result<Option<Player>> {
        let players = self.tables.players.read().await;
        Ok(players.get(&player_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Player>> {
        let players = self.tables.players.read().await;
        Ok(players.values().cloned().collect())
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.tables.next_team_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn store(&self, team: FantasyTeam) -> Result<()> {
        let mut teams = self.tables.teams.write().await;
        teams.insert(team.id, team);
        Ok(())
    }

    async fn get(&self, team_id: u64) -> Result<Option<FantasyTeam>> {
        let teams = self.tables.teams.read().await;
        Ok(teams.get(&team_id).cloned())
    }

    async fn get_by_owner(&self, owner: &Principal) -> Result<Vec<FantasyTeam>> {
        let teams = self.tables.teams.read().await;
        Ok(teams
            .values()
            .filter(|team| &team.owner == owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContestStore for InMemoryStore {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.tables.next_contest_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn store(&self, contest: Contest) -> Result<()> {
        let mut contests = self.tables.contests.write().await;
        contests.insert(contest.id, contest);
        Ok(())
    }

    async fn get(&self, contest_id: u64) -> Result<Option<Contest>> {
        let contests = self.tables.contests.read().await;
        Ok(contests.get(&contest_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Contest>> {
        let contests = self.tables.contests.read().await;
        Ok(contests.values().cloned().collect())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn store(&self, profile: UserProfile) -> Result<()> {
        let mut profiles = self.tables.profiles.write().await;
        profiles.insert(profile.owner.clone(), profile);
        Ok(())
    }

    async fn get(&self, owner: &Principal) -> Result<Option<UserProfile>> {
        let profiles = self.tables.profiles.read().await;
        Ok(profiles.get(owner).cloned())
    }

    async fn get_all(&self) -> Result<Vec<UserProfile>> {
        let profiles = self.tables.profiles.read().await;
        let mut all: Vec<UserProfile> = profiles.values().cloned().collect();
        all.sort_by(|a, b| a.owner.cmp(&b.owner));
        Ok(all)
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn assign(&self, user: &Principal, role: UserRole) -> Result<()> {
        let mut roles = self.tables.roles.write().await;
        roles.insert(user.clone(), role);
        Ok(())
    }

    async fn get(&self, user: &Principal) -> Result<Option<UserRole>> {
        let roles = self.tables.roles.read().await;
        Ok(roles.get(user).copied())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn store(&self, record: SessionRecord) -> Result<()> {
        let mut sessions = self.tables.sessions.write().await;
        sessions.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let sessions = self.tables.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }
}

// Both table locks are taken before either insert, profiles first.
#[async_trait]
impl CommitStore for InMemoryStore {
    async fn commit_join(&self, profile: UserProfile, contest: Contest) -> Result<()> {
        let mut profiles = self.tables.profiles.write().await;
        let mut contests = self.tables.contests.write().await;
        profiles.insert(profile.owner.clone(), profile);
        contests.insert(contest.id, contest);
        Ok(())
    }

    async fn commit_credit(&self, profile: UserProfile, record: SessionRecord) -> Result<()> {
        let mut profiles = self.tables.profiles.write().await;
        let mut sessions = self.tables.sessions.write().await;
        profiles.insert(profile.owner.clone(), profile);
        sessions.insert(record.session_id.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn set_stripe_configuration(&self, config: StripeConfiguration) -> Result<()> {
        *self.tables.stripe.write().await = Some(config);
        Ok(())
    }

    async fn stripe_configuration(&self) -> Result<Option<StripeConfiguration>> {
        Ok(self.tables.stripe.read().await.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SimulatedState {
    Open,
    Complete,
    Failed(String),
}

#[derive(Debug, Clone)]
struct SimulatedSession {
    owner: Principal,
    amount_total: u64,
    state: SimulatedState,
}

/// An in-process stand-in for the payment processor.
///
/// Sessions start open; `complete` and `fail` play the part of the customer
/// finishing or abandoning the hosted checkout.
#[derive(Default, Clone)]
pub struct SimulatedPaymentProvider {
    sessions: Arc<RwLock<HashMap<String, SimulatedSession>>>,
    next_id: Arc<AtomicU64>,
}

impl SimulatedPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn complete(&self, session_id: &str) -> Result<()> {
        self.set_state(session_id, SimulatedState::Complete).await
    }

    pub async fn fail(&self, session_id: &str, reason: &str) -> Result<()> {
        self.set_state(session_id, SimulatedState::Failed(reason.to_string()))
            .await
    }

    async fn set_state(&self, session_id: &str, state: SimulatedState) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).ok_or_else(|| {
            LedgerError::NotFound(format!("checkout session {}", session_id))
        })?;
        session.state = state;
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for SimulatedPaymentProvider {
    async fn create_checkout_session(
        &self,
        _config: &StripeConfiguration,
        owner: &Principal,
        items: &[ShoppingItem],
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let amount_total = cart_total(items)?;
        let id = format!("cs_sim_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let url = format!("https://checkout.simulated.local/pay/{}", id);

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            SimulatedSession {
                owner: owner.clone(),
                amount_total,
                state: SimulatedState::Open,
            },
        );

        Ok(CheckoutSession { id, url })
    }

    async fn session_status(
        &self,
        _config: &StripeConfiguration,
        session_id: &str,
    ) -> Result<SessionStatus> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id).ok_or_else(|| {
            LedgerError::UpstreamPayment(format!("No such checkout session: {}", session_id))
        })?;

        Ok(match &session.state {
            SimulatedState::Complete => SessionStatus::Completed {
                user_principal: Some(session.owner.to_string()),
                response: serde_json::json!({
                    "id": session_id,
                    "status": "complete",
                    "payment_status": "paid",
                    "amount_total": session.amount_total,
                    "client_reference_id": session.owner.as_str(),
                })
                .to_string(),
            },
            SimulatedState::Failed(reason) => SessionStatus::Failed {
                error: reason.clone(),
            },
            SimulatedState::Open => SessionStatus::Open {
                error: "checkout session is still open".to_string(),
            },
        })
    }
}
