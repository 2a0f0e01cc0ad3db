#![allow(dead_code)]

use async_trait::async_trait;
use contest_ledger::application::service::LedgerService;
use contest_ledger::config::LedgerConfig;
use contest_ledger::domain::contest::Contest;
use contest_ledger::domain::payment::SessionRecord;
use contest_ledger::domain::player::{Player, Position};
use contest_ledger::domain::ports::{CommitStore, Stores};
use contest_ledger::domain::principal::Principal;
use contest_ledger::domain::profile::UserProfile;
use contest_ledger::error::{self, LedgerError};
use contest_ledger::infrastructure::in_memory::{InMemoryStore, SimulatedPaymentProvider};
use std::io::{Error, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;

pub const ADMIN: &str = "admin";
pub const HEADER: &str = "caller, command, arg1, arg2, arg3";

pub fn admin() -> Principal {
    Principal::from(ADMIN)
}

pub async fn ledger() -> (LedgerService, SimulatedPaymentProvider) {
    ledger_with(LedgerConfig::default().with_admin(ADMIN)).await
}

pub async fn ledger_with(config: LedgerConfig) -> (LedgerService, SimulatedPaymentProvider) {
    ledger_over(InMemoryStore::new().stores(), config).await
}

pub async fn ledger_over(
    stores: Stores,
    config: LedgerConfig,
) -> (LedgerService, SimulatedPaymentProvider) {
    let provider = SimulatedPaymentProvider::new();
    let svc = LedgerService::new(stores, Box::new(provider.clone()), config)
        .await
        .unwrap();
    (svc, provider)
}

/// Compound commits that fail with a storage error while `broken` is set,
/// and otherwise reach the wrapped in-memory store.
#[derive(Clone)]
pub struct FlakyCommits {
    inner: InMemoryStore,
    broken: Arc<AtomicBool>,
}

impl FlakyCommits {
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    fn check(&self) -> error::Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(LedgerError::storage(Error::other("disk unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl CommitStore for FlakyCommits {
    async fn commit_join(&self, profile: UserProfile, contest: Contest) -> error::Result<()> {
        self.check()?;
        self.inner.commit_join(profile, contest).await
    }

    async fn commit_credit(&self, profile: UserProfile, record: SessionRecord) -> error::Result<()> {
        self.check()?;
        self.inner.commit_credit(profile, record).await
    }
}

/// A ledger whose compound commits can be broken on demand.
pub async fn flaky_ledger() -> (LedgerService, SimulatedPaymentProvider, FlakyCommits) {
    let store = InMemoryStore::new();
    let commits = FlakyCommits {
        inner: store.clone(),
        broken: Arc::new(AtomicBool::new(false)),
    };
    let mut stores = store.stores();
    stores.commits = Box::new(commits.clone());
    let (svc, provider) = ledger_over(stores, LedgerConfig::default().with_admin(ADMIN)).await;
    (svc, provider, commits)
}

/// Registers `name` and gives them `cents` as an admin prize.
pub async fn funded(svc: &LedgerService, name: &str, cents: u64) -> Principal {
    let user = Principal::from(name);
    svc.register_user(&user, name).await.unwrap();
    if cents > 0 {
        svc.award_prize(&admin(), &user, cents).await.unwrap();
    }
    user
}

/// Gives `user` a one-player team so they may enter contests.
pub async fn with_team(svc: &LedgerService, user: &Principal) {
    if svc.get_player(&admin(), 1).await.unwrap().is_none() {
        let keeper = Player {
            id: 1,
            name: "Keeper".to_string(),
            team: "Athletic".to_string(),
            position: Position::Goalkeeper,
            price: 100,
            form: 5,
        };
        // Another task may have added it in between.
        let _ = svc.add_player(&admin(), keeper).await;
    }
    svc.create_team(user, vec![1]).await.unwrap();
}

/// Writes a command script with the standard header followed by `rows`.
pub fn write_script(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", HEADER)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}
