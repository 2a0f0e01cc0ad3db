use crate::domain::access::UserRole;
use crate::domain::contest::Contest;
use crate::domain::payment::{SessionRecord, StripeConfiguration};
use crate::domain::player::Player;
use crate::domain::ports::{
    CommitStore, ContestStore, PlayerStore, ProfileStore, RoleStore, SessionStore, SettingsStore,
    Stores, TeamStore,
};
use crate::domain::principal::Principal;
use crate::domain::profile::UserProfile;
use crate::domain::team::FantasyTeam;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CF_PLAYERS: &str = "players";
pub const CF_TEAMS: &str = "teams";
pub const CF_CONTESTS: &str = "contests";
pub const CF_PROFILES: &str = "profiles";
pub const CF_ROLES: &str = "roles";
pub const CF_SESSIONS: &str = "sessions";
/// Singleton values: id counters and the payment configuration.
pub const CF_META: &str = "meta";

const ALL_CFS: [&str; 7] = [
    CF_PLAYERS,
    CF_TEAMS,
    CF_CONTESTS,
    CF_PROFILES,
    CF_ROLES,
    CF_SESSIONS,
    CF_META,
];

const KEY_NEXT_TEAM_ID: &[u8] = b"next_team_id";
const KEY_NEXT_CONTEST_ID: &[u8] = b"next_contest_id";
const KEY_STRIPE_CONFIG: &[u8] = b"stripe_configuration";

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own column family, JSON encoded. Numeric ids are
/// stored big-endian so iteration yields them in ascending order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    id_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating any
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            id_lock: Arc::new(Mutex::new(())),
        })
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

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::storage(std::io::Error::other(format!(
                "{} column family not found",
                name
            )))
        })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn batch_put_json<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, key, serde_json::to_vec(value)?);
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    async fn allocate_id(&self, key: &[u8]) -> Result<u64> {
        let _guard = self.id_lock.lock().await;
        let last: u64 = self.get_json(CF_META, key)?.unwrap_or(0);
        let next = last + 1;
        self.put_json(CF_META, key, &next)?;
        Ok(next)
    }
}

#[async_trait]
impl PlayerStore for RocksDBStore {
    async fn store(&self, player: Player) -> Result<()> {
        self.put_json(CF_PLAYERS, &player.id.to_be_bytes(), &player)
    }

    async fn get(&self, player_id: u64) -> Result<Option<Player>> {
        self.get_json(CF_PLAYERS, &player_id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Player>> {
        self.scan_json(CF_PLAYERS)
    }
}

#[async_trait]
impl TeamStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.allocate_id(KEY_NEXT_TEAM_ID).await
    }

    async fn store(&self, team: FantasyTeam) -> Result<()> {
        self.put_json(CF_TEAMS, &team.id.to_be_bytes(), &team)
    }

    async fn get(&self, team_id: u64) -> Result<Option<FantasyTeam>> {
        self.get_json(CF_TEAMS, &team_id.to_be_bytes())
    }

    async fn get_by_owner(&self, owner: &Principal) -> Result<Vec<FantasyTeam>> {
        let teams: Vec<FantasyTeam> = self.scan_json(CF_TEAMS)?;
        Ok(teams
            .into_iter()
            .filter(|team| &team.owner == owner)
            .collect())
    }
}

#[async_trait]
impl ContestStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.allocate_id(KEY_NEXT_CONTEST_ID).await
    }

    async fn store(&self, contest: Contest) -> Result<()> {
        self.put_json(CF_CONTESTS, &contest.id.to_be_bytes(), &contest)
    }

    async fn get(&self, contest_id: u64) -> Result<Option<Contest>> {
        self.get_json(CF_CONTESTS, &contest_id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Contest>> {
        self.scan_json(CF_CONTESTS)
    }
}

#[async_trait]
impl ProfileStore for RocksDBStore {
    async fn store(&self, profile: UserProfile) -> Result<()> {
        self.put_json(CF_PROFILES, profile.owner.as_str().as_bytes(), &profile)
    }

    async fn get(&self, owner: &Principal) -> Result<Option<UserProfile>> {
        self.get_json(CF_PROFILES, owner.as_str().as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<UserProfile>> {
        self.scan_json(CF_PROFILES)
    }
}

#[async_trait]
impl RoleStore for RocksDBStore {
    async fn assign(&self, user: &Principal, role: UserRole) -> Result<()> {
        self.put_json(CF_ROLES, user.as_str().as_bytes(), &role)
    }

    async fn get(&self, user: &Principal) -> Result<Option<UserRole>> {
        self.get_json(CF_ROLES, user.as_str().as_bytes())
    }
}

#[async_trait]
impl SessionStore for RocksDBStore {
    async fn store(&self, record: SessionRecord) -> Result<()> {
        self.put_json(CF_SESSIONS, record.session_id.as_bytes(), &record)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        self.get_json(CF_SESSIONS, session_id.as_bytes())
    }
}

/// Compound writes go through one `WriteBatch`, applied atomically.
#[async_trait]
impl CommitStore for RocksDBStore {
    async fn commit_join(&self, profile: UserProfile, contest: Contest) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.batch_put_json(&mut batch, CF_PROFILES, profile.owner.as_str().as_bytes(), &profile)?;
        self.batch_put_json(&mut batch, CF_CONTESTS, &contest.id.to_be_bytes(), &contest)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn commit_credit(&self, profile: UserProfile, record: SessionRecord) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.batch_put_json(&mut batch, CF_PROFILES, profile.owner.as_str().as_bytes(), &profile)?;
        self.batch_put_json(&mut batch, CF_SESSIONS, record.session_id.as_bytes(), &record)?;
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn set_stripe_configuration(&self, config: StripeConfiguration) -> Result<()> {
        self.put_json(CF_META, KEY_STRIPE_CONFIG, &config)
    }

    async fn stripe_configuration(&self) -> Result<Option<StripeConfiguration>> {
        self.get_json(CF_META, KEY_STRIPE_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::Position;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in ALL_CFS {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_profile_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut profile = UserProfile::new(Principal::from("alice"), "Alice".to_string());
        profile.credit(1500).unwrap();

        ProfileStore::store(&store, profile.clone()).await.unwrap();
        let retrieved = ProfileStore::get(&store, &Principal::from("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved, profile);
        assert!(
            ProfileStore::get(&store, &Principal::from("bob"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rocksdb_players_iterate_in_id_order() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        for id in [300u64, 2, 17] {
            PlayerStore::store(
                &store,
                Player {
                    id,
                    name: format!("Player {}", id),
                    team: "United".to_string(),
                    position: Position::Midfielder,
                    price: 100,
                    form: 1,
                },
            )
            .await
            .unwrap();
        }

        let ids: Vec<u64> = PlayerStore::get_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![2, 17, 300]);
    }

    #[tokio::test]
    async fn test_rocksdb_commit_credit_survives_reopen() {
        let dir = tempdir().unwrap();
        let alice = Principal::from("alice");
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            let mut profile = UserProfile::new(alice.clone(), "Alice".to_string());
            profile.credit(2500).unwrap();
            let mut record = SessionRecord::pending("cs_1".to_string(), alice.clone(), 2500);
            record.applied_to_wallet = true;
            store.commit_credit(profile, record).await.unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let profile = ProfileStore::get(&store, &alice).await.unwrap().unwrap();
        assert_eq!(profile.balance.cents(), 2500);
        let record = SessionStore::get(&store, "cs_1").await.unwrap().unwrap();
        assert!(record.applied_to_wallet);
    }

    #[tokio::test]
    async fn test_rocksdb_id_counters_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            assert_eq!(ContestStore::next_id(&store).await.unwrap(), 1);
            assert_eq!(ContestStore::next_id(&store).await.unwrap(), 2);
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(ContestStore::next_id(&store).await.unwrap(), 3);
        assert_eq!(TeamStore::next_id(&store).await.unwrap(), 1);
    }
}
