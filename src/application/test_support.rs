use super::service::LedgerService;
use crate::config::LedgerConfig;
use crate::domain::player::{Player, Position};
use crate::domain::principal::Principal;
use crate::infrastructure::in_memory::{InMemoryStore, SimulatedPaymentProvider};

pub(crate) const ADMIN: &str = "admin";

pub(crate) async fn service() -> LedgerService {
    service_with(LedgerConfig::default().with_admin(ADMIN)).await
}

pub(crate) async fn service_with(config: LedgerConfig) -> LedgerService {
    service_with_provider(config).await.0
}

pub(crate) async fn service_with_provider(
    config: LedgerConfig,
) -> (LedgerService, SimulatedPaymentProvider) {
    let store = InMemoryStore::new();
    let provider = SimulatedPaymentProvider::new();
    let svc = LedgerService::new(store.stores(), Box::new(provider.clone()), config)
        .await
        .unwrap();
    (svc, provider)
}

pub(crate) fn player(id: u64, price: u64, position: Position) -> Player {
    Player {
        id,
        name: format!("Player {}", id),
        team: "Athletic".to_string(),
        position,
        price,
        form: 6,
    }
}

/// Registers `name` and credits `cents` through the admin prize path.
pub(crate) async fn funded_user(svc: &LedgerService, name: &str, cents: u64) -> Principal {
    let user = Principal::from(name);
    svc.register_user(&user, name).await.unwrap();
    if cents > 0 {
        svc.award_prize(&Principal::from(ADMIN), &user, cents)
            .await
            .unwrap();
    }
    user
}
