use crate::application::service::LedgerService;
use crate::domain::payment::{ReconcileOutcome, ShoppingItem};
use crate::error::{LedgerError, Result};
use crate::infrastructure::in_memory::SimulatedPaymentProvider;
use crate::interfaces::csv::command_reader::{Command, ScriptLine};

const SUCCESS_URL: &str = "https://contest-ledger.local/checkout/success";
const CANCEL_URL: &str = "https://contest-ledger.local/checkout/cancel";

/// Applies parsed script rows to a `LedgerService`.
///
/// `complete_session` and `fail_session` drive the simulated processor and
/// are refused when the runner talks to a real one.
pub struct ScriptRunner {
    service: LedgerService,
    simulator: Option<SimulatedPaymentProvider>,
}

impl ScriptRunner {
    pub fn new(service: LedgerService, simulator: Option<SimulatedPaymentProvider>) -> Self {
        Self { service, simulator }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    fn simulator(&self) -> Result<&SimulatedPaymentProvider> {
        self.simulator.as_ref().ok_or_else(|| {
            LedgerError::InvalidInput(
                "session outcomes can only be driven on the simulated processor".to_string(),
            )
        })
    }

    pub async fn execute(&self, line: ScriptLine) -> Result<()> {
        let svc = &self.service;
        let caller = &line.caller;
        match line.command {
            Command::Register { name } => svc.register_user(caller, &name).await,
            Command::AddPlayer(player) => svc.add_player(caller, player).await,
            Command::CreateTeam { player_ids } => {
                svc.create_team(caller, player_ids).await.map(|_| ())
            }
            Command::CreateContest {
                name,
                entry_fee,
                prize_pool,
            } => svc
                .create_contest(caller, &name, entry_fee, prize_pool)
                .await
                .map(|_| ()),
            Command::Join { contest_id } => svc.join_contest(caller, contest_id).await,
            Command::Deposit { amount } => svc.deposit_funds(caller, amount).await,
            Command::Award { user, amount } => svc.award_prize(caller, &user, amount).await,
            Command::AssignRole { user, role } => {
                svc.assign_caller_user_role(caller, &user, role).await
            }
            Command::ConfigureStripe(config) => svc.set_stripe_configuration(caller, config).await,
            Command::Checkout { amount } => {
                let items = vec![ShoppingItem {
                    product_name: "Wallet Deposit".to_string(),
                    product_description: "Funds for contest entry fees".to_string(),
                    quantity: 1,
                    price_in_cents: amount,
                    currency: "usd".to_string(),
                }];
                let session = svc
                    .create_checkout_session(caller, items, SUCCESS_URL, CANCEL_URL)
                    .await?;
                tracing::info!(%caller, session_id = %session.id, url = %session.url, "redirect to checkout");
                Ok(())
            }
            Command::CompleteSession { session_id } => {
                self.simulator()?.complete(&session_id).await
            }
            Command::FailSession { session_id, reason } => {
                self.simulator()?.fail(&session_id, &reason).await
            }
            Command::Reconcile { session_id } => {
                match svc.reconcile_session(&session_id).await? {
                    ReconcileOutcome::Credited { owner, amount } => {
                        tracing::debug!(%session_id, %owner, amount, "reconciled");
                    }
                    ReconcileOutcome::AlreadyApplied => {
                        tracing::debug!(%session_id, "nothing to reconcile");
                    }
                    ReconcileOutcome::NotCompleted { error } => {
                        tracing::debug!(%session_id, %error, "session still unpaid");
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::domain::principal::Principal;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::interfaces::csv::command_reader::CommandReader;

    async fn runner() -> ScriptRunner {
        let provider = SimulatedPaymentProvider::new();
        let svc = LedgerService::new(
            InMemoryStore::new().stores(),
            Box::new(provider.clone()),
            LedgerConfig::default().with_admin("admin"),
        )
        .await
        .unwrap();
        ScriptRunner::new(svc, Some(provider))
    }

    async fn run(runner: &ScriptRunner, script: &str) -> usize {
        let mut rejected = 0;
        for line in CommandReader::new(script.as_bytes()).commands() {
            if runner.execute(line.unwrap()).await.is_err() {
                rejected += 1;
            }
        }
        rejected
    }

    #[tokio::test]
    async fn test_checkout_flow_through_script() {
        let runner = runner().await;
        let script = "caller, command, arg1, arg2, arg3\n\
                      admin, configure_stripe, sk_test_1, US\n\
                      alice, register, Alice\n\
                      alice, checkout, 20.00\n\
                      alice, reconcile, cs_sim_1\n\
                      admin, complete_session, cs_sim_1\n\
                      alice, reconcile, cs_sim_1\n\
                      alice, reconcile, cs_sim_1\n";
        assert_eq!(run(&runner, script).await, 0);

        let balance = runner
            .service()
            .get_balance(&Principal::from("alice"))
            .await
            .unwrap();
        assert_eq!(balance.cents(), 2000);
    }

    #[tokio::test]
    async fn test_rejected_rows_are_counted() {
        let runner = runner().await;
        let script = "caller, command, arg1, arg2, arg3\n\
                      alice, register, Alice\n\
                      alice, register, Again\n\
                      alice, create_contest, Mine, 1, 0\n\
                      admin, complete_session, cs_sim_9\n";
        assert_eq!(run(&runner, script).await, 3);
    }
}
