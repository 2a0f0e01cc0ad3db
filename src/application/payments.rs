use super::service::LedgerService;
use crate::domain::access::Operation;
use crate::domain::payment::{
    CheckoutSession, ReconcileOutcome, SessionRecord, SessionState, SessionStatus, ShoppingItem,
    StripeConfiguration, TransformationInput, TransformationOutput, cart_total,
};
use crate::domain::principal::Principal;
use crate::error::{LedgerError, Result};

impl LedgerService {
    pub async fn set_stripe_configuration(
        &self,
        caller: &Principal,
        config: StripeConfiguration,
    ) -> Result<()> {
        self.authorize(caller, Operation::ConfigurePayments).await?;
        if config.secret_key.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "Stripe secret key must not be empty".to_string(),
            ));
        }
        self.stores.settings.set_stripe_configuration(config).await?;
        tracing::info!(%caller, "stripe configured");
        Ok(())
    }

    pub async fn is_stripe_configured(&self) -> Result<bool> {
        Ok(self.stores.settings.stripe_configuration().await?.is_some())
    }

    async fn require_stripe(&self) -> Result<StripeConfiguration> {
        self.stores
            .settings
            .stripe_configuration()
            .await?
            .ok_or(LedgerError::StripeNotConfigured)
    }

    /// Opens a hosted checkout for the caller's cart and records it as a
    /// pending credit of the cart total.
    pub async fn create_checkout_session(
        &self,
        caller: &Principal,
        items: Vec<ShoppingItem>,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        self.authorize(caller, Operation::Checkout).await?;
        let stripe = self.require_stripe().await?;
        self.require_profile(caller).await?;
        let amount = cart_total(&items)?;

        let session = self
            .payments
            .create_checkout_session(&stripe, caller, &items, success_url, cancel_url)
            .await?;

        let record = SessionRecord::pending(session.id.clone(), caller.clone(), amount);
        if let Err(e) = self.stores.sessions.store(record).await {
            tracing::error!(%caller, session_id = %session.id, error = %e, "checkout session opened upstream but not recorded");
            return Err(e);
        }

        tracing::info!(%caller, session_id = %session.id, amount, "checkout session created");
        Ok(session)
    }

    /// Reads the processor's view of a session. Never touches a wallet.
    pub async fn get_stripe_session_status(&self, session_id: &str) -> Result<SessionStatus> {
        let stripe = self.require_stripe().await?;
        self.payments.session_status(&stripe, session_id).await
    }

    pub fn transform(&self, input: TransformationInput) -> TransformationOutput {
        crate::domain::payment::transform(input)
    }

    /// Polls the processor for `session_id` and applies the result.
    pub async fn reconcile_session(&self, session_id: &str) -> Result<ReconcileOutcome> {
        match self.stores.sessions.get(session_id).await? {
            None => {
                return Err(LedgerError::NotFound(format!(
                    "checkout session {}",
                    session_id
                )));
            }
            Some(record) if record.applied_to_wallet => return Ok(ReconcileOutcome::AlreadyApplied),
            Some(_) => {}
        }

        let status = self.get_stripe_session_status(session_id).await?;
        self.apply_session_status(session_id, status).await
    }

    /// Applies a session status delivered by polling or by a webhook.
    ///
    /// A completed session credits its owner exactly once: the
    /// `applied_to_wallet` check runs under the session lock and then the
    /// owner's lock, and the credit and the flag are persisted by one
    /// `commit_credit`. Redelivery yields `AlreadyApplied`. An open session
    /// stays pending; only a terminal failure is recorded as failed.
    pub async fn apply_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<ReconcileOutcome> {
        let session_id = session_id.to_string();
        self.commit_detached(move |svc| async move {
            svc.apply_session_locked(&session_id, status).await
        })
        .await
    }

    async fn apply_session_locked(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<ReconcileOutcome> {
        let _session_guard = self.session_locks.lock(&session_id.to_string()).await;

        let mut record = self
            .stores
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("checkout session {}", session_id)))?;

        if record.applied_to_wallet {
            tracing::debug!(session_id, "session already applied");
            return Ok(ReconcileOutcome::AlreadyApplied);
        }

        let user_principal = match status {
            SessionStatus::Open { error } => {
                tracing::debug!(session_id, %error, "checkout session still open");
                return Ok(ReconcileOutcome::NotCompleted { error });
            }
            SessionStatus::Failed { error } => {
                record.status = SessionState::Failed;
                self.stores.sessions.store(record).await?;
                tracing::info!(session_id, %error, "checkout session not completed");
                return Ok(ReconcileOutcome::NotCompleted { error });
            }
            SessionStatus::Completed { user_principal, .. } => user_principal,
        };

        if let Some(reported) = user_principal.as_deref()
            && reported != record.owner.as_str()
        {
            tracing::warn!(session_id, owner = %record.owner, reported, "session owner mismatch");
            return Err(LedgerError::UpstreamPayment(format!(
                "checkout session {} reports principal {}, expected {}",
                session_id, reported, record.owner
            )));
        }

        let owner = record.owner.clone();
        let _user_guard = self.user_locks.lock(&owner).await;

        let mut after = self.require_profile(&owner).await?;
        after.credit(record.amount)?;

        record.status = SessionState::Completed;
        record.applied_to_wallet = true;
        let amount = record.amount;
        if let Err(e) = self.stores.commits.commit_credit(after, record).await {
            tracing::error!(session_id, %owner, error = %e, "credit commit failed, session left unapplied");
            return Err(e);
        }

        tracing::info!(session_id, %owner, amount, "checkout session credited");
        Ok(ReconcileOutcome::Credited { owner, amount })
    }
}
