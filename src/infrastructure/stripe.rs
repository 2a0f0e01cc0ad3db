//! Stripe Checkout integration

use crate::domain::payment::{
    CheckoutSession, SessionStatus, ShoppingItem, StripeConfiguration,
};
use crate::domain::ports::PaymentProvider;
use crate::domain::principal::Principal;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Stripe API client
#[derive(Debug, Clone)]
pub struct StripeClient {
    api_base: String,
    client: reqwest::Client,
}

/// The subset of a Stripe checkout session object the ledger reads.
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    client_reference_id: Option<String>,
}

fn upstream(err: reqwest::Error) -> LedgerError {
    LedgerError::UpstreamPayment(err.to_string())
}

/// Form fields for `POST /v1/checkout/sessions`.
fn checkout_form(
    config: &StripeConfiguration,
    owner: &Principal,
    items: &[ShoppingItem],
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
        ("client_reference_id".to_string(), owner.to_string()),
    ];

    for (i, item) in items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        form.push((
            format!("{}[price_data][currency]", prefix),
            item.currency.to_ascii_lowercase(),
        ));
        form.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.product_name.clone(),
        ));
        if !item.product_description.is_empty() {
            form.push((
                format!("{}[price_data][product_data][description]", prefix),
                item.product_description.clone(),
            ));
        }
        form.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.price_in_cents.to_string(),
        ));
        form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    for (i, country) in config.allowed_countries.iter().enumerate() {
        form.push((
            format!("shipping_address_collection[allowed_countries][{}]", i),
            country.clone(),
        ));
    }

    form
}

/// Maps a session object to the ledger's view of it.
fn interpret_session(body: &str) -> Result<SessionStatus> {
    let session: StripeSession = serde_json::from_str(body).map_err(|e| {
        LedgerError::UpstreamPayment(format!("Unparseable checkout session: {}", e))
    })?;

    let status = session.status.as_deref().unwrap_or("unknown");
    let payment_status = session.payment_status.as_deref().unwrap_or("unknown");
    let error = format!(
        "checkout session {} is {} with payment {}",
        session.id, status, payment_status
    );

    // Only settled funds count; `complete` + `unpaid` is a delayed payment.
    match (status, payment_status) {
        (_, "paid") | ("complete", "no_payment_required") => Ok(SessionStatus::Completed {
            user_principal: session.client_reference_id,
            response: body.to_string(),
        }),
        ("open", _) | ("complete", _) => Ok(SessionStatus::Open { error }),
        _ => Ok(SessionStatus::Failed { error }),
    }
}

impl StripeClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(upstream)?;
        if !status.is_success() {
            tracing::error!(%status, "Stripe API error");
            return Err(LedgerError::UpstreamPayment(format!(
                "Stripe returned {}: {}",
                status, body
            )));
        }
        Ok(body)
    }
}

impl Default for StripeClient {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPE_API_BASE)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        config: &StripeConfiguration,
        owner: &Principal,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let form = checkout_form(config, owner, items, success_url, cancel_url);
        tracing::debug!(%owner, lines = items.len(), "creating Stripe checkout session");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(upstream)?;
        let body = Self::read_body(response).await?;

        let session: StripeSession = serde_json::from_str(&body).map_err(|e| {
            LedgerError::UpstreamPayment(format!("Unparseable checkout session: {}", e))
        })?;
        let url = session.url.ok_or_else(|| {
            LedgerError::UpstreamPayment("Checkout session has no url".to_string())
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn session_status(
        &self,
        config: &StripeConfiguration,
        session_id: &str,
    ) -> Result<SessionStatus> {
        let url = format!("{}/v1/checkout/sessions/{}", self.api_base, session_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&config.secret_key)
            .send()
            .await
            .map_err(upstream)?;
        let body = Self::read_body(response).await?;
        interpret_session(&body)
    }
}
