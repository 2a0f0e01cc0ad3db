use super::principal::Principal;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// One line of a checkout cart.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ShoppingItem {
    pub product_name: String,
    pub product_description: String,
    pub quantity: u64,
    pub price_in_cents: u64,
    pub currency: String,
}

/// Sums a cart into the amount the wallet is credited once the session
/// completes.
///
/// Rejects empty carts, zero quantities or prices, and carts mixing
/// currencies.
pub fn cart_total(items: &[ShoppingItem]) -> Result<u64> {
    let first = items
        .first()
        .ok_or_else(|| LedgerError::InvalidInput("Checkout cart is empty".to_string()))?;

    let mut total: u64 = 0;
    for item in items {
        if item.quantity == 0 || item.price_in_cents == 0 {
            return Err(LedgerError::InvalidInput(format!(
                "Item '{}' must have a positive quantity and price",
                item.product_name
            )));
        }
        if !item.currency.eq_ignore_ascii_case(&first.currency) {
            return Err(LedgerError::InvalidInput(
                "All items must share one currency".to_string(),
            ));
        }
        let line = item
            .quantity
            .checked_mul(item.price_in_cents)
            .ok_or_else(|| LedgerError::Overflow("cart line total".to_string()))?;
        total = total
            .checked_add(line)
            .ok_or_else(|| LedgerError::Overflow("cart total".to_string()))?;
    }
    Ok(total)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct StripeConfiguration {
    pub secret_key: String,
    pub allowed_countries: Vec<String>,
}

/// Handle returned to the client to redirect into the hosted checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Upstream view of a checkout session.
///
/// `Open` covers every state that may still end in a payment: the customer
/// has not finished checkout, or the payment method settles later.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionStatus {
    Completed {
        user_principal: Option<String>,
        response: String,
    },
    Open {
        error: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Local bookkeeping for a checkout session created through the ledger.
///
/// `applied_to_wallet` only ever moves from `false` to `true`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SessionRecord {
    pub session_id: String,
    pub owner: Principal,
    /// Amount in cents credited to `owner` on completion.
    pub amount: u64,
    pub status: SessionState,
    pub applied_to_wallet: bool,
}

impl SessionRecord {
    pub fn pending(session_id: String, owner: Principal, amount: u64) -> Self {
        Self {
            session_id,
            owner,
            amount,
            status: SessionState::Pending,
            applied_to_wallet: false,
        }
    }
}

/// Result of reconciling one session against the wallet.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReconcileOutcome {
    Credited { owner: Principal, amount: u64 },
    AlreadyApplied,
    NotCompleted { error: String },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: Vec<HttpHeader>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TransformationInput {
    pub context: Vec<u8>,
    pub response: HttpResponse,
}

pub type TransformationOutput = HttpResponse;

/// Normalizes an upstream response so that replicas issuing the same call
/// agree on it. Status and body pass through; all headers are dropped since
/// the processor stamps request ids and dates on every response.
pub fn transform(input: TransformationInput) -> TransformationOutput {
    HttpResponse {
        status: input.response.status,
        body: input.response.body,
        headers: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u64, price: u64, currency: &str) -> ShoppingItem {
        ShoppingItem {
            product_name: "Wallet Deposit".to_string(),
            product_description: "Add funds".to_string(),
            quantity,
            price_in_cents: price,
            currency: currency.to_string(),
        }
    }

    #[test]
    fn test_cart_total() {
        let items = vec![item(2, 500, "usd"), item(1, 250, "USD")];
        assert_eq!(cart_total(&items).unwrap(), 1250);
    }

    #[test]
    fn test_cart_rejections() {
        assert!(matches!(cart_total(&[]), Err(LedgerError::InvalidInput(_))));
        assert!(matches!(
            cart_total(&[item(0, 500, "usd")]),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            cart_total(&[item(1, 500, "usd"), item(1, 500, "eur")]),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            cart_total(&[item(u64::MAX, 2, "usd")]),
            Err(LedgerError::Overflow(_))
        ));
    }

    #[test]
    fn test_transform_strips_headers() {
        let make = |request_id: &str| TransformationInput {
            context: vec![1, 2, 3],
            response: HttpResponse {
                status: 200,
                body: b"{\"id\":\"cs_1\"}".to_vec(),
                headers: vec![
                    HttpHeader {
                        name: "Request-Id".to_string(),
                        value: request_id.to_string(),
                    },
                    HttpHeader {
                        name: "Date".to_string(),
                        value: "Mon, 19 Oct 2026 10:00:00 GMT".to_string(),
                    },
                ],
            },
        };

        let a = transform(make("req_a"));
        let b = transform(make("req_b"));
        assert_eq!(a, b);
        assert!(a.headers.is_empty());
        assert_eq!(a.status, 200);
        assert_eq!(a.body, b"{\"id\":\"cs_1\"}".to_vec());
    }

    #[test]
    fn test_session_status_tagging() {
        let status = SessionStatus::Failed {
            error: "expired".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"kind":"failed","error":"expired"}"#);
    }
}
