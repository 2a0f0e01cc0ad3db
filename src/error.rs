use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every failure the ledger reports to a caller.
///
/// Variants carry a human readable message; the variant itself is the
/// machine readable kind.
#[derive(Error, Debug, Diagnostic)]
pub enum LedgerError {
    #[error("Unauthorized: {0}")]
    #[diagnostic(code(ledger::unauthorized))]
    Unauthorized(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(ledger::not_found))]
    NotFound(String),

    #[error("Already exists: {0}")]
    #[diagnostic(code(ledger::already_exists))]
    AlreadyExists(String),

    #[error("Caller is already registered")]
    #[diagnostic(code(ledger::already_registered))]
    AlreadyRegistered,

    #[error("Caller already joined contest {0}")]
    #[diagnostic(code(ledger::already_joined))]
    AlreadyJoined(u64),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(ledger::invalid_input))]
    InvalidInput(String),

    #[error("Unknown player: {0}")]
    #[diagnostic(code(ledger::unknown_player))]
    UnknownPlayer(u64),

    #[error("Budget exceeded: team costs {total}, budget is {budget}")]
    #[diagnostic(code(ledger::budget_exceeded))]
    BudgetExceeded { total: u64, budget: u64 },

    #[error("Insufficient funds: required {required}, available {available}")]
    #[diagnostic(code(ledger::insufficient_funds))]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Arithmetic overflow: {0}")]
    #[diagnostic(code(ledger::overflow))]
    Overflow(String),

    #[error("Stripe is not configured")]
    #[diagnostic(
        code(ledger::stripe_not_configured),
        help("an admin must call set_stripe_configuration first")
    )]
    StripeNotConfigured,

    #[error("Upstream payment error: {0}")]
    #[diagnostic(code(ledger::upstream_payment))]
    UpstreamPayment(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(ledger::storage))]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger::io))]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        Self::storage(err)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(err)
    }
}
