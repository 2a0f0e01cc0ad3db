use clap::Parser;
use contest_ledger::application::service::LedgerService;
use contest_ledger::config::LedgerConfig;
use contest_ledger::domain::ports::{PaymentProviderBox, Stores};
use contest_ledger::domain::team::{DEFAULT_BUDGET_CAP, DEFAULT_ROSTER_CAP, SquadRules};
use contest_ledger::infrastructure::in_memory::{InMemoryStore, SimulatedPaymentProvider};
use contest_ledger::infrastructure::stripe::StripeClient;
use contest_ledger::interfaces::csv::command_reader::CommandReader;
use contest_ledger::interfaces::csv::report_writer::ReportWriter;
use contest_ledger::interfaces::script::ScriptRunner;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command script CSV file (`caller, command, args...`)
    script: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CONTEST_LEDGER_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Principal granted the admin role at startup. Repeatable.
    #[arg(long = "admin", env = "CONTEST_LEDGER_ADMINS", value_delimiter = ',')]
    admins: Vec<String>,

    /// Let regular users credit their own wallet with `deposit`.
    #[arg(long, env = "CONTEST_LEDGER_OPEN_DEPOSITS")]
    open_deposits: bool,

    /// Allow joining contests without having assembled a team.
    #[arg(long, env = "CONTEST_LEDGER_ALLOW_TEAMLESS_JOIN")]
    allow_teamless_join: bool,

    /// Maximum players per team.
    #[arg(long, env = "CONTEST_LEDGER_ROSTER_CAP", default_value_t = DEFAULT_ROSTER_CAP)]
    roster_cap: usize,

    /// Maximum total team price, in cents.
    #[arg(long, env = "CONTEST_LEDGER_BUDGET_CAP", default_value_t = DEFAULT_BUDGET_CAP)]
    budget_cap: u64,

    /// Talk to a real Stripe-compatible API at this base URL instead of the
    /// in-process simulator.
    #[arg(long, env = "CONTEST_LEDGER_STRIPE_API_BASE")]
    stripe_api_base: Option<String>,
}

impl Cli {
    fn ledger_config(&self) -> LedgerConfig {
        let mut config = LedgerConfig::default()
            .with_open_deposits(self.open_deposits)
            .with_team_requirement(!self.allow_teamless_join);
        config.squad_rules = SquadRules {
            roster_cap: self.roster_cap,
            budget_cap: self.budget_cap,
        };
        self.admins
            .iter()
            .filter(|admin| !admin.trim().is_empty())
            .fold(config, |config, admin| config.with_admin(admin.trim()))
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use contest_ledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using RocksDB storage");
            Ok(RocksDBStore::open(path)?.stores())
        }
        None => Ok(InMemoryStore::new().stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        tracing::warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(InMemoryStore::new().stores())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let config = cli.ledger_config();
    let stores = open_stores(cli.db_path.clone())?;

    let mut simulator = None;
    let payments: PaymentProviderBox = match &cli.stripe_api_base {
        Some(base) => {
            tracing::info!(api_base = %base, "using Stripe payment processor");
            Box::new(StripeClient::new(base.as_str()))
        }
        None => {
            let provider = SimulatedPaymentProvider::new();
            simulator = Some(provider.clone());
            Box::new(provider)
        }
    };

    let service = LedgerService::new(stores, payments, config).await?;
    let runner = ScriptRunner::new(service, simulator);

    let file = File::open(&cli.script).into_diagnostic()?;
    let reader = CommandReader::new(file);
    // Row 1 is the header.
    for (index, line) in reader.commands().enumerate() {
        let row = index + 2;
        match line {
            Ok(line) => {
                let caller = line.caller.clone();
                if let Err(e) = runner.execute(line).await {
                    tracing::warn!(row, %caller, error = %e, "command rejected");
                }
            }
            Err(e) => {
                tracing::warn!(row, error = %e, "malformed script row");
            }
        }
    }

    let profiles = runner.service().list_profiles().await?;
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_profiles(&profiles)?;

    Ok(())
}
