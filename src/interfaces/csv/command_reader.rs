use crate::domain::access::UserRole;
use crate::domain::player::Player;
use crate::domain::payment::StripeConfiguration;
use crate::domain::principal::Principal;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io::Read;
use std::str::FromStr;

/// One operation requested by a script row.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { name: String },
    AddPlayer(Player),
    CreateTeam { player_ids: Vec<u64> },
    CreateContest { name: String, entry_fee: u64, prize_pool: u64 },
    Join { contest_id: u64 },
    Deposit { amount: u64 },
    Award { user: Principal, amount: u64 },
    AssignRole { user: Principal, role: UserRole },
    ConfigureStripe(StripeConfiguration),
    Checkout { amount: u64 },
    CompleteSession { session_id: String },
    FailSession { session_id: String, reason: String },
    Reconcile { session_id: String },
}

/// A parsed script row: who is calling and what they ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub caller: Principal,
    pub command: Command,
}

/// Parses a money column written in currency units ("12.50") into cents.
pub fn parse_cents(raw: &str) -> Result<u64> {
    let value = Decimal::from_str(raw)
        .map_err(|e| LedgerError::InvalidInput(format!("bad amount '{}': {}", raw, e)))?;
    if value.is_sign_negative() || value.scale() > 2 {
        return Err(LedgerError::InvalidInput(format!(
            "amount '{}' must be non-negative with at most two decimals",
            raw
        )));
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_u64())
        .ok_or_else(|| LedgerError::Overflow(format!("amount '{}'", raw)))
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidInput(format!("bad id '{}'", raw)))
}

struct Args<'a> {
    command: &'a str,
    values: Vec<&'a str>,
}

// Positions are fixed; a blank column counts as a missing argument.
impl<'a> Args<'a> {
    fn opt(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).copied().filter(|v| !v.is_empty())
    }

    fn get(&self, index: usize, what: &str) -> Result<&'a str> {
        self.opt(index).ok_or_else(|| {
            LedgerError::InvalidInput(format!("{} needs a {} argument", self.command, what))
        })
    }

    fn rest(&self, from: usize) -> Vec<&'a str> {
        self.values
            .get(from..)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|v| !v.is_empty())
            .collect()
    }
}

impl TryFrom<&csv::StringRecord> for ScriptLine {
    type Error = LedgerError;

    fn try_from(record: &csv::StringRecord) -> Result<Self> {
        let mut fields = record.iter();
        let caller = match fields.next() {
            Some(caller) if !caller.is_empty() => Principal::from(caller),
            _ => return Err(LedgerError::InvalidInput("missing caller".to_string())),
        };
        let command = fields
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LedgerError::InvalidInput("missing command".to_string()))?;
        let args = Args {
            command,
            values: fields.collect(),
        };

        let command = match command {
            "register" => Command::Register {
                name: args.get(0, "name")?.to_string(),
            },
            "add_player" => Command::AddPlayer(Player {
                id: parse_id(args.get(0, "player id")?)?,
                name: args.get(1, "name")?.to_string(),
                team: args.get(2, "club")?.to_string(),
                position: args.get(3, "position")?.parse()?,
                price: parse_cents(args.get(4, "price")?)?,
                form: match args.opt(5) {
                    Some(form) => form
                        .parse()
                        .map_err(|_| LedgerError::InvalidInput(format!("bad form '{}'", form)))?,
                    None => 0,
                },
            }),
            "create_team" => Command::CreateTeam {
                player_ids: args
                    .rest(0)
                    .iter()
                    .map(|id| parse_id(id))
                    .collect::<Result<_>>()?,
            },
            "create_contest" => Command::CreateContest {
                name: args.get(0, "name")?.to_string(),
                entry_fee: parse_cents(args.get(1, "entry fee")?)?,
                prize_pool: parse_cents(args.get(2, "prize pool")?)?,
            },
            "join" => Command::Join {
                contest_id: parse_id(args.get(0, "contest id")?)?,
            },
            "deposit" => Command::Deposit {
                amount: parse_cents(args.get(0, "amount")?)?,
            },
            "award" => Command::Award {
                user: Principal::from(args.get(0, "user")?),
                amount: parse_cents(args.get(1, "amount")?)?,
            },
            "assign_role" => Command::AssignRole {
                user: Principal::from(args.get(0, "user")?),
                role: args.get(1, "role")?.parse()?,
            },
            "configure_stripe" => Command::ConfigureStripe(StripeConfiguration {
                secret_key: args.get(0, "secret key")?.to_string(),
                allowed_countries: args.rest(1).iter().map(|c| c.to_string()).collect(),
            }),
            "checkout" => Command::Checkout {
                amount: parse_cents(args.get(0, "amount")?)?,
            },
            "complete_session" => Command::CompleteSession {
                session_id: args.get(0, "session id")?.to_string(),
            },
            "fail_session" => Command::FailSession {
                session_id: args.get(0, "session id")?.to_string(),
                reason: args.opt(1).unwrap_or("payment failed").to_string(),
            },
            "reconcile" => Command::Reconcile {
                session_id: args.get(0, "session id")?.to_string(),
            },
            other => {
                return Err(LedgerError::InvalidInput(format!(
                    "unknown command '{}'",
                    other
                )));
            }
        };

        Ok(ScriptLine { caller, command })
    }
}

/// Reads ledger commands from a CSV script.
///
/// The first row is a header. Each following row is
/// `caller, command, args...`; rows may have any number of argument columns
/// and surrounding whitespace is ignored. Lines starting with `#` are skipped.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(source);
        Self { reader }
    }

    /// Lazily parses rows. A malformed row yields an error without ending
    /// the stream.
    pub fn commands(self) -> impl Iterator<Item = Result<ScriptLine>> {
        self.reader.into_records().map(|record| {
            let record = record?;
            ScriptLine::try_from(&record)
        })
    }
}
