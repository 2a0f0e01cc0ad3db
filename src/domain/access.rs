use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        };
        f.write_str(s)
    }
}

impl FromStr for UserRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            other => Err(LedgerError::InvalidInput(format!(
                "Unknown role '{}'",
                other
            ))),
        }
    }
}

/// Operations gated by the caller's role.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operation {
    ReadCatalog,
    ManageCatalog,
    AssembleTeam,
    CreateContest,
    JoinContest,
    Deposit,
    AwardPrize,
    Checkout,
    ConfigurePayments,
    AssignRole,
    ViewOtherProfile,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decides which role may perform which operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Lets any registered user credit their own wallet directly, bypassing
    /// the payment processor.
    pub open_deposits: bool,
}

impl AccessPolicy {
    pub fn allows(&self, role: UserRole, op: Operation) -> bool {
        match op {
            Operation::ManageCatalog
            | Operation::CreateContest
            | Operation::AwardPrize
            | Operation::ConfigurePayments
            | Operation::AssignRole
            | Operation::ViewOtherProfile => role == UserRole::Admin,
            Operation::ReadCatalog
            | Operation::AssembleTeam
            | Operation::JoinContest
            | Operation::Checkout => matches!(role, UserRole::Admin | UserRole::User),
            Operation::Deposit => match role {
                UserRole::Admin => true,
                UserRole::User => self.open_deposits,
                UserRole::Guest => false,
            },
        }
    }

    pub fn authorize(&self, role: UserRole, op: Operation) -> Result<()> {
        if self.allows(role, op) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(format!(
                "role '{}' may not perform {}",
                role, op
            )))
        }
    }
}
