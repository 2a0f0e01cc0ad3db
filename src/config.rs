use crate::domain::access::AccessPolicy;
use crate::domain::principal::Principal;
use crate::domain::team::{DEFAULT_BUDGET_CAP, DEFAULT_ROSTER_CAP, SquadRules};

/// Runtime configuration for a `LedgerService`.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub squad_rules: SquadRules,
    pub access_policy: AccessPolicy,
    /// Refuse contest entry to callers who have not assembled a team.
    pub require_team_for_join: bool,
    /// Principals granted the admin role when the service starts.
    pub bootstrap_admins: Vec<Principal>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            squad_rules: SquadRules {
                roster_cap: DEFAULT_ROSTER_CAP,
                budget_cap: DEFAULT_BUDGET_CAP,
            },
            access_policy: AccessPolicy::default(),
            require_team_for_join: true,
            bootstrap_admins: Vec::new(),
        }
    }
}

impl LedgerConfig {
    pub fn with_admin(mut self, admin: impl Into<Principal>) -> Self {
        self.bootstrap_admins.push(admin.into());
        self
    }

    pub fn with_open_deposits(mut self, open: bool) -> Self {
        self.access_policy.open_deposits = open;
        self
    }

    pub fn with_team_requirement(mut self, required: bool) -> Self {
        self.require_team_for_join = required;
        self
    }
}
