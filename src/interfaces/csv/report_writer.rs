use crate::domain::access::UserRole;
use crate::domain::profile::UserProfile;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ReportRow<'a> {
    user: &'a str,
    name: &'a str,
    role: UserRole,
    balance: String,
}

/// Writes the end-of-run wallet report as `user,name,role,balance`.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_profiles(&mut self, profiles: &[(UserProfile, UserRole)]) -> Result<()> {
        if profiles.is_empty() {
            self.writer
                .write_record(["user", "name", "role", "balance"])?;
        }
        for (profile, role) in profiles {
            self.writer.serialize(ReportRow {
                user: profile.owner.as_str(),
                name: &profile.name,
                role: *role,
                balance: profile.balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use crate::domain::principal::Principal;

    fn render(profiles: &[(UserProfile, UserRole)]) -> String {
        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_profiles(profiles).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_format() {
        let mut alice = UserProfile::new(Principal::from("alice"), "Alice".to_string());
        alice.balance = Balance::from_cents(505);
        let bob = UserProfile::new(Principal::from("bob"), "Bob, Jr".to_string());

        let out = render(&[(alice, UserRole::Admin), (bob, UserRole::User)]);
        assert_eq!(
            out,
            "user,name,role,balance\nalice,Alice,admin,5.05\nbob,\"Bob, Jr\",user,0.00\n"
        );
    }

    #[test]
    fn test_empty_report_has_header() {
        assert_eq!(render(&[]), "user,name,role,balance\n");
    }
}
