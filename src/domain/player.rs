use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl FromStr for Position {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "goalkeeper" | "gk" => Ok(Self::Goalkeeper),
            "defender" | "def" => Ok(Self::Defender),
            "midfielder" | "mid" => Ok(Self::Midfielder),
            "forward" | "fwd" => Ok(Self::Forward),
            other => Err(LedgerError::InvalidInput(format!(
                "Unknown position '{}'",
                other
            ))),
        }
    }
}

/// Catalog entry for a real-world player that can be picked into a squad.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub team: String,
    pub position: Position,
    /// Price in cents.
    pub price: u64,
    pub form: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("Forward".parse::<Position>().unwrap(), Position::Forward);
        assert_eq!("gk".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert!(matches!(
            "striker".parse::<Position>(),
            Err(LedgerError::InvalidInput(_))
        ));
    }
}
