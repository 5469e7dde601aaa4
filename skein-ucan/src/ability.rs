use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::UcanError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The level of access a capability grants over its resource.
///
/// Levels form a total order; a higher level subsumes every lower one, so a
/// `Write` grant also satisfies a `Maintenance` requirement. The set is
/// closed: unknown ability strings are rejected at parse time rather than
/// ranked at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityLevel {
    /// Account upkeep operations that do not touch user records.
    Maintenance,

    /// Creating, updating and deleting records.
    Write,

    /// Full control, including destructive account-level operations.
    SuperUser,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AbilityLevel {
    /// Whether a held level satisfies a required one.
    pub fn satisfies(self, required: AbilityLevel) -> bool {
        self >= required
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for AbilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AbilityLevel::Maintenance => "MAINTENANCE",
            AbilityLevel::Write => "WRITE",
            AbilityLevel::SuperUser => "SUPER_USER",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AbilityLevel {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAINTENANCE" => Ok(AbilityLevel::Maintenance),
            "WRITE" => Ok(AbilityLevel::Write),
            "SUPER_USER" => Ok(AbilityLevel::SuperUser),
            _ => Err(UcanError::InvalidAbility(s.to_string())),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_total_order() {
        assert!(AbilityLevel::Maintenance < AbilityLevel::Write);
        assert!(AbilityLevel::Write < AbilityLevel::SuperUser);

        assert!(AbilityLevel::SuperUser.satisfies(AbilityLevel::Maintenance));
        assert!(AbilityLevel::Write.satisfies(AbilityLevel::Write));
        assert!(!AbilityLevel::Maintenance.satisfies(AbilityLevel::Write));
    }

    #[test]
    fn test_ability_wire_strings() -> anyhow::Result<()> {
        for (level, s) in [
            (AbilityLevel::Maintenance, "MAINTENANCE"),
            (AbilityLevel::Write, "WRITE"),
            (AbilityLevel::SuperUser, "SUPER_USER"),
        ] {
            assert_eq!(level.to_string(), s);
            assert_eq!(s.parse::<AbilityLevel>()?, level);
        }

        assert!("ADMIN".parse::<AbilityLevel>().is_err());
        assert!("write".parse::<AbilityLevel>().is_err());

        Ok(())
    }
}
