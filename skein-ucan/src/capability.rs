use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{AbilityLevel, Resource};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A permission: an ability level over a resource pointer.
///
/// Compared structurally. On the wire a capability is the claim
/// `{"with": "<resource uri>", "can": "<ability>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    /// The records the permission applies to.
    pub resource: Resource,

    /// The level of access granted over them.
    pub ability: AbilityLevel,
}

#[derive(Serialize, Deserialize)]
struct CapabilitySerde {
    with: String,
    can: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Capability {
    /// Creates a capability.
    pub fn new(resource: Resource, ability: AbilityLevel) -> Self {
        Capability { resource, ability }
    }

    /// Returns the next broader capability by widening the resource, or
    /// `None` when the resource is already at its broadest form. The
    /// ability level is unchanged.
    pub fn vaguer(&self) -> Option<Capability> {
        self.resource.vaguer().map(|resource| Capability {
            resource,
            ability: self.ability,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.resource, self.ability)
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CapabilitySerde {
            with: self.resource.to_string(),
            can: self.ability.to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let claim = CapabilitySerde::deserialize(deserializer)?;

        let resource = Resource::from_str(&claim.with).map_err(serde::de::Error::custom)?;
        let ability = AbilityLevel::from_str(&claim.can).map_err(serde::de::Error::custom)?;

        Ok(Capability { resource, ability })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::Segment;

    use super::*;

    #[test]
    fn test_capability_claim_roundtrip() -> anyhow::Result<()> {
        let capability = Capability::new(
            Resource::new(
                "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?,
                Segment::exact("posts"),
                Segment::Wildcard,
            ),
            AbilityLevel::Write,
        );

        let json = serde_json::to_string(&capability)?;
        assert_eq!(
            json,
            r#"{"with":"at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/posts/*","can":"WRITE"}"#
        );

        let decoded: Capability = serde_json::from_str(&json)?;
        assert_eq!(decoded, capability);

        Ok(())
    }

    #[test]
    fn test_capability_claim_rejects_unknown_ability() {
        let json = r#"{"with":"at://did:plc:abc/posts/*","can":"ADMIN"}"#;
        assert!(serde_json::from_str::<Capability>(json).is_err());
    }

    #[test]
    fn test_vaguer_preserves_ability() -> anyhow::Result<()> {
        let capability = Capability::new(
            Resource::new(
                "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?,
                Segment::exact("posts"),
                Segment::exact("abc"),
            ),
            AbilityLevel::SuperUser,
        );

        let wider = capability.vaguer().expect("widens");
        assert_eq!(wider.ability, AbilityLevel::SuperUser);
        assert!(wider.resource.record.is_wildcard());

        Ok(())
    }
}
