use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Method tag of directory-resolved DIDs.
pub const PLC_METHOD: &str = "plc";

/// Method tag of well-known-document DIDs.
pub const WEB_METHOD: &str = "web";

/// Method tag of self-certifying DIDs.
pub const KEY_METHOD: &str = "key";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A validated decentralized identifier of the form `did:<method>:<id>`.
///
/// `Did` is an opaque, immutable string identifier. Validation only checks
/// the syntactic shape; whether the DID actually resolves is a question for
/// [`DidResolver`][crate::DidResolver].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Did {
    inner: String,
    method_end: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Did {
    /// Returns the full DID string.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the method tag, e.g. `plc` in `did:plc:abc123`.
    pub fn method(&self) -> &str {
        &self.inner[4..self.method_end]
    }

    /// Returns the method-specific identifier, e.g. `abc123` in `did:plc:abc123`.
    pub fn id(&self) -> &str {
        &self.inner[self.method_end + 1..]
    }

    /// Whether the DID uses the given method tag.
    pub fn is_method(&self, method: &str) -> bool {
        self.method() == method
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> DidResult<Self> {
        let Some(rest) = s.strip_prefix("did:") else {
            return Err(DidError::MalformedDid(s.to_string()));
        };

        let Some(colon) = rest.find(':') else {
            return Err(DidError::MalformedDid(s.to_string()));
        };

        let (method, id) = (&rest[..colon], &rest[colon + 1..]);
        if method.is_empty()
            || id.is_empty()
            || !method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DidError::MalformedDid(s.to_string()));
        }

        Ok(Did {
            inner: s.to_string(),
            method_end: 4 + colon,
        })
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl TryFrom<&str> for Did {
    type Error = DidError;

    fn try_from(s: &str) -> DidResult<Self> {
        s.parse()
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(s: String) -> DidResult<Self> {
        s.parse()
    }
}

impl Serialize for Did {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_parse() -> anyhow::Result<()> {
        let did: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        assert_eq!(did.method(), "plc");
        assert_eq!(did.id(), "ewvi7nxzyoun6zhxrhs64oiz");
        assert!(did.is_method(PLC_METHOD));

        let did: Did = "did:web:example.com".parse()?;
        assert_eq!(did.method(), "web");
        assert_eq!(did.id(), "example.com");

        // The method-specific id may itself contain colons.
        let did: Did = "did:web:example.com:alice".parse()?;
        assert_eq!(did.id(), "example.com:alice");

        Ok(())
    }

    #[test]
    fn test_did_parse_rejects_malformed() {
        for s in ["", "did:", "did:plc", "did::abc", "not-a-did", "did:PLC:abc"] {
            assert!(s.parse::<Did>().is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_did_serde_as_string() -> anyhow::Result<()> {
        let did: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;

        let serialized = serde_json::to_string(&did)?;
        assert_eq!(serialized, "\"did:plc:ewvi7nxzyoun6zhxrhs64oiz\"");

        let deserialized: Did = serde_json::from_str(&serialized)?;
        assert_eq!(did, deserialized);

        Ok(())
    }
}
