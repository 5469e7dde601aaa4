use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::KeyError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Signature algorithm tag carried in signed token headers.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// EdDSA over ed25519.
    #[serde(rename = "EdDSA")]
    EdDSA,

    /// ECDSA using P-256 and SHA-256.
    #[serde(rename = "ES256")]
    ES256,

    /// ECDSA using secp256k1 and SHA-256.
    #[serde(rename = "ES256K")]
    ES256K,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::EdDSA => write!(f, "EdDSA"),
            Algorithm::ES256 => write!(f, "ES256"),
            Algorithm::ES256K => write!(f, "ES256K"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdDSA" => Ok(Algorithm::EdDSA),
            "ES256" => Ok(Algorithm::ES256),
            "ES256K" => Ok(Algorithm::ES256K),
            s => Err(KeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}
