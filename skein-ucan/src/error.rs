//! Error types of the skein-ucan crate.

use skein_did::Did;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for capability operations.
pub type UcanResult<T> = Result<T, UcanError>;

/// Defines the types of errors that can occur in capability operations.
#[derive(Debug, Error)]
pub enum UcanError {
    /// The compact token encoding does not have the expected shape.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The token declares a version this implementation does not speak.
    #[error("Unsupported token version: {0}")]
    UnsupportedVersion(String),

    /// The ability string is not a known level.
    #[error("Invalid ability: {0}")]
    InvalidAbility(String),

    /// The resource URI cannot be parsed.
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Rejection: the token's signature does not verify against the
    /// issuer's resolved signing key.
    #[error("Invalid signature from issuer {0}")]
    SignatureInvalid(Did),

    /// Rejection: the token's expiry has passed.
    #[error("Token expired at {expires_at}, now {now}")]
    Expired {
        /// Expiry of the token, seconds since the epoch.
        expires_at: u64,
        /// The instant the check ran, seconds since the epoch.
        now: u64,
    },

    /// Rejection: the token is not valid yet.
    #[error("Token not valid before {not_before}, now {now}")]
    NotYetValid {
        /// Start of the token's validity window, seconds since the epoch.
        not_before: u64,
        /// The instant the check ran, seconds since the epoch.
        now: u64,
    },

    /// Rejection: the token was minted for a different audience.
    #[error("Wrong audience: expected {expected}, found {found}")]
    WrongAudience {
        /// The audience the verifier expected.
        expected: Did,
        /// The audience named by the token.
        found: Did,
    },

    /// Rejection: an embedded proof was not minted for this link's issuer.
    #[error("Broken chain link: proof audience {proof_audience} is not issuer {issuer}")]
    BrokenChainLink {
        /// The issuer of the dependent token.
        issuer: Did,
        /// The audience of the proof it embedded.
        proof_audience: Did,
    },

    /// Rejection: a link's resource is not contained in what its proofs
    /// grant.
    #[error("Issuer {issuer} has no resource authority for {capability}")]
    DelegationResourceViolation {
        /// The issuer of the offending link.
        issuer: Did,
        /// The capability the link tried to delegate.
        capability: String,
    },

    /// Rejection: a link's ability exceeds what its proofs grant.
    #[error("Issuer {issuer} escalates ability for {capability}")]
    DelegationAbilityViolation {
        /// The issuer of the offending link.
        issuer: Did,
        /// The capability the link tried to delegate.
        capability: String,
    },

    /// Rejection: the verified token does not cover the required
    /// capability.
    #[error("Token does not cover required capability {0}")]
    CapabilityNotCovered(String),

    /// The store holds no proof covering the requested capability.
    #[error("No proof found for capability {0}")]
    ProofNotFound(String),

    /// DID resolution errors surfaced during verification.
    #[error(transparent)]
    DidError(#[from] skein_did::DidError),

    /// Key errors.
    #[error("Key error: {0}")]
    KeyError(#[from] skein_key::KeyError),

    /// Base64 decoding errors in the compact token encoding.
    #[error("Base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Json (de)serialization errors.
    #[error("Json serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl UcanError {
    /// Whether the error is an expected verification rejection rather than
    /// an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            UcanError::SignatureInvalid(_)
                | UcanError::Expired { .. }
                | UcanError::NotYetValid { .. }
                | UcanError::WrongAudience { .. }
                | UcanError::BrokenChainLink { .. }
                | UcanError::DelegationResourceViolation { .. }
                | UcanError::DelegationAbilityViolation { .. }
                | UcanError::CapabilityNotCovered(_)
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `UcanResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> UcanResult<T> {
    Result::Ok(value)
}
