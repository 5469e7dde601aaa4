//! Error types of the skein-did crate.

use thiserror::Error;

use crate::Did;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for DID operations.
pub type DidResult<T> = Result<T, DidError>;

/// Defines the types of errors that can occur in DID operations.
#[derive(Debug, Error)]
pub enum DidError {
    /// The DID string does not have the `did:<method>:<id>` shape.
    #[error("Malformed DID: {0}")]
    MalformedDid(String),

    /// No resolver is registered for the DID's method.
    #[error("Unsupported DID method: {0}")]
    UnsupportedMethod(String),

    /// `did:web` identifiers with embedded path segments are not resolvable.
    #[error("Unsupported path-scoped did:web identifier: {0}")]
    UnsupportedPathScopedWeb(String),

    /// Definitive negative resolution. The DID does not exist upstream.
    #[error("DID not found: {0}")]
    NotFound(Did),

    /// Non-2xx, non-404 response from the upstream host. Safe to retry.
    #[error("Transient resolution failure for {did}: HTTP {status}")]
    TransientHttp {
        /// The DID being resolved.
        did: Did,
        /// The HTTP status returned by the upstream host.
        status: u16,
    },

    /// The network request failed before a response was received. Safe to retry.
    #[error("Network failure resolving {0}: {1}")]
    Network(Did, String),

    /// The resolution did not complete within the configured timeout.
    #[error("Timed out resolving {0}")]
    Timeout(Did),

    /// The resolved document failed schema or identity-match checks.
    #[error("Invalid DID document: {0}")]
    DocumentInvalid(String),

    /// The document has no usable signing key.
    #[error("No signing key in document for {0}")]
    MissingSigningKey(Did),

    /// The document's signing key cannot be decoded.
    #[error("Invalid signing key in document for {0}")]
    InvalidSigningKey(Did),

    /// The document declares no handle alias.
    #[error("No handle in document for {0}")]
    MissingHandle(Did),

    /// The document declares no personal data server endpoint.
    #[error("No personal data server endpoint in document for {0}")]
    MissingPdsEndpoint(Did),

    /// The multikey's multicodec prefix names a suite the registry does not know.
    #[error("Unsupported key suite prefix: {0:#04x} {1:#04x}")]
    UnsupportedKeySuite(u8, u8),

    /// Multibase decoding errors.
    #[error("Multibase decoding error: {0}")]
    MultibaseError(#[from] multibase::Error),

    /// Key errors.
    #[error("Key error: {0}")]
    KeyError(#[from] skein_key::KeyError),

    /// Json (de)serialization errors.
    #[error("Json serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The cache was configured with `stale_ttl` greater than `max_ttl`.
    #[error("Invalid cache TTL bounds: stale {stale_ms}ms > max {max_ms}ms")]
    InvalidTtlBounds {
        /// The configured staleness TTL in milliseconds.
        stale_ms: u64,
        /// The configured expiry TTL in milliseconds.
        max_ms: u64,
    },

    /// The HTTP client could not be constructed.
    #[error("Http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Io error.
    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Toml deserialization error.
    #[error("Toml deserialization error: {0}")]
    TomlError(#[from] toml::de::Error),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DidError {
    /// Whether the error is a definitive negative resolution rather than a
    /// failure to reach the upstream host.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DidError::NotFound(_))
    }

    /// Whether the caller may retry the resolution later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DidError::TransientHttp { .. } | DidError::Network(..) | DidError::Timeout(_)
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `DidResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> DidResult<T> {
    Result::Ok(value)
}
