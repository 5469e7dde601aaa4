//! Error types of the skein-key crate.

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Defines the types of errors that can occur in key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Signature creation or verification failed.
    #[error("Signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    /// The public key bytes are not a valid point for the suite.
    #[error("Invalid public key bytes for {0}")]
    InvalidPublicKey(&'static str),

    /// The private key bytes are not a valid scalar for the suite.
    #[error("Invalid private key bytes for {0}")]
    InvalidPrivateKey(&'static str),

    /// Unsupported signature algorithm name.
    #[error("Unsupported algorithm name: {0}")]
    UnsupportedAlgorithm(String),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `KeyResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> KeyResult<T> {
    Result::Ok(value)
}
