use rand_core::CryptoRngCore;

use crate::{Algorithm, KeyResult};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A trait for keys that can verify signatures.
pub trait Verify {
    /// Verifies a signature against data with a verifying key.
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()>;
}

/// A trait for keys that can sign data.
pub trait Sign: Verify {
    /// Signs data with a signing key.
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>>;
}

/// A trait for constructing a public key.
pub trait PublicKeyGenerate {
    /// Generates a public key from its bytes.
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self>
    where
        Self: Sized;
}

/// A trait for constructing a key pair.
pub trait KeyPairGenerate {
    /// Generates a key pair from a cryptographically secure random number generator.
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self>
    where
        Self: Sized;

    /// Constructs a key pair from its private key bytes.
    fn from_private_key(bytes: &[u8]) -> KeyResult<Self>
    where
        Self: Sized;
}

/// A trait for getting the public key bytes.
///
/// For the elliptic-curve suites this is the compressed SEC1 form; for
/// `ed25519` it is the 32-byte encoding.
pub trait PublicKeyBytes {
    /// Returns the public key bytes.
    fn public_key_bytes(&self) -> Vec<u8>;
}

/// A trait for getting the key pair bytes.
pub trait KeyPairBytes: PublicKeyBytes {
    /// Returns the private key bytes.
    fn private_key_bytes(&self) -> Vec<u8>;
}

/// A trait for getting the signature algorithm of a key.
pub trait AlgName {
    /// Returns the signature algorithm the key signs and verifies with.
    fn alg(&self) -> Algorithm;
}
