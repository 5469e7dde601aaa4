use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand_core::CryptoRngCore;

use crate::{
    Algorithm, AlgName, KeyError, KeyPair, KeyPairBytes, KeyPairGenerate, KeyResult, PubKey,
    PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A [`NIST P-256`][ref] verifying key.
///
/// [ref]: https://csrc.nist.gov/publications/detail/fips/186/4/final
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P256PubKey {
    pub(crate) public: VerifyingKey,
}

/// A [`NIST P-256`][ref] key pair with a signing key.
///
/// [ref]: https://csrc.nist.gov/publications/detail/fips/186/4/final
#[derive(Debug, Clone)]
pub struct P256KeyPair {
    pub(crate) private: SigningKey,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl P256KeyPair {
    /// Returns the verifying half of the key pair.
    pub fn public_key(&self) -> P256PubKey {
        P256PubKey {
            public: *self.private.verifying_key(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Verify for P256PubKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature = Signature::from_slice(signature)?;
        self.public.verify(data, &signature).map_err(Into::into)
    }
}

impl Verify for P256KeyPair {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public_key().verify(data, signature)
    }
}

impl Sign for P256KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature: Signature = self.private.try_sign(data)?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for P256PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        let public =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey("p256"))?;
        Ok(Self { public })
    }
}

impl KeyPairGenerate for P256KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        Ok(Self {
            private: SigningKey::random(rng),
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let private =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey("p256"))?;
        Ok(Self { private })
    }
}

impl PublicKeyBytes for P256PubKey {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(true).as_bytes().to_vec()
    }
}

impl PublicKeyBytes for P256KeyPair {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().public_key_bytes()
    }
}

impl KeyPairBytes for P256KeyPair {
    fn private_key_bytes(&self) -> Vec<u8> {
        self.private.to_bytes().to_vec()
    }
}

impl AlgName for P256PubKey {
    fn alg(&self) -> Algorithm {
        Algorithm::ES256
    }
}

impl AlgName for P256KeyPair {
    fn alg(&self) -> Algorithm {
        Algorithm::ES256
    }
}

impl PartialEq for P256KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.private.to_bytes() == other.private.to_bytes()
    }
}

impl Eq for P256KeyPair {}

impl From<P256KeyPair> for P256PubKey {
    fn from(key_pair: P256KeyPair) -> Self {
        key_pair.public_key()
    }
}

impl From<P256PubKey> for PubKey {
    fn from(pub_key: P256PubKey) -> Self {
        PubKey::P256(pub_key)
    }
}

impl From<P256KeyPair> for KeyPair {
    fn from(key_pair: P256KeyPair) -> Self {
        KeyPair::P256(key_pair)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
