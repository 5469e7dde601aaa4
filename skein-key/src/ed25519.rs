use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;

use crate::{
    Algorithm, AlgName, KeyError, KeyPair, KeyPairBytes, KeyPairGenerate, KeyResult, PubKey,
    PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An [`ed25519`][ref] verifying key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519PubKey {
    pub(crate) public: VerifyingKey,
}

/// An [`ed25519`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
#[derive(Debug, Clone)]
pub struct Ed25519KeyPair {
    pub(crate) private: SigningKey,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Returns the verifying half of the key pair.
    pub fn public_key(&self) -> Ed25519PubKey {
        Ed25519PubKey {
            public: self.private.verifying_key(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Verify for Ed25519PubKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public
            .verify_strict(data, &Signature::try_from(signature)?)
            .map_err(Into::into)
    }
}

impl Verify for Ed25519KeyPair {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public_key().verify(data, signature)
    }
}

impl Sign for Ed25519KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature = self.private.try_sign(data)?;
        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for Ed25519PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        let public =
            VerifyingKey::try_from(bytes).map_err(|_| KeyError::InvalidPublicKey("ed25519"))?;
        Ok(Self { public })
    }
}

impl KeyPairGenerate for Ed25519KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        Ok(Self {
            private: SigningKey::generate(rng),
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let private =
            SigningKey::try_from(bytes).map_err(|_| KeyError::InvalidPrivateKey("ed25519"))?;
        Ok(Self { private })
    }
}

impl PublicKeyBytes for Ed25519PubKey {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_bytes().to_vec()
    }
}

impl PublicKeyBytes for Ed25519KeyPair {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().public_key_bytes()
    }
}

impl KeyPairBytes for Ed25519KeyPair {
    fn private_key_bytes(&self) -> Vec<u8> {
        self.private.to_bytes().to_vec()
    }
}

impl AlgName for Ed25519PubKey {
    fn alg(&self) -> Algorithm {
        Algorithm::EdDSA
    }
}

impl AlgName for Ed25519KeyPair {
    fn alg(&self) -> Algorithm {
        Algorithm::EdDSA
    }
}

impl PartialEq for Ed25519KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.private.to_bytes() == other.private.to_bytes()
    }
}

impl Eq for Ed25519KeyPair {}

impl From<Ed25519KeyPair> for Ed25519PubKey {
    fn from(key_pair: Ed25519KeyPair) -> Self {
        key_pair.public_key()
    }
}

impl From<Ed25519PubKey> for PubKey {
    fn from(pub_key: Ed25519PubKey) -> Self {
        PubKey::Ed25519(pub_key)
    }
}

impl From<Ed25519KeyPair> for KeyPair {
    fn from(key_pair: Ed25519KeyPair) -> Self {
        KeyPair::Ed25519(key_pair)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ed25519_generate() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;

        let public_key_bytes = key_pair.public_key_bytes();
        let public_key = Ed25519PubKey::from_public_key(&public_key_bytes)?;

        assert_eq!(key_pair.public_key(), public_key);

        let private_key_bytes = key_pair.private_key_bytes();
        let private_key = Ed25519KeyPair::from_private_key(&private_key_bytes)?;

        assert_eq!(key_pair, private_key);

        Ok(())
    }

    #[test]
    fn test_ed25519_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;

        let data = b"a signed message";
        let signature = key_pair.sign(data)?;

        key_pair.public_key().verify(data, &signature)?;

        // Tampered data must not verify.
        assert!(key_pair.public_key().verify(b"another message", &signature).is_err());

        Ok(())
    }
}
