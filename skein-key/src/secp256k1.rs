use k256::ecdsa::{
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

/// A [`secp256k1`][ref] verifying key.
///
/// [ref]: https://en.bitcoin.it/wiki/Secp256k1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secp256k1PubKey {
    pub(crate) public: VerifyingKey,
}

/// A [`secp256k1`][ref] key pair with a signing key.
///
/// [ref]: https://en.bitcoin.it/wiki/Secp256k1
#[derive(Debug, Clone)]
pub struct Secp256k1KeyPair {
    pub(crate) private: SigningKey,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Secp256k1KeyPair {
    /// Returns the verifying half of the key pair.
    pub fn public_key(&self) -> Secp256k1PubKey {
        Secp256k1PubKey {
            public: *self.private.verifying_key(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Verify for Secp256k1PubKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature = Signature::from_slice(signature)?;
        self.public.verify(data, &signature).map_err(Into::into)
    }
}

impl Verify for Secp256k1KeyPair {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public_key().verify(data, signature)
    }
}

impl Sign for Secp256k1KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature: Signature = self.private.try_sign(data)?;
        // Compact signatures are always emitted in low-S form.
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for Secp256k1PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        let public = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| KeyError::InvalidPublicKey("secp256k1"))?;
        Ok(Self { public })
    }
}

impl KeyPairGenerate for Secp256k1KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        Ok(Self {
            private: SigningKey::random(rng),
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let private =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey("secp256k1"))?;
        Ok(Self { private })
    }
}

impl PublicKeyBytes for Secp256k1PubKey {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(true).as_bytes().to_vec()
    }
}

impl PublicKeyBytes for Secp256k1KeyPair {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().public_key_bytes()
    }
}

impl KeyPairBytes for Secp256k1KeyPair {
    fn private_key_bytes(&self) -> Vec<u8> {
        self.private.to_bytes().to_vec()
    }
}

impl AlgName for Secp256k1PubKey {
    fn alg(&self) -> Algorithm {
        Algorithm::ES256K
    }
}

impl AlgName for Secp256k1KeyPair {
    fn alg(&self) -> Algorithm {
        Algorithm::ES256K
    }
}

impl PartialEq for Secp256k1KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.private.to_bytes() == other.private.to_bytes()
    }
}

impl Eq for Secp256k1KeyPair {}

impl From<Secp256k1KeyPair> for Secp256k1PubKey {
    fn from(key_pair: Secp256k1KeyPair) -> Self {
        key_pair.public_key()
    }
}

impl From<Secp256k1PubKey> for PubKey {
    fn from(pub_key: Secp256k1PubKey) -> Self {
        PubKey::Secp256k1(pub_key)
    }
}

impl From<Secp256k1KeyPair> for KeyPair {
    fn from(key_pair: Secp256k1KeyPair) -> Self {
        KeyPair::Secp256k1(key_pair)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secp256k1_generate() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Secp256k1KeyPair::generate(&mut rng)?;

        let public_key = Secp256k1PubKey::from_public_key(&key_pair.public_key_bytes())?;
        assert_eq!(key_pair.public_key(), public_key);

        let private_key = Secp256k1KeyPair::from_private_key(&key_pair.private_key_bytes())?;
        assert_eq!(key_pair, private_key);

        // Compressed SEC1 form.
        assert_eq!(key_pair.public_key_bytes().len(), 33);

        Ok(())
    }

    #[test]
    fn test_secp256k1_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Secp256k1KeyPair::generate(&mut rng)?;

        let data = b"a signed message";
        let signature = key_pair.sign(data)?;

        key_pair.public_key().verify(data, &signature)?;
        assert!(key_pair.public_key().verify(b"another message", &signature).is_err());

        Ok(())
    }
}
