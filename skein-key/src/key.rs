use crate::{
    Algorithm, AlgName, Ed25519KeyPair, Ed25519PubKey, KeyPairBytes, KeyResult, P256KeyPair,
    P256PubKey, PublicKeyBytes, Secp256k1KeyPair, Secp256k1PubKey, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A suite-erased key pair.
///
/// Useful where key pairs of different suites are stored behind one type,
/// for example a principal's signing key in a capability store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPair {
    /// An `ed25519` key pair.
    Ed25519(Ed25519KeyPair),

    /// A `secp256k1` key pair.
    Secp256k1(Secp256k1KeyPair),

    /// A `NIST P-256` key pair.
    P256(P256KeyPair),
}

/// A suite-erased public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubKey {
    /// An `ed25519` public key.
    Ed25519(Ed25519PubKey),

    /// A `secp256k1` public key.
    Secp256k1(Secp256k1PubKey),

    /// A `NIST P-256` public key.
    P256(P256PubKey),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl KeyPair {
    /// Returns the verifying half of the key pair.
    pub fn public_key(&self) -> PubKey {
        match self {
            KeyPair::Ed25519(kp) => PubKey::Ed25519(kp.public_key()),
            KeyPair::Secp256k1(kp) => PubKey::Secp256k1(kp.public_key()),
            KeyPair::P256(kp) => PubKey::P256(kp.public_key()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Verify for PubKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        match self {
            PubKey::Ed25519(pk) => pk.verify(data, signature),
            PubKey::Secp256k1(pk) => pk.verify(data, signature),
            PubKey::P256(pk) => pk.verify(data, signature),
        }
    }
}

impl Verify for KeyPair {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public_key().verify(data, signature)
    }
}

impl Sign for KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        match self {
            KeyPair::Ed25519(kp) => kp.sign(data),
            KeyPair::Secp256k1(kp) => kp.sign(data),
            KeyPair::P256(kp) => kp.sign(data),
        }
    }
}

impl PublicKeyBytes for PubKey {
    fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            PubKey::Ed25519(pk) => pk.public_key_bytes(),
            PubKey::Secp256k1(pk) => pk.public_key_bytes(),
            PubKey::P256(pk) => pk.public_key_bytes(),
        }
    }
}

impl PublicKeyBytes for KeyPair {
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().public_key_bytes()
    }
}

impl KeyPairBytes for KeyPair {
    fn private_key_bytes(&self) -> Vec<u8> {
        match self {
            KeyPair::Ed25519(kp) => kp.private_key_bytes(),
            KeyPair::Secp256k1(kp) => kp.private_key_bytes(),
            KeyPair::P256(kp) => kp.private_key_bytes(),
        }
    }
}

impl AlgName for PubKey {
    fn alg(&self) -> Algorithm {
        match self {
            PubKey::Ed25519(pk) => pk.alg(),
            PubKey::Secp256k1(pk) => pk.alg(),
            PubKey::P256(pk) => pk.alg(),
        }
    }
}

impl AlgName for KeyPair {
    fn alg(&self) -> Algorithm {
        match self {
            KeyPair::Ed25519(kp) => kp.alg(),
            KeyPair::Secp256k1(kp) => kp.alg(),
            KeyPair::P256(kp) => kp.alg(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::KeyPairGenerate;

    use super::*;

    #[test]
    fn test_wrapped_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();

        let key_pairs: Vec<KeyPair> = vec![
            Ed25519KeyPair::generate(&mut rng)?.into(),
            Secp256k1KeyPair::generate(&mut rng)?.into(),
            P256KeyPair::generate(&mut rng)?.into(),
        ];

        for key_pair in key_pairs {
            let data = b"a signed message";
            let signature = key_pair.sign(data)?;
            key_pair.public_key().verify(data, &signature)?;
        }

        Ok(())
    }
}
