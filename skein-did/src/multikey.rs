use std::collections::HashMap;

use multibase::Base;
use skein_key::{
    Ed25519PubKey, KeyResult, P256PubKey, PubKey, PublicKeyBytes, PublicKeyGenerate,
    Secp256k1PubKey,
};

use crate::{DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Multicodec prefix for ed25519 public keys (varint of `0xed`).
pub const ED25519_PREFIX: [u8; 2] = [0xed, 0x01];

/// Multicodec prefix for secp256k1 public keys (varint of `0xe7`).
pub const SECP256K1_PREFIX: [u8; 2] = [0xe7, 0x01];

/// Multicodec prefix for NIST P-256 public keys (varint of `0x1200`).
pub const P256_PREFIX: [u8; 2] = [0x80, 0x24];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Decoder registry mapping multicodec prefixes to public key constructors.
///
/// The registry is the single point where supported signature suites are
/// enumerated. Resolution and verification both decode keys through it, so
/// adding a suite means registering one more entry here.
#[derive(Clone)]
pub struct VerifierRegistry {
    decoders: HashMap<[u8; 2], fn(&[u8]) -> KeyResult<PubKey>>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Encodes a public key as a multikey string: base58btc over the key's
/// multicodec prefix followed by its compressed bytes.
pub fn encode_multikey(key: &PubKey) -> String {
    let (prefix, bytes) = match key {
        PubKey::Ed25519(k) => (ED25519_PREFIX, k.public_key_bytes()),
        PubKey::Secp256k1(k) => (SECP256K1_PREFIX, k.public_key_bytes()),
        PubKey::P256(k) => (P256_PREFIX, k.public_key_bytes()),
    };

    let mut prefixed = Vec::with_capacity(2 + bytes.len());
    prefixed.extend_from_slice(&prefix);
    prefixed.extend_from_slice(&bytes);

    multibase::encode(Base::Base58Btc, prefixed)
}

fn decode_ed25519(bytes: &[u8]) -> KeyResult<PubKey> {
    Ed25519PubKey::from_public_key(bytes).map(PubKey::from)
}

fn decode_secp256k1(bytes: &[u8]) -> KeyResult<PubKey> {
    Secp256k1PubKey::from_public_key(bytes).map(PubKey::from)
}

fn decode_p256(bytes: &[u8]) -> KeyResult<PubKey> {
    P256PubKey::from_public_key(bytes).map(PubKey::from)
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VerifierRegistry {
    /// Creates an empty registry with no supported suites.
    pub fn empty() -> Self {
        VerifierRegistry {
            decoders: HashMap::new(),
        }
    }

    /// Creates a registry with the standard suites: ed25519, secp256k1 and
    /// NIST P-256.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(ED25519_PREFIX, decode_ed25519);
        registry.register(SECP256K1_PREFIX, decode_secp256k1);
        registry.register(P256_PREFIX, decode_p256);
        registry
    }

    /// Registers a decoder for the given multicodec prefix, replacing any
    /// existing entry.
    pub fn register(&mut self, prefix: [u8; 2], decoder: fn(&[u8]) -> KeyResult<PubKey>) {
        self.decoders.insert(prefix, decoder);
    }

    /// Decodes a multikey string into a public key.
    pub fn decode_multikey(&self, multikey: &str) -> DidResult<PubKey> {
        let (base, bytes) = multibase::decode(multikey)?;
        if base != Base::Base58Btc {
            return Err(DidError::DocumentInvalid(format!(
                "multikey must be base58btc, got {base:?}"
            )));
        }

        if bytes.len() < 2 {
            return Err(DidError::DocumentInvalid(
                "multikey payload too short".to_string(),
            ));
        }

        let prefix = [bytes[0], bytes[1]];
        let decoder = self
            .decoders
            .get(&prefix)
            .ok_or(DidError::UnsupportedKeySuite(prefix[0], prefix[1]))?;

        Ok(decoder(&bytes[2..])?)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for VerifierRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for VerifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierRegistry")
            .field("suites", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
