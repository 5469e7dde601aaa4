use std::{
    fmt::Display,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use base64::Engine;
use serde::{Deserialize, Serialize};
use skein_did::Did;
use skein_key::{Algorithm, PubKey, Verify};

use crate::{Capability, UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The token format version this implementation speaks.
pub const TOKEN_VERSION: &str = "0.10.0";

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Header of a signed token: the signature algorithm and envelope type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// The signature algorithm of the issuer's key.
    pub alg: Algorithm,

    /// Envelope type tag, always `JWT`.
    pub typ: String,
}

/// Claims of a signed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Token format version.
    pub ucv: String,

    /// The DID that signed the token.
    pub iss: Did,

    /// The DID the token delegates to.
    pub aud: Did,

    /// Expiry, seconds since the epoch.
    pub exp: u64,

    /// Start of the validity window, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,

    /// Replay-prevention nonce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nnc: Option<String>,

    /// The capabilities delegated to the audience.
    pub cap: Vec<Capability>,

    /// Parent tokens authorizing the issuer, in their compact encoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prf: Vec<String>,
}

/// A signed capability token.
///
/// The wire form is the compact `header.payload.signature` encoding with
/// URL-safe unpadded base64 segments. The signing input (the first two
/// segments, exactly as received) is kept alongside the decoded claims so
/// re-verification never depends on re-serialization being byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedToken {
    header: TokenHeader,
    payload: TokenPayload,
    signature: Vec<u8>,
    signing_input: String,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Seconds since the epoch, for token validity checks.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TokenHeader {
    /// Creates a header for the given algorithm.
    pub fn new(alg: Algorithm) -> Self {
        TokenHeader {
            alg,
            typ: "JWT".to_string(),
        }
    }
}

impl SignedToken {
    pub(crate) fn from_parts(
        header: TokenHeader,
        payload: TokenPayload,
        signature: Vec<u8>,
        signing_input: String,
    ) -> Self {
        SignedToken {
            header,
            payload,
            signature,
            signing_input,
        }
    }

    /// Serializes the header and payload into the signing input of the
    /// compact encoding.
    pub(crate) fn signing_input_for(
        header: &TokenHeader,
        payload: &TokenPayload,
    ) -> UcanResult<String> {
        let header_json = serde_json::to_vec(header)?;
        let payload_json = serde_json::to_vec(payload)?;

        Ok(format!(
            "{}.{}",
            B64.encode(header_json),
            B64.encode(payload_json)
        ))
    }

    /// The token's header.
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// The token's claims.
    pub fn payload(&self) -> &TokenPayload {
        &self.payload
    }

    /// The DID that signed the token.
    pub fn issuer(&self) -> &Did {
        &self.payload.iss
    }

    /// The DID the token delegates to.
    pub fn audience(&self) -> &Did {
        &self.payload.aud
    }

    /// The capabilities the token delegates.
    pub fn capabilities(&self) -> &[Capability] {
        &self.payload.cap
    }

    /// The embedded parent tokens, in their compact encoding.
    pub fn proofs(&self) -> &[String] {
        &self.payload.prf
    }

    /// Decodes the embedded parent tokens.
    pub fn parent_tokens(&self) -> UcanResult<Vec<SignedToken>> {
        self.payload.prf.iter().map(|p| p.parse()).collect()
    }

    /// The raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Verifies the token's signature against the given public key.
    ///
    /// The header's declared algorithm must match the key's, so a key
    /// cannot be coerced into verifying under a different suite.
    pub fn verify_signature(&self, key: &PubKey) -> UcanResult<()> {
        use skein_key::AlgName;

        if self.header.alg != key.alg() {
            return Err(UcanError::SignatureInvalid(self.payload.iss.clone()));
        }

        key.verify(self.signing_input.as_bytes(), &self.signature)
            .map_err(|_| UcanError::SignatureInvalid(self.payload.iss.clone()))
    }

    /// Checks the validity window: `nbf <= now < exp`.
    pub fn validate_time(&self, now: u64) -> UcanResult<()> {
        if let Some(not_before) = self.payload.nbf {
            if now < not_before {
                return Err(UcanError::NotYetValid {
                    not_before,
                    now,
                });
            }
        }

        if now >= self.payload.exp {
            return Err(UcanError::Expired {
                expires_at: self.payload.exp,
                now,
            });
        }

        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.signing_input, B64.encode(&self.signature))
    }
}

impl FromStr for SignedToken {
    type Err = UcanError;

    fn from_str(s: &str) -> UcanResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let &[header_b64, payload_b64, signature_b64] = parts.as_slice() else {
            return Err(UcanError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header: TokenHeader = serde_json::from_slice(&B64.decode(header_b64)?)?;
        let payload: TokenPayload = serde_json::from_slice(&B64.decode(payload_b64)?)?;
        let signature = B64.decode(signature_b64)?;

        if payload.ucv != TOKEN_VERSION {
            return Err(UcanError::UnsupportedVersion(payload.ucv));
        }

        Ok(SignedToken {
            header,
            payload,
            signature,
            signing_input: format!("{header_b64}.{payload_b64}"),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use skein_key::{Ed25519KeyPair, KeyPair, KeyPairGenerate};

    use crate::{AbilityLevel, Resource, Segment, TokenBuilder};

    use super::*;

    fn sample_token(key_pair: &KeyPair) -> anyhow::Result<SignedToken> {
        let issuer: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        let audience: Did = "did:plc:yk4dd2qkboz2yv6tpubpc6co".parse()?;
        let capability = Capability::new(
            Resource::new(issuer.clone(), Segment::exact("posts"), Segment::Wildcard),
            AbilityLevel::Write,
        );

        let token = TokenBuilder::default()
            .issuer(issuer)
            .audience(audience)
            .expiration(unix_now() + 300)
            .not_before(unix_now() - 10)
            .nonce("e0c1b2a3")
            .capabilities(vec![capability])
            .sign(key_pair)?;

        anyhow::Ok(token)
    }

    #[test]
    fn test_token_compact_roundtrip() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        let token = sample_token(&key_pair)?;

        let encoded = token.to_string();
        assert_eq!(encoded.split('.').count(), 3);

        let decoded: SignedToken = encoded.parse()?;
        assert_eq!(decoded, token);
        assert_eq!(decoded.payload().ucv, TOKEN_VERSION);

        Ok(())
    }

    #[test]
    fn test_signature_survives_roundtrip() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        let token = sample_token(&key_pair)?;

        let decoded: SignedToken = token.to_string().parse()?;
        decoded.verify_signature(&key_pair.public_key())?;

        // A different key must not verify.
        let other: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        assert!(matches!(
            decoded.verify_signature(&other.public_key()),
            Err(UcanError::SignatureInvalid(_))
        ));

        Ok(())
    }

    #[test]
    fn test_tampered_payload_fails_verification() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        let token = sample_token(&key_pair)?;

        let encoded = token.to_string();
        let mut parts: Vec<&str> = encoded.split('.').collect();

        // Re-encode the payload with an inflated expiry.
        let mut payload: TokenPayload =
            serde_json::from_slice(&B64.decode(parts[1])?)?;
        payload.exp += 1_000_000;
        let forged = B64.encode(serde_json::to_vec(&payload)?);
        parts[1] = &forged;

        let forged_token: SignedToken = parts.join(".").parse()?;
        assert!(matches!(
            forged_token.verify_signature(&key_pair.public_key()),
            Err(UcanError::SignatureInvalid(_))
        ));

        Ok(())
    }

    #[test]
    fn test_validate_time_window() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        let token = sample_token(&key_pair)?;

        token.validate_time(unix_now())?;

        let expired = token.validate_time(token.payload().exp + 1);
        assert!(matches!(expired, Err(UcanError::Expired { .. })));

        // Expiry boundary is exclusive.
        let boundary = token.validate_time(token.payload().exp);
        assert!(matches!(boundary, Err(UcanError::Expired { .. })));

        let not_before = token.payload().nbf.expect("nbf set");
        let early = token.validate_time(not_before - 1);
        assert!(matches!(early, Err(UcanError::NotYetValid { .. })));

        Ok(())
    }

    #[test]
    fn test_decode_rejects_bad_inputs() {
        assert!(matches!(
            "only.two".parse::<SignedToken>(),
            Err(UcanError::MalformedToken(_))
        ));
        assert!("!!!.###.$$$".parse::<SignedToken>().is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_version() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();
        let token = sample_token(&key_pair)?;

        let encoded = token.to_string();
        let parts: Vec<&str> = encoded.split('.').collect();

        let mut payload: TokenPayload =
            serde_json::from_slice(&B64.decode(parts[1])?)?;
        payload.ucv = "9.9.9".to_string();
        let rewritten = B64.encode(serde_json::to_vec(&payload)?);

        let result = format!("{}.{}.{}", parts[0], rewritten, parts[2]).parse::<SignedToken>();
        assert!(matches!(result, Err(UcanError::UnsupportedVersion(_))));

        Ok(())
    }
}
