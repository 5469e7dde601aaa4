use skein_did::Did;
use skein_key::{AlgName, Sign};

use crate::{Capability, SignedToken, TokenHeader, TokenPayload, UcanResult, TOKEN_VERSION};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A staged builder for signed capability tokens.
///
/// Issuer, audience, expiration and capabilities are type-state fields:
/// `sign` only exists once all four are set, so an incomplete token is a
/// compile error rather than a runtime one.
pub struct TokenBuilder<I = (), A = (), E = (), C = ()> {
    issuer: I,
    audience: A,
    expiration: E,
    not_before: Option<u64>,
    nonce: Option<String>,
    capabilities: C,
    proofs: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<I, A, E, C> TokenBuilder<I, A, E, C> {
    /// Sets the DID that will sign the token.
    pub fn issuer(self, issuer: impl Into<Did>) -> TokenBuilder<Did, A, E, C> {
        TokenBuilder {
            issuer: issuer.into(),
            audience: self.audience,
            expiration: self.expiration,
            not_before: self.not_before,
            nonce: self.nonce,
            capabilities: self.capabilities,
            proofs: self.proofs,
        }
    }

    /// Sets the DID the token delegates to.
    pub fn audience(self, audience: impl Into<Did>) -> TokenBuilder<I, Did, E, C> {
        TokenBuilder {
            issuer: self.issuer,
            audience: audience.into(),
            expiration: self.expiration,
            not_before: self.not_before,
            nonce: self.nonce,
            capabilities: self.capabilities,
            proofs: self.proofs,
        }
    }

    /// Sets the expiry, seconds since the epoch.
    pub fn expiration(self, expiration: u64) -> TokenBuilder<I, A, u64, C> {
        TokenBuilder {
            issuer: self.issuer,
            audience: self.audience,
            expiration,
            not_before: self.not_before,
            nonce: self.nonce,
            capabilities: self.capabilities,
            proofs: self.proofs,
        }
    }

    /// Sets the start of the validity window, seconds since the epoch.
    pub fn not_before(mut self, not_before: u64) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Sets a nonce to prevent replay.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the capabilities the token delegates.
    pub fn capabilities(
        self,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> TokenBuilder<I, A, E, Vec<Capability>> {
        TokenBuilder {
            issuer: self.issuer,
            audience: self.audience,
            expiration: self.expiration,
            not_before: self.not_before,
            nonce: self.nonce,
            capabilities: capabilities.into_iter().collect(),
            proofs: self.proofs,
        }
    }

    /// Embeds parent tokens authorizing the issuer, in their compact
    /// encoding.
    pub fn proofs(mut self, proofs: impl IntoIterator<Item = String>) -> Self {
        self.proofs = proofs.into_iter().collect();
        self
    }
}

impl TokenBuilder<Did, Did, u64, Vec<Capability>> {
    /// Signs the token with the issuer's keypair.
    pub fn sign<K>(self, keypair: &K) -> UcanResult<SignedToken>
    where
        K: Sign + AlgName,
    {
        let header = TokenHeader::new(keypair.alg());
        let payload = TokenPayload {
            ucv: TOKEN_VERSION.to_string(),
            iss: self.issuer,
            aud: self.audience,
            exp: self.expiration,
            nbf: self.not_before,
            nnc: self.nonce,
            cap: self.capabilities,
            prf: self.proofs,
        };

        let signing_input = SignedToken::signing_input_for(&header, &payload)?;
        let signature = keypair.sign(signing_input.as_bytes())?;

        Ok(SignedToken::from_parts(
            header,
            payload,
            signature,
            signing_input,
        ))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for TokenBuilder {
    fn default() -> Self {
        TokenBuilder {
            issuer: (),
            audience: (),
            expiration: (),
            not_before: None,
            nonce: None,
            capabilities: (),
            proofs: Vec::new(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use skein_key::{Ed25519KeyPair, KeyPair, KeyPairGenerate, Verify};

    use crate::{unix_now, AbilityLevel, Resource};

    use super::*;

    #[test]
    fn test_token_builder() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();

        let issuer: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        let audience: Did = "did:plc:yk4dd2qkboz2yv6tpubpc6co".parse()?;
        let capability = Capability::new(Resource::all(issuer.clone()), AbilityLevel::Write);
        let exp = unix_now() + 300;

        let token = TokenBuilder::default()
            .issuer(issuer.clone())
            .audience(audience.clone())
            .expiration(exp)
            .not_before(exp - 600)
            .nonce("1100263a4012")
            .capabilities(vec![capability.clone()])
            .sign(&key_pair)?;

        assert_eq!(token.issuer(), &issuer);
        assert_eq!(token.audience(), &audience);
        assert_eq!(token.payload().exp, exp);
        assert_eq!(token.payload().nbf, Some(exp - 600));
        assert_eq!(token.payload().nnc.as_deref(), Some("1100263a4012"));
        assert_eq!(token.capabilities(), &[capability]);
        assert!(token.proofs().is_empty());

        Ok(())
    }

    #[test]
    fn test_builder_signs_over_compact_segments() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair: KeyPair = Ed25519KeyPair::generate(&mut rng)?.into();

        let issuer: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        let token = TokenBuilder::default()
            .issuer(issuer.clone())
            .audience(issuer.clone())
            .expiration(unix_now() + 60)
            .capabilities(vec![])
            .sign(&key_pair)?;

        let encoded = token.to_string();
        let signing_input = encoded
            .rsplit_once('.')
            .map(|(input, _)| input)
            .expect("compact encoding");

        key_pair.verify(signing_input.as_bytes(), token.signature())?;

        Ok(())
    }
}
