use std::{future::Future, pin::Pin, sync::Arc};

use skein_did::{Did, DidResolver};

use crate::{Capability, DelegationSemantics, SignedToken, UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Verifies presented capability tokens against a required capability and
/// audience.
///
/// A verification call walks the token and every embedded parent. Each
/// link must pass, in order: a signature check against the issuer's
/// resolved signing key, the validity window, and delegation coverage (the
/// link's capabilities must be delegable from a proof minted for its
/// issuer, unless the issuer itself owns the resource). After the walk the
/// leaf must name the expected audience and cover the required capability.
///
/// Any failed predicate halts the call with a typed rejection; there is no
/// partial acceptance. The verifier keeps no state between calls.
pub struct ChainVerifier<S> {
    resolver: Arc<DidResolver>,
    semantics: S,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<S> ChainVerifier<S>
where
    S: DelegationSemantics,
{
    /// Creates a verifier resolving issuer keys through the given resolver.
    pub fn new(resolver: Arc<DidResolver>, semantics: S) -> Self {
        ChainVerifier {
            resolver,
            semantics,
        }
    }

    /// The delegation rules chains are checked under.
    pub fn semantics(&self) -> &S {
        &self.semantics
    }

    /// Verifies `token` as a grant of `required` to `audience` at time
    /// `now` (seconds since the epoch).
    ///
    /// Returns the verified leaf token on acceptance; any expected
    /// rejection cause surfaces as a typed [`UcanError`] variant for which
    /// [`UcanError::is_rejection`] holds.
    pub async fn verify(
        &self,
        token: &SignedToken,
        audience: &Did,
        required: &Capability,
        now: u64,
    ) -> UcanResult<SignedToken> {
        self.verify_link(token, now).await?;

        if token.audience() != audience {
            return Err(UcanError::WrongAudience {
                expected: audience.clone(),
                found: token.audience().clone(),
            });
        }

        let covered = token
            .capabilities()
            .iter()
            .any(|held| self.semantics.can_delegate(held, required));
        if !covered {
            return Err(UcanError::CapabilityNotCovered(required.to_string()));
        }

        tracing::debug!(issuer = %token.issuer(), %required, "capability chain accepted");
        Ok(token.clone())
    }

    /// Verifies one link and, recursively, every parent it embeds.
    fn verify_link<'a>(
        &'a self,
        token: &'a SignedToken,
        now: u64,
    ) -> Pin<Box<dyn Future<Output = UcanResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let issuer = token.issuer();

            let key = self.resolver.resolve_signing_key(issuer).await?;
            token.verify_signature(&key)?;
            token.validate_time(now)?;

            let parents = token.parent_tokens()?;

            // Parents must have been minted for this link's issuer; a proof
            // addressed to someone else authorizes nothing here.
            for parent in &parents {
                if parent.audience() != issuer {
                    return Err(UcanError::BrokenChainLink {
                        issuer: issuer.clone(),
                        proof_audience: parent.audience().clone(),
                    });
                }
            }

            for capability in token.capabilities() {
                self.check_delegation(issuer, capability, &parents)?;
            }

            for parent in &parents {
                self.verify_link(parent, now).await?;
            }

            Ok(())
        })
    }

    /// Checks that `capability` is covered by the issuer's own authority or
    /// by one of its proofs, distinguishing resource from ability failures.
    fn check_delegation(
        &self,
        issuer: &Did,
        capability: &Capability,
        parents: &[SignedToken],
    ) -> UcanResult<()> {
        // Self-signed root authority over the issuer's own resources.
        if &capability.resource.did == issuer {
            return Ok(());
        }

        let granted = parents
            .iter()
            .flat_map(|parent| parent.capabilities().iter());

        let mut resource_covered = false;
        for held in granted {
            if self
                .semantics
                .can_delegate_resource(&held.resource, &capability.resource)
            {
                resource_covered = true;
                if self
                    .semantics
                    .can_delegate_ability(held.ability, capability.ability)
                {
                    return Ok(());
                }
            }
        }

        if resource_covered {
            Err(UcanError::DelegationAbilityViolation {
                issuer: issuer.clone(),
                capability: capability.to_string(),
            })
        } else {
            Err(UcanError::DelegationResourceViolation {
                issuer: issuer.clone(),
                capability: capability.to_string(),
            })
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S: std::fmt::Debug> std::fmt::Debug for ChainVerifier<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainVerifier")
            .field("semantics", &self.semantics)
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
