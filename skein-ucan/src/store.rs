use std::collections::{HashSet, VecDeque};

use rand::Rng;
use skein_did::Did;
use skein_key::KeyPair;

use crate::{
    Capability, DelegationSemantics, SignedToken, TokenBuilder, UcanError, UcanResult, unix_now,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A principal's signing keypair and accumulated delegation proofs.
///
/// The store is the issuing side of delegation: it searches held tokens
/// (and the parents embedded in them) for proofs covering a requested
/// capability, prefers the broadest provable grant to avoid minting
/// redundant narrow tokens, and signs new tokens for other principals.
///
/// Capabilities over resources owned by the store's own DID need no proof;
/// the principal is its own root authority there.
#[derive(Debug)]
pub struct CapabilityStore<S> {
    keypair: KeyPair,
    did: Did,
    semantics: S,
    tokens: Vec<SignedToken>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<S> CapabilityStore<S>
where
    S: DelegationSemantics,
{
    /// Creates a store for the given principal.
    pub fn new(keypair: KeyPair, did: Did, semantics: S) -> Self {
        CapabilityStore {
            keypair,
            did,
            semantics,
            tokens: Vec::new(),
        }
    }

    /// The principal's DID.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// The delegation rules the store evaluates proofs under.
    pub fn semantics(&self) -> &S {
        &self.semantics
    }

    /// The tokens currently held.
    pub fn tokens(&self) -> &[SignedToken] {
        &self.tokens
    }

    /// Adds a delegation token to the held set.
    pub fn add_token(&mut self, token: SignedToken) {
        tracing::debug!(issuer = %token.issuer(), "adding delegation token to store");
        self.tokens.push(token);
    }

    /// Exports the principal's keypair. Audited: key material leaving the
    /// store is always worth a log line.
    pub fn export_keypair(&self) -> KeyPair {
        tracing::warn!(did = %self.did, "keypair exported from capability store");
        self.keypair.clone()
    }

    /// Searches held tokens, and tokens transitively reachable through
    /// their embedded proofs, for one addressed to this principal whose own
    /// capability covers `required` under the store's semantics.
    ///
    /// A token minted for another principal is never usable as a proof,
    /// even when its capability is broad enough: a proof sits directly
    /// under the token this store signs, so its audience must be the
    /// store's DID for the chain to hold together. An ancestor grant only
    /// contributes through the attenuated token it was delegated into.
    pub fn find_proof(&self, required: &Capability) -> Option<SignedToken> {
        let mut queue: VecDeque<SignedToken> = self.tokens.iter().cloned().collect();

        while let Some(token) = queue.pop_front() {
            let covers = token.audience() == &self.did
                && token
                    .capabilities()
                    .iter()
                    .any(|held| self.semantics.can_delegate(held, required));

            if covers {
                return Some(token);
            }

            // Undecodable embedded proofs are skipped, not fatal: they only
            // narrow the search space.
            if let Ok(parents) = token.parent_tokens() {
                queue.extend(parents);
            }
        }

        None
    }

    /// Finds the broadest capability, reachable from `capability` by
    /// successive widening, for which a proof still exists. Falls back to
    /// the original capability's proof when no broader one is provable.
    ///
    /// Coverage is containment-based, so provability only shrinks as the
    /// request widens; the loop stops at the first unprovable widening.
    pub fn vaguest_proof_for(
        &self,
        capability: &Capability,
    ) -> Option<(Capability, SignedToken)> {
        let mut best = (capability.clone(), self.find_proof(capability)?);
        let mut current = capability.clone();

        while let Some(wider) = current.vaguer() {
            match self.find_proof(&wider) {
                Some(proof) => {
                    best = (wider.clone(), proof);
                    current = wider;
                }
                None => break,
            }
        }

        Some(best)
    }

    /// Signs a token delegating `capability` to `audience`, valid for
    /// `lifetime_secs` from now. The discovered proof is embedded; fails
    /// with [`UcanError::ProofNotFound`] if no held proof covers the
    /// capability and the store's DID does not own the resource.
    pub fn issue_token(
        &self,
        audience: &Did,
        capability: Capability,
        lifetime_secs: u64,
    ) -> UcanResult<SignedToken> {
        let proof = self.proof_for(&capability)?;
        let now = unix_now();

        TokenBuilder::default()
            .issuer(self.did.clone())
            .audience(audience.clone())
            .expiration(now + lifetime_secs)
            .not_before(now)
            .nonce(generate_nonce())
            .capabilities(vec![capability])
            .proofs(proof.map(|p| p.to_string()))
            .sign(&self.keypair)
    }

    /// Signs a single token delegating several capabilities at once.
    ///
    /// Each capability is independently widened to its vaguest provable
    /// form, the resulting grants and proofs are deduplicated, and the
    /// union is signed. One unprovable capability aborts the whole batch.
    pub fn issue_token_for_many(
        &self,
        audience: &Did,
        capabilities: impl IntoIterator<Item = Capability>,
        lifetime_secs: u64,
    ) -> UcanResult<SignedToken> {
        let mut granted: Vec<Capability> = Vec::new();
        let mut proofs: Vec<String> = Vec::new();
        let mut seen_proofs: HashSet<String> = HashSet::new();

        for capability in capabilities {
            if self.owns(&capability) {
                if !granted.contains(&capability) {
                    granted.push(capability);
                }
                continue;
            }

            let (vaguest, proof) = self
                .vaguest_proof_for(&capability)
                .ok_or_else(|| UcanError::ProofNotFound(capability.to_string()))?;

            if !granted.contains(&vaguest) {
                granted.push(vaguest);
            }

            let encoded = proof.to_string();
            if seen_proofs.insert(encoded.clone()) {
                proofs.push(encoded);
            }
        }

        let now = unix_now();
        TokenBuilder::default()
            .issuer(self.did.clone())
            .audience(audience.clone())
            .expiration(now + lifetime_secs)
            .not_before(now)
            .nonce(generate_nonce())
            .capabilities(granted)
            .proofs(proofs)
            .sign(&self.keypair)
    }

    fn owns(&self, capability: &Capability) -> bool {
        capability.resource.did == self.did
    }

    fn proof_for(&self, capability: &Capability) -> UcanResult<Option<SignedToken>> {
        if self.owns(capability) {
            return Ok(None);
        }

        self.find_proof(capability)
            .map(Some)
            .ok_or_else(|| UcanError::ProofNotFound(capability.to_string()))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn generate_nonce() -> String {
    let bytes: [u8; 12] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use skein_key::{Ed25519KeyPair, KeyPairGenerate};

    use crate::{AbilityLevel, RecordSemantics, Resource};

    use super::*;

    fn principal(name: &str) -> (KeyPair, Did) {
        let mut rng = rand::thread_rng();
        let keypair: KeyPair = Ed25519KeyPair::generate(&mut rng)
            .expect("keygen")
            .into();
        let did: Did = format!("did:plc:{name}").parse().expect("valid did");
        (keypair, did)
    }

    fn capability(did: &Did, collection: &str, record: &str) -> Capability {
        Capability::new(
            Resource::new(
                did.clone(),
                collection.parse().expect("segment"),
                record.parse().expect("segment"),
            ),
            AbilityLevel::Write,
        )
    }

    #[test]
    fn test_store_self_owned_needs_no_proof() -> anyhow::Result<()> {
        let (keypair, alice) = principal("alice");
        let (_, bob) = principal("bob");
        let store = CapabilityStore::new(keypair, alice.clone(), RecordSemantics);

        let token = store.issue_token(&bob, capability(&alice, "posts", "*"), 300)?;

        assert_eq!(token.issuer(), &alice);
        assert_eq!(token.audience(), &bob);
        assert!(token.proofs().is_empty(), "self-signed root embeds no proof");

        Ok(())
    }

    #[test]
    fn test_store_delegation_requires_proof() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");
        let (_, carol) = principal("carol");

        let mut bob_store = CapabilityStore::new(bob_keys, bob.clone(), RecordSemantics);

        // Without a grant from alice, bob cannot delegate her data.
        let result = bob_store.issue_token(&carol, capability(&alice, "posts", "abc"), 300);
        assert!(matches!(result, Err(UcanError::ProofNotFound(_))));

        // With alice's grant held, the same issuance succeeds and embeds it.
        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let grant = alice_store.issue_token(&bob, capability(&alice, "posts", "*"), 300)?;
        bob_store.add_token(grant.clone());

        let token = bob_store.issue_token(&carol, capability(&alice, "posts", "abc"), 300)?;
        assert_eq!(token.proofs(), &[grant.to_string()]);

        Ok(())
    }

    #[test]
    fn test_find_proof_searches_embedded_parents() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");
        let (carol_keys, carol) = principal("carol");

        // Alice's broad grant names carol; bob forwards it as an embedded
        // proof inside a narrower token of his own.
        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let direct_grant =
            alice_store.issue_token(&carol, capability(&alice, "posts", "*"), 300)?;

        let now = unix_now();
        let wrapper = TokenBuilder::default()
            .issuer(bob)
            .audience(carol.clone())
            .expiration(now + 300)
            .capabilities(vec![capability(&alice, "posts", "abc")])
            .proofs(vec![direct_grant.to_string()])
            .sign(&bob_keys)?;

        let mut carol_store = CapabilityStore::new(carol_keys, carol, RecordSemantics);
        carol_store.add_token(wrapper);

        // The wrapper does not cover "xyz", but the embedded grant does,
        // and it is addressed to carol, so it is a usable proof.
        let found = carol_store.find_proof(&capability(&alice, "posts", "xyz"));
        assert!(found.is_some());
        assert_eq!(found.expect("proof").issuer(), &alice);

        Ok(())
    }

    #[test]
    fn test_find_proof_ignores_grants_addressed_elsewhere() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");
        let (carol_keys, carol) = principal("carol");
        let (_, dave) = principal("dave");

        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let root_grant = alice_store.issue_token(&bob, capability(&alice, "posts", "*"), 300)?;

        let mut bob_store = CapabilityStore::new(bob_keys, bob.clone(), RecordSemantics);
        bob_store.add_token(root_grant);
        let narrow_grant =
            bob_store.issue_token(&carol, capability(&alice, "posts", "abc"), 300)?;

        let mut carol_store = CapabilityStore::new(carol_keys, carol, RecordSemantics);
        carol_store.add_token(narrow_grant);

        // Alice's wildcard grant is reachable through the embedded proof,
        // but it names bob, not carol. Carol's authority stops at the
        // record she was delegated; a token minted past it would fail
        // chain verification.
        assert!(carol_store
            .find_proof(&capability(&alice, "posts", "xyz"))
            .is_none());

        let result = carol_store.issue_token(&dave, capability(&alice, "posts", "xyz"), 300);
        assert!(matches!(result, Err(UcanError::ProofNotFound(_))));

        // The delegated record itself stays issuable through the held token.
        let token = carol_store.issue_token(&dave, capability(&alice, "posts", "abc"), 300)?;
        assert_eq!(token.proofs().len(), 1);

        Ok(())
    }

    #[test]
    fn test_vaguest_proof_prefers_broadest_grant() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");

        // Scenario: the store holds only an everything-grant; asking for a
        // narrow record must surface the broad proof at its broad width.
        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let broad = Capability::new(Resource::all(alice.clone()), AbilityLevel::Write);
        let grant = alice_store.issue_token(&bob, broad.clone(), 300)?;

        let mut bob_store = CapabilityStore::new(bob_keys, bob, RecordSemantics);
        bob_store.add_token(grant.clone());

        let (vaguest, proof) = bob_store
            .vaguest_proof_for(&capability(&alice, "posts", "r1"))
            .expect("proof exists");

        assert_eq!(vaguest, broad);
        assert_eq!(proof, grant);

        Ok(())
    }

    #[test]
    fn test_vaguest_proof_falls_back_to_narrow() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");

        // Only a collection-wide grant exists, so widening to the whole DID
        // is unprovable and the search settles on the collection width.
        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let grant = alice_store.issue_token(&bob, capability(&alice, "posts", "*"), 300)?;

        let mut bob_store = CapabilityStore::new(bob_keys, bob, RecordSemantics);
        bob_store.add_token(grant);

        let (vaguest, _) = bob_store
            .vaguest_proof_for(&capability(&alice, "posts", "r1"))
            .expect("proof exists");

        assert_eq!(vaguest, capability(&alice, "posts", "*"));

        Ok(())
    }

    #[test]
    fn test_vaguest_proof_none_when_uncovered() -> anyhow::Result<()> {
        let (bob_keys, bob) = principal("bob");
        let (_, alice) = principal("alice");

        let bob_store = CapabilityStore::new(bob_keys, bob, RecordSemantics);
        assert!(bob_store
            .vaguest_proof_for(&capability(&alice, "posts", "r1"))
            .is_none());

        Ok(())
    }

    #[test]
    fn test_issue_token_for_many_dedupes_proofs() -> anyhow::Result<()> {
        let (alice_keys, alice) = principal("alice");
        let (bob_keys, bob) = principal("bob");
        let (_, carol) = principal("carol");

        let alice_store = CapabilityStore::new(alice_keys, alice.clone(), RecordSemantics);
        let broad = Capability::new(Resource::all(alice.clone()), AbilityLevel::Write);
        let grant = alice_store.issue_token(&bob, broad.clone(), 300)?;

        let mut bob_store = CapabilityStore::new(bob_keys, bob, RecordSemantics);
        bob_store.add_token(grant.clone());

        // Two narrow requests under the same broad grant collapse to one
        // granted capability and one embedded proof.
        let token = bob_store.issue_token_for_many(
            &carol,
            vec![
                capability(&alice, "posts", "r1"),
                capability(&alice, "likes", "r2"),
            ],
            300,
        )?;

        assert_eq!(token.capabilities(), &[broad]);
        assert_eq!(token.proofs(), &[grant.to_string()]);

        Ok(())
    }

    #[test]
    fn test_issue_token_for_many_is_all_or_nothing() -> anyhow::Result<()> {
        let (bob_keys, bob) = principal("bob");
        let (_, alice) = principal("alice");

        let bob_store = CapabilityStore::new(bob_keys, bob.clone(), RecordSemantics);

        // The self-owned capability alone would succeed, but the uncovered
        // one aborts the batch.
        let result = bob_store.issue_token_for_many(
            &alice,
            vec![
                capability(&bob, "posts", "r1"),
                capability(&alice, "posts", "r1"),
            ],
            300,
        );

        assert!(matches!(result, Err(UcanError::ProofNotFound(_))));

        Ok(())
    }

    #[test_log::test]
    fn test_export_keypair_returns_signing_key() {
        let (keypair, did) = principal("alice");
        let store = CapabilityStore::new(keypair.clone(), did, RecordSemantics);

        assert_eq!(store.export_keypair(), keypair);
    }
}
