use async_trait::async_trait;

use crate::{
    Did, DidDocument, DidResult, VerificationMethod, VerifierRegistry, KEY_METHOD,
    SIGNING_KEY_FRAGMENT,
};

use super::MethodResolver;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves `did:key` identities without any I/O.
///
/// The identifier's method-specific part is itself a multikey, so the
/// document is derived from the DID string alone. The synthesized document
/// carries only a verification method: self-certifying identities have no
/// handle and no service endpoints.
#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    registry: VerifierRegistry,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl KeyResolver {
    /// Creates a resolver decoding through the given registry.
    pub fn new(registry: VerifierRegistry) -> Self {
        KeyResolver { registry }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl MethodResolver for KeyResolver {
    fn method(&self) -> &'static str {
        KEY_METHOD
    }

    async fn resolve(&self, did: &Did) -> DidResult<DidDocument> {
        let multikey = did.id();

        // Decoding up front keeps malformed identifiers from entering the
        // cache as documents that fail later at verification time.
        self.registry.decode_multikey(multikey)?;

        Ok(DidDocument::builder()
            .id(did.clone())
            .verification_method(vec![VerificationMethod::builder()
                .id(format!("{did}{SIGNING_KEY_FRAGMENT}"))
                .method_type("Multikey".to_string())
                .controller(did.clone())
                .public_key_multibase(multikey.to_string())
                .build()])
            .build())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
