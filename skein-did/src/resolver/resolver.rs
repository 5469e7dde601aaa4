use std::{collections::HashMap, sync::Arc, time::Duration};

use skein_key::PubKey;

use crate::{
    Did, DidCache, DidDocument, DidError, DidResult, Identity, IdentityConfig, VerifierRegistry,
};

use super::{KeyResolver, MethodResolver, PlcResolver, WebResolver};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The caching front door of DID resolution.
///
/// Dispatches to the method resolver matching the DID's method tag and
/// layers the cache policy on top:
/// - fresh cache hits are served directly
/// - stale hits are served while a refresh is attempted inline; the
///   refreshed document lands in the cache for subsequent callers
/// - expired entries and misses resolve upstream
/// - a definitive not-found evicts the cached entry, a transient failure
///   leaves the cache untouched
///
/// Concurrent resolutions of the same stale DID each trigger their own
/// refresh. Cache writes are last-writer-wins over documents from the same
/// upstream, so the race is benign.
pub struct DidResolver {
    methods: HashMap<&'static str, Arc<dyn MethodResolver>>,
    cache: DidCache,
    registry: VerifierRegistry,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DidResolver {
    /// Creates a resolver with the standard method set: `plc`, `web` and
    /// `key`.
    pub fn new(config: &IdentityConfig) -> DidResult<Self> {
        let registry = VerifierRegistry::standard();
        let timeout = Duration::from_millis(config.timeout_ms);

        let methods: Vec<Arc<dyn MethodResolver>> = vec![
            Arc::new(PlcResolver::new(&config.plc_directory_url, timeout)?),
            Arc::new(WebResolver::new(timeout)?),
            Arc::new(KeyResolver::new(registry.clone())),
        ];

        Self::with_methods(config, registry, methods)
    }

    /// Creates a resolver from an explicit method set. Later entries with a
    /// duplicate method tag replace earlier ones.
    pub fn with_methods(
        config: &IdentityConfig,
        registry: VerifierRegistry,
        methods: Vec<Arc<dyn MethodResolver>>,
    ) -> DidResult<Self> {
        config.validate()?;

        let cache = DidCache::new(
            Duration::from_millis(config.stale_ttl_ms),
            Duration::from_millis(config.max_ttl_ms),
        )?;

        Ok(DidResolver {
            methods: methods.into_iter().map(|m| (m.method(), m)).collect(),
            cache,
            registry,
        })
    }

    /// The registry used to decode signing keys.
    pub fn registry(&self) -> &VerifierRegistry {
        &self.registry
    }

    /// The underlying document cache.
    pub fn cache(&self) -> &DidCache {
        &self.cache
    }

    /// Resolves a DID document, serving from the cache where possible.
    pub async fn resolve(&self, did: &Did) -> DidResult<DidDocument> {
        if let Some(hit) = self.cache.check(did) {
            if !hit.stale {
                tracing::trace!(%did, "fresh cache hit");
                return Ok(hit.document);
            }

            // Stale: refresh inline but serve the pre-refresh document, so
            // a flaky upstream cannot take down reads of a known identity.
            tracing::debug!(%did, "stale cache hit, refreshing");
            match self.resolve_upstream(did).await {
                Ok(document) => self.cache.store(did.clone(), document),
                Err(e) if e.is_not_found() => {
                    self.cache.evict(did);
                    tracing::warn!(%did, "stale identity no longer exists upstream");
                }
                Err(e) => {
                    tracing::warn!(%did, error = %e, "stale refresh failed, serving cached document");
                }
            }

            return Ok(hit.document);
        }

        self.resolve_refreshed(did).await
    }

    /// Resolves a DID document upstream, bypassing any cached copy. The
    /// result still lands in the cache.
    pub async fn resolve_refreshed(&self, did: &Did) -> DidResult<DidDocument> {
        match self.resolve_upstream(did).await {
            Ok(document) => {
                self.cache.store(did.clone(), document.clone());
                Ok(document)
            }
            Err(e) if e.is_not_found() => {
                self.cache.evict(did);
                Err(e)
            }
            // Transient failures never touch the cache.
            Err(e) => Err(e),
        }
    }

    /// Resolves the full identity projection: signing key, handle and
    /// personal data server endpoint. Fails distinctly for each missing
    /// field.
    pub async fn resolve_identity(&self, did: &Did) -> DidResult<Identity> {
        let document = self.resolve(did).await?;
        document.to_identity(&self.registry)
    }

    /// Resolves only the signing key. Unlike [`resolve_identity`], this
    /// works for identities without a handle or service endpoint, such as
    /// `did:key`.
    ///
    /// [`resolve_identity`]: DidResolver::resolve_identity
    pub async fn resolve_signing_key(&self, did: &Did) -> DidResult<PubKey> {
        let document = self.resolve(did).await?;
        document.signing_key(&self.registry)
    }

    async fn resolve_upstream(&self, did: &Did) -> DidResult<DidDocument> {
        let resolver = self
            .methods
            .get(did.method())
            .ok_or_else(|| DidError::UnsupportedMethod(did.method().to_string()))?;

        let document = resolver.resolve(did).await?;

        if &document.id != did {
            return Err(DidError::DocumentInvalid(format!(
                "document id {} does not match requested DID {did}",
                document.id
            )));
        }

        Ok(document)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl std::fmt::Debug for DidResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidResolver")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
