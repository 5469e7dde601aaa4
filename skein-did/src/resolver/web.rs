use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{Did, DidDocument, DidError, DidResult, WEB_METHOD};

use super::{
    plc::{build_client, fetch_document},
    MethodResolver,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves `did:web` identities from the identifier's own host.
///
/// The document is fetched from `https://<host>/.well-known/did.json`.
/// Identifiers carrying extra path segments (`did:web:example.com:alice`)
/// are rejected before any network call. Localhost hosts are fetched over
/// plain HTTP so local setups work without certificates.
#[derive(Debug, Clone)]
pub struct WebResolver {
    client: Client,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl WebResolver {
    /// Creates a resolver with the given per-request timeout.
    pub fn new(timeout: Duration) -> DidResult<Self> {
        Ok(WebResolver {
            client: build_client(timeout)?,
        })
    }

    fn host_of(did: &Did) -> DidResult<String> {
        let id = did.id();

        // Colons in the raw identifier are path separators, which name a
        // document outside the well-known location. A port survives as the
        // percent-encoded `%3A`.
        if id.contains(':') {
            return Err(DidError::UnsupportedPathScopedWeb(did.to_string()));
        }

        let host = urlencoding::decode(id)
            .map_err(|_| DidError::MalformedDid(did.to_string()))?
            .into_owned();

        if host.is_empty() {
            return Err(DidError::MalformedDid(did.to_string()));
        }

        Ok(host)
    }

    fn is_local(host: &str) -> bool {
        // Bracketed IPv6 hosts keep their colons; the port, if any, sits
        // after the closing bracket.
        let name = if let Some(rest) = host.strip_prefix('[') {
            match rest.split_once(']') {
                Some((addr, _)) => addr,
                None => rest,
            }
        } else {
            host.split(':').next().unwrap_or(host)
        };
        name == "localhost" || name == "127.0.0.1" || name == "::1"
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl MethodResolver for WebResolver {
    fn method(&self) -> &'static str {
        WEB_METHOD
    }

    async fn resolve(&self, did: &Did) -> DidResult<DidDocument> {
        let host = Self::host_of(did)?;
        let scheme = if Self::is_local(&host) { "http" } else { "https" };
        let url = format!("{scheme}://{host}/.well-known/did.json");

        fetch_document(&self.client, did, url).await
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
