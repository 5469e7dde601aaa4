use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, redirect::Policy, Client, StatusCode};

use crate::{Did, DidDocument, DidError, DidResult, PLC_METHOD};

use super::MethodResolver;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const DID_JSON_ACCEPT: &str = "application/did+ld+json,application/json";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves `did:plc` identities against a directory service.
///
/// One HTTP GET per resolution, no retries, no caching. Redirects are not
/// followed: a directory that answers with a 3xx is treated as a transient
/// failure rather than an invitation to resolve elsewhere.
#[derive(Debug, Clone)]
pub struct PlcResolver {
    client: Client,
    directory_url: String,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

pub(super) async fn fetch_document(
    client: &Client,
    did: &Did,
    url: String,
) -> DidResult<DidDocument> {
    tracing::debug!(%did, %url, "fetching DID document");

    let response = client
        .get(&url)
        .header(ACCEPT, DID_JSON_ACCEPT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                DidError::Timeout(did.clone())
            } else {
                DidError::Network(did.clone(), e.to_string())
            }
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(DidError::NotFound(did.clone()));
    }
    if !status.is_success() {
        return Err(DidError::TransientHttp {
            did: did.clone(),
            status: status.as_u16(),
        });
    }

    response
        .json::<DidDocument>()
        .await
        .map_err(|e| DidError::DocumentInvalid(e.to_string()))
}

pub(super) fn build_client(timeout: Duration) -> DidResult<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .build()?;

    Ok(client)
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PlcResolver {
    /// Creates a resolver pointed at the given directory base URL.
    pub fn new(directory_url: impl Into<String>, timeout: Duration) -> DidResult<Self> {
        let directory_url = directory_url.into().trim_end_matches('/').to_string();

        Ok(PlcResolver {
            client: build_client(timeout)?,
            directory_url,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl MethodResolver for PlcResolver {
    fn method(&self) -> &'static str {
        PLC_METHOD
    }

    async fn resolve(&self, did: &Did) -> DidResult<DidDocument> {
        let url = format!(
            "{}/{}",
            self.directory_url,
            urlencoding::encode(did.as_str())
        );

        fetch_document(&self.client, did, url).await
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
