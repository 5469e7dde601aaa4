use serde::{Deserialize, Serialize};
use skein_key::PubKey;
use typed_builder::TypedBuilder;

use crate::{Did, DidError, DidResult, VerifierRegistry};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Fragment of the verification method carrying the repository signing key.
pub const SIGNING_KEY_FRAGMENT: &str = "#atproto";

/// Fragment of the service entry pointing at the personal data server.
pub const PDS_SERVICE_FRAGMENT: &str = "#atproto_pds";

/// Service type of the personal data server entry.
pub const PDS_SERVICE_TYPE: &str = "AtprotoPersonalDataServer";

/// Scheme used for handle aliases in `alsoKnownAs`.
pub const HANDLE_SCHEME: &str = "at://";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A DID document: the public description of an identity as returned by a
/// resolution method.
///
/// Only the fields this crate consumes are modeled. Unknown fields in the
/// wire form are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The DID this document describes.
    pub id: Did,

    /// Alias URIs for the identity, including handle aliases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub also_known_as: Vec<String>,

    /// Public keys the identity can be verified against.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub verification_method: Vec<VerificationMethod>,

    /// Service endpoints the identity advertises.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub service: Vec<Service>,
}

/// A public key entry in a DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Identifier of the entry, usually `<did>#<fragment>`.
    pub id: String,

    /// Key representation type, e.g. `Multikey`.
    #[serde(rename = "type")]
    pub method_type: String,

    /// The DID that controls this key.
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Did>,

    /// The key itself, multibase-encoded over its multicodec prefix.
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
}

/// A service endpoint entry in a DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Identifier of the entry, usually `#<fragment>`.
    pub id: String,

    /// Service type, e.g. `AtprotoPersonalDataServer`.
    #[serde(rename = "type")]
    pub service_type: String,

    /// Endpoint URL of the service.
    pub service_endpoint: String,
}

/// The distilled view of a resolved identity: DID, signing key, declared
/// handle and home server endpoint.
///
/// An `Identity` only exists when all four parts are present and valid, so
/// downstream code never has to re-check the document shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The resolved DID.
    pub did: Did,

    /// The repository signing key.
    pub signing_key: PubKey,

    /// Handle declared by the identity, not independently verified.
    pub handle: String,

    /// URL of the identity's personal data server.
    pub pds_endpoint: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DidDocument {
    /// Returns the multikey string of the repository signing key, if the
    /// document declares one.
    ///
    /// The signing key is the verification method whose id ends with the
    /// signing fragment. Both `#atproto` and `<did>#atproto` forms appear in
    /// the wild and both are accepted.
    pub fn signing_multikey(&self) -> Option<&str> {
        self.verification_method
            .iter()
            .find(|vm| vm.id.ends_with(SIGNING_KEY_FRAGMENT))
            .and_then(|vm| vm.public_key_multibase.as_deref())
    }

    /// Decodes the repository signing key through the given registry.
    pub fn signing_key(&self, registry: &VerifierRegistry) -> DidResult<PubKey> {
        let multikey = self
            .signing_multikey()
            .ok_or_else(|| DidError::MissingSigningKey(self.id.clone()))?;

        registry
            .decode_multikey(multikey)
            .map_err(|e| match e {
                e @ DidError::UnsupportedKeySuite(..) => e,
                _ => DidError::InvalidSigningKey(self.id.clone()),
            })
    }

    /// Returns the handle declared in `alsoKnownAs`, without its scheme
    /// prefix, if any alias carries one.
    pub fn handle(&self) -> Option<&str> {
        self.also_known_as
            .iter()
            .find_map(|aka| aka.strip_prefix(HANDLE_SCHEME))
    }

    /// Returns the personal data server endpoint, if declared.
    pub fn pds_endpoint(&self) -> Option<&str> {
        self.service
            .iter()
            .find(|s| s.id.ends_with(PDS_SERVICE_FRAGMENT) && s.service_type == PDS_SERVICE_TYPE)
            .map(|s| s.service_endpoint.as_str())
    }

    /// Distills the document into a full [`Identity`], failing if any of the
    /// required parts is missing or malformed.
    pub fn to_identity(&self, registry: &VerifierRegistry) -> DidResult<Identity> {
        let signing_key = self.signing_key(registry)?;

        let handle = self
            .handle()
            .ok_or_else(|| DidError::MissingHandle(self.id.clone()))?
            .to_string();

        let pds_endpoint = self
            .pds_endpoint()
            .ok_or_else(|| DidError::MissingPdsEndpoint(self.id.clone()))?
            .to_string();

        Ok(Identity {
            did: self.id.clone(),
            signing_key,
            handle,
            pds_endpoint,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use skein_key::{Ed25519KeyPair, KeyPairGenerate};

    use crate::encode_multikey;

    use super::*;

    fn sample_document(did: &Did, multikey: String) -> DidDocument {
        DidDocument::builder()
            .id(did.clone())
            .also_known_as(vec![format!("{HANDLE_SCHEME}alice.example.com")])
            .verification_method(vec![VerificationMethod::builder()
                .id(format!("{did}{SIGNING_KEY_FRAGMENT}"))
                .method_type("Multikey".to_string())
                .controller(did.clone())
                .public_key_multibase(multikey)
                .build()])
            .service(vec![Service::builder()
                .id(PDS_SERVICE_FRAGMENT.to_string())
                .service_type(PDS_SERVICE_TYPE.to_string())
                .service_endpoint("https://pds.example.com".to_string())
                .build()])
            .build()
    }

    #[test]
    fn test_document_extraction() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;
        let multikey = encode_multikey(&key_pair.public_key().into());

        let did: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        let document = sample_document(&did, multikey.clone());

        assert_eq!(document.signing_multikey(), Some(multikey.as_str()));
        assert_eq!(document.handle(), Some("alice.example.com"));
        assert_eq!(document.pds_endpoint(), Some("https://pds.example.com"));

        let identity = document.to_identity(&VerifierRegistry::standard())?;
        assert_eq!(identity.did, did);
        assert_eq!(identity.handle, "alice.example.com");
        assert_eq!(identity.signing_key, key_pair.public_key().into());

        Ok(())
    }

    #[test]
    fn test_document_missing_parts() -> anyhow::Result<()> {
        let did: Did = "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        let registry = VerifierRegistry::standard();

        let bare = DidDocument::builder().id(did.clone()).build();
        assert!(matches!(
            bare.to_identity(&registry),
            Err(DidError::MissingSigningKey(_))
        ));

        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;
        let multikey = encode_multikey(&key_pair.public_key().into());

        let mut without_handle = sample_document(&did, multikey);
        without_handle.also_known_as.clear();
        assert!(matches!(
            without_handle.to_identity(&registry),
            Err(DidError::MissingHandle(_))
        ));

        Ok(())
    }

    #[test]
    fn test_document_wire_format() -> anyhow::Result<()> {
        let json = r##"{
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": "did:plc:ewvi7nxzyoun6zhxrhs64oiz",
            "alsoKnownAs": ["at://alice.example.com"],
            "verificationMethod": [{
                "id": "did:plc:ewvi7nxzyoun6zhxrhs64oiz#atproto",
                "type": "Multikey",
                "controller": "did:plc:ewvi7nxzyoun6zhxrhs64oiz",
                "publicKeyMultibase": "zQ3shXjHeiBuRCKmM36cuYnm7YEMzhGnCmCyW92sRJ9pribSF"
            }],
            "service": [{
                "id": "#atproto_pds",
                "type": "AtprotoPersonalDataServer",
                "serviceEndpoint": "https://pds.example.com"
            }]
        }"##;

        let document: DidDocument = serde_json::from_str(json)?;
        assert_eq!(document.id.as_str(), "did:plc:ewvi7nxzyoun6zhxrhs64oiz");
        assert_eq!(document.handle(), Some("alice.example.com"));
        assert_eq!(document.pds_endpoint(), Some("https://pds.example.com"));
        assert!(document.signing_multikey().is_some());

        Ok(())
    }
}
