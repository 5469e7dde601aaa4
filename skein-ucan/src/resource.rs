use std::{fmt::Display, str::FromStr};

use skein_did::Did;

use crate::{UcanError, UcanResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// URI scheme of resource pointers.
pub const RESOURCE_SCHEME: &str = "at://";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// One level of a resource path: a concrete name or the wildcard.
///
/// A segment is never absent. A pointer that does not spell out its deeper
/// levels holds [`Segment::Wildcard`] there, which is what makes it cover
/// everything beneath it during delegation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A concrete path component.
    Exact(String),

    /// Covers every value at this level and below.
    Wildcard,
}

/// A hierarchical address of the records a capability applies to.
///
/// The path under the DID has had two shapes over the protocol's history:
/// `collection/record` and `namespace/collection/record`. One type models
/// both; `namespace` is only declared by pointers minted under the
/// namespaced shape, and only consulted by its delegation rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    /// The identity whose data the pointer addresses.
    pub did: Did,

    /// Namespace level, declared only under the 4-segment shape.
    pub namespace: Option<Segment>,

    /// Collection level, e.g. a record type.
    pub collection: Segment,

    /// Record level, a single record key.
    pub record: Segment,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Segment {
    /// Creates an exact segment.
    pub fn exact(s: impl Into<String>) -> Self {
        Segment::Exact(s.into())
    }

    /// Whether the segment is the wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl Resource {
    /// Creates a 3-segment pointer covering everything under the DID.
    pub fn all(did: Did) -> Self {
        Resource {
            did,
            namespace: None,
            collection: Segment::Wildcard,
            record: Segment::Wildcard,
        }
    }

    /// Creates a 3-segment pointer.
    pub fn new(did: Did, collection: Segment, record: Segment) -> Self {
        Resource {
            did,
            namespace: None,
            collection,
            record,
        }
    }

    /// Creates a 4-segment pointer with a namespace level.
    pub fn namespaced(did: Did, namespace: Segment, collection: Segment, record: Segment) -> Self {
        Resource {
            did,
            namespace: Some(namespace),
            collection,
            record,
        }
    }

    /// The declared path segments, outermost first. The namespace level is
    /// present only when declared.
    pub fn segments(&self) -> Vec<&Segment> {
        let mut segments = Vec::with_capacity(3);
        if let Some(namespace) = &self.namespace {
            segments.push(namespace);
        }
        segments.push(&self.collection);
        segments.push(&self.record);
        segments
    }

    /// Returns the next broader pointer by wildcarding the most specific
    /// declared segment that is not already a wildcard, or `None` at the
    /// broadest form.
    pub fn vaguer(&self) -> Option<Resource> {
        let mut wider = self.clone();

        if !wider.record.is_wildcard() {
            wider.record = Segment::Wildcard;
            return Some(wider);
        }
        if !wider.collection.is_wildcard() {
            wider.collection = Segment::Wildcard;
            return Some(wider);
        }
        if let Some(namespace) = &wider.namespace {
            if !namespace.is_wildcard() {
                wider.namespace = Some(Segment::Wildcard);
                return Some(wider);
            }
        }

        None
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Exact(s) => write!(f, "{s}"),
            Segment::Wildcard => write!(f, "*"),
        }
    }
}

impl FromStr for Segment {
    type Err = UcanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(UcanError::InvalidResource("empty path segment".to_string())),
            "*" => Ok(Segment::Wildcard),
            _ => Ok(Segment::Exact(s.to_string())),
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{RESOURCE_SCHEME}{}", self.did)?;
        if let Some(namespace) = &self.namespace {
            write!(f, "/{namespace}")?;
        }
        write!(f, "/{}/{}", self.collection, self.record)
    }
}

impl FromStr for Resource {
    type Err = UcanError;

    fn from_str(s: &str) -> UcanResult<Self> {
        let rest = s
            .strip_prefix(RESOURCE_SCHEME)
            .ok_or_else(|| UcanError::InvalidResource(s.to_string()))?;

        let mut parts = rest.splitn(4, '/');
        let did: Did = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| UcanError::InvalidResource(s.to_string()))?
            .parse()
            .map_err(|_| UcanError::InvalidResource(s.to_string()))?;

        let declared: Vec<Segment> = parts
            .map(Segment::from_str)
            .collect::<UcanResult<_>>()
            .map_err(|_| UcanError::InvalidResource(s.to_string()))?;

        // Missing trailing segments are wildcards, never absent.
        let resource = match declared.len() {
            0 => Resource::all(did),
            1 => Resource::new(did, declared[0].clone(), Segment::Wildcard),
            2 => Resource::new(did, declared[0].clone(), declared[1].clone()),
            3 => Resource::namespaced(
                did,
                declared[0].clone(),
                declared[1].clone(),
                declared[2].clone(),
            ),
            _ => unreachable!("splitn(4) yields at most 3 path segments"),
        };

        Ok(resource)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn did() -> Did {
        "did:plc:ewvi7nxzyoun6zhxrhs64oiz"
            .parse()
            .expect("valid did")
    }

    #[test]
    fn test_resource_display_and_parse() -> anyhow::Result<()> {
        let resource = Resource::new(did(), Segment::exact("posts"), Segment::exact("abc"));
        let uri = resource.to_string();
        assert_eq!(uri, "at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/posts/abc");
        assert_eq!(uri.parse::<Resource>()?, resource);

        let namespaced = Resource::namespaced(
            did(),
            Segment::exact("app"),
            Segment::exact("posts"),
            Segment::Wildcard,
        );
        let uri = namespaced.to_string();
        assert_eq!(uri, "at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/app/posts/*");
        assert_eq!(uri.parse::<Resource>()?, namespaced);

        Ok(())
    }

    #[test]
    fn test_missing_trailing_segments_are_wildcards() -> anyhow::Result<()> {
        let resource: Resource = "at://did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse()?;
        assert_eq!(resource, Resource::all(did()));

        let resource: Resource = "at://did:plc:ewvi7nxzyoun6zhxrhs64oiz/posts".parse()?;
        assert_eq!(
            resource,
            Resource::new(did(), Segment::exact("posts"), Segment::Wildcard)
        );

        Ok(())
    }

    #[test]
    fn test_resource_parse_rejects_malformed() {
        for s in [
            "",
            "at://",
            "https://example.com/posts/abc",
            "at://not a did/posts/abc",
            "at://did:plc:abc//abc",
        ] {
            assert!(s.parse::<Resource>().is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_vaguer_widens_right_to_left() {
        let resource = Resource::new(did(), Segment::exact("posts"), Segment::exact("abc"));

        let wider = resource.vaguer().expect("record widens");
        assert_eq!(wider.record, Segment::Wildcard);
        assert_eq!(wider.collection, Segment::exact("posts"));

        let widest = wider.vaguer().expect("collection widens");
        assert_eq!(widest, Resource::all(did()));

        assert_eq!(widest.vaguer(), None);
    }

    #[test]
    fn test_vaguer_reaches_broadest_within_segment_count() {
        let resource = Resource::namespaced(
            did(),
            Segment::exact("app"),
            Segment::exact("posts"),
            Segment::exact("abc"),
        );

        let mut current = resource;
        let mut steps = 0;
        while let Some(wider) = current.vaguer() {
            current = wider;
            steps += 1;
        }

        assert_eq!(steps, 3);
        assert!(current.segments().iter().all(|s| s.is_wildcard()));
    }
}
