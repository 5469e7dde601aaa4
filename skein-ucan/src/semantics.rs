use std::fmt::Debug;

use crate::{AbilityLevel, Capability, Resource, Segment};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The rules deciding whether a parent capability may delegate a child.
///
/// The protocol has had two incompatible resource-path shapes; each shape
/// is one stateless strategy value. A delegation link is valid only when
/// both the resource and the ability predicate hold.
pub trait DelegationSemantics: Debug + Send + Sync {
    /// Whether `parent`'s resource contains `child`'s.
    ///
    /// Requires equal DIDs, then walks declared segments outward-in: a
    /// wildcard in `parent` permits everything beneath it, a concrete
    /// mismatch denies, and a concrete parent segment against a wildcard
    /// child denies (the child would be broader).
    fn can_delegate_resource(&self, parent: &Resource, child: &Resource) -> bool;

    /// Whether `parent`'s ability level covers `child`'s.
    fn can_delegate_ability(&self, parent: AbilityLevel, child: AbilityLevel) -> bool {
        parent.satisfies(child)
    }

    /// Whether `parent` may delegate `child`: both predicates must hold.
    fn can_delegate(&self, parent: &Capability, child: &Capability) -> bool {
        self.can_delegate_resource(&parent.resource, &child.resource)
            && self.can_delegate_ability(parent.ability, child.ability)
    }
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The 3-segment shape: `did/collection/record`.
///
/// Pointers declaring a namespace level belong to the other protocol
/// generation and are not delegable under these rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordSemantics;

/// The 4-segment shape: `did/namespace/collection/record`.
///
/// A pointer that does not declare a namespace is treated as holding the
/// wildcard there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespacedSemantics;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

static WILDCARD: Segment = Segment::Wildcard;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Walks one path level. `Ok(true)` short-circuits to permitted,
/// `Ok(false)` to denied, `Err(())` means continue to the next level.
fn walk_level(parent: &Segment, child: &Segment) -> Result<bool, ()> {
    match (parent, child) {
        (Segment::Wildcard, _) => Ok(true),
        (Segment::Exact(_), Segment::Wildcard) => Ok(false),
        (Segment::Exact(p), Segment::Exact(c)) => {
            if p == c {
                Err(())
            } else {
                Ok(false)
            }
        }
    }
}

fn walk_levels<'a>(
    levels: impl IntoIterator<Item = (&'a Segment, &'a Segment)>,
) -> bool {
    for (parent, child) in levels {
        match walk_level(parent, child) {
            Ok(decision) => return decision,
            Err(()) => continue,
        }
    }

    // Every level matched exactly.
    true
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl DelegationSemantics for RecordSemantics {
    fn can_delegate_resource(&self, parent: &Resource, child: &Resource) -> bool {
        if parent.namespace.is_some() || child.namespace.is_some() {
            return false;
        }
        if parent.did != child.did {
            return false;
        }

        walk_levels([
            (&parent.collection, &child.collection),
            (&parent.record, &child.record),
        ])
    }
}

impl DelegationSemantics for NamespacedSemantics {
    fn can_delegate_resource(&self, parent: &Resource, child: &Resource) -> bool {
        if parent.did != child.did {
            return false;
        }

        let parent_namespace = parent.namespace.as_ref().unwrap_or(&WILDCARD);
        let child_namespace = child.namespace.as_ref().unwrap_or(&WILDCARD);

        walk_levels([
            (parent_namespace, child_namespace),
            (&parent.collection, &child.collection),
            (&parent.record, &child.record),
        ])
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use skein_did::Did;

    use super::*;

    fn did_x() -> Did {
        "did:plc:ewvi7nxzyoun6zhxrhs64oiz".parse().expect("valid did")
    }

    fn did_y() -> Did {
        "did:plc:yk4dd2qkboz2yv6tpubpc6co".parse().expect("valid did")
    }

    fn resource(did: Did, collection: &str, record: &str) -> Resource {
        Resource::new(
            did,
            collection.parse().expect("valid segment"),
            record.parse().expect("valid segment"),
        )
    }

    #[test]
    fn test_record_wildcard_covers_records_in_collection() {
        // Scenario: a grant over every record of one collection.
        let parent = resource(did_x(), "posts", "*");

        assert!(RecordSemantics
            .can_delegate_resource(&parent, &resource(did_x(), "posts", "abc")));
        assert!(!RecordSemantics
            .can_delegate_resource(&parent, &resource(did_x(), "likes", "abc")));
    }

    #[test]
    fn test_resource_delegation_is_reflexive() {
        for r in [
            resource(did_x(), "posts", "abc"),
            resource(did_x(), "posts", "*"),
            Resource::all(did_x()),
        ] {
            assert!(RecordSemantics.can_delegate_resource(&r, &r));
        }
    }

    #[test]
    fn test_resource_delegation_chains_transitively() {
        let a = Resource::all(did_x());
        let b = resource(did_x(), "posts", "*");
        let c = resource(did_x(), "posts", "abc");

        assert!(RecordSemantics.can_delegate_resource(&a, &b));
        assert!(RecordSemantics.can_delegate_resource(&b, &c));
        assert!(RecordSemantics.can_delegate_resource(&a, &c));
    }

    #[test]
    fn test_child_cannot_broaden_resource() {
        let parent = resource(did_x(), "posts", "abc");

        assert!(!RecordSemantics
            .can_delegate_resource(&parent, &resource(did_x(), "posts", "*")));
        assert!(!RecordSemantics.can_delegate_resource(&parent, &Resource::all(did_x())));
    }

    #[test]
    fn test_delegation_requires_equal_dids() {
        let parent = Resource::all(did_x());
        let child = resource(did_y(), "posts", "abc");

        assert!(!RecordSemantics.can_delegate_resource(&parent, &child));
        assert!(!NamespacedSemantics.can_delegate_resource(&parent, &child));
    }

    #[test]
    fn test_record_semantics_rejects_namespaced_pointers() {
        let namespaced = Resource::namespaced(
            did_x(),
            Segment::exact("app"),
            Segment::Wildcard,
            Segment::Wildcard,
        );

        assert!(!RecordSemantics.can_delegate_resource(&namespaced, &namespaced));
        assert!(!RecordSemantics
            .can_delegate_resource(&Resource::all(did_x()), &namespaced));
    }

    #[test]
    fn test_namespaced_semantics_missing_namespace_is_wildcard() {
        let parent = Resource::all(did_x());
        let child = Resource::namespaced(
            did_x(),
            Segment::exact("app"),
            Segment::exact("posts"),
            Segment::exact("abc"),
        );

        assert!(NamespacedSemantics.can_delegate_resource(&parent, &child));

        // The reverse narrows the namespace, so an undeclared (wildcard)
        // child namespace is broader than the parent's concrete one.
        assert!(!NamespacedSemantics.can_delegate_resource(&child, &parent));
    }

    #[test]
    fn test_namespaced_semantics_walks_namespace_first() {
        let parent = Resource::namespaced(
            did_x(),
            Segment::exact("app"),
            Segment::Wildcard,
            Segment::Wildcard,
        );
        let inside = Resource::namespaced(
            did_x(),
            Segment::exact("app"),
            Segment::exact("posts"),
            Segment::exact("abc"),
        );
        let outside = Resource::namespaced(
            did_x(),
            Segment::exact("other"),
            Segment::exact("posts"),
            Segment::exact("abc"),
        );

        assert!(NamespacedSemantics.can_delegate_resource(&parent, &inside));
        assert!(!NamespacedSemantics.can_delegate_resource(&parent, &outside));
    }

    #[test]
    fn test_ability_delegation_is_monotonic() {
        let semantics = RecordSemantics;

        assert!(semantics.can_delegate_ability(AbilityLevel::Write, AbilityLevel::Write));
        assert!(semantics.can_delegate_ability(AbilityLevel::Write, AbilityLevel::Maintenance));
        assert!(!semantics.can_delegate_ability(AbilityLevel::Maintenance, AbilityLevel::Write));
        assert!(!semantics.can_delegate_ability(AbilityLevel::Write, AbilityLevel::SuperUser));
    }

    #[test]
    fn test_can_delegate_requires_both_predicates() {
        let parent = Capability::new(resource(did_x(), "posts", "*"), AbilityLevel::Write);

        let narrower = Capability::new(
            resource(did_x(), "posts", "abc"),
            AbilityLevel::Maintenance,
        );
        assert!(RecordSemantics.can_delegate(&parent, &narrower));

        let escalating = Capability::new(
            resource(did_x(), "posts", "abc"),
            AbilityLevel::SuperUser,
        );
        assert!(!RecordSemantics.can_delegate(&parent, &escalating));

        let sideways = Capability::new(resource(did_x(), "likes", "abc"), AbilityLevel::Write);
        assert!(!RecordSemantics.can_delegate(&parent, &sideways));
    }
}
