//! Root-tag dispatch table.
//!
//! # Responsibility
//! - Map a namespace-qualified root element to its entity kind.
//! - Reject unknown roots instead of falling back to an untyped entity.
//!
//! # Invariants
//! - Both the normal root and the creation root of a kind resolve to it.
//! - Lookup ignores prefixes; only the namespace URI is consulted.

use crate::error::{ClarityError, ClarityResult};
use crate::model::kind::EntityKind;
use crate::xml::Element;
use once_cell::sync::Lazy;
use std::collections::HashMap;

type TagTable = HashMap<&'static str, HashMap<&'static str, EntityKind>>;

static CATALOG: Lazy<TagTable> = Lazy::new(|| {
    let mut table = TagTable::new();
    for kind in EntityKind::ALL {
        let spec = kind.spec();
        let tags = table.entry(spec.namespace).or_default();
        tags.insert(spec.root_tag, kind);
        if let Some(creation_tag) = spec.creation_tag {
            tags.insert(creation_tag, kind);
        }
    }
    table
});

/// Resolves a root element name to its entity kind.
pub fn kind_for_tag(namespace: Option<&str>, tag: &str) -> ClarityResult<EntityKind> {
    namespace
        .and_then(|namespace| CATALOG.get(namespace))
        .and_then(|tags| tags.get(tag).copied())
        .ok_or_else(|| ClarityError::UnsupportedEntityKind {
            namespace: namespace.map(str::to_string),
            tag: tag.to_string(),
        })
}

/// Resolves the kind of a parsed document from its root element.
pub fn kind_of(root: &Element) -> ClarityResult<EntityKind> {
    kind_for_tag(root.namespace(), root.local_name())
}

/// Number of registered root tags, creation roots included.
pub fn registered_roots() -> usize {
    CATALOG.values().map(HashMap::len).sum()
}

#[cfg(test)]
mod tests {
    use super::{kind_for_tag, kind_of, registered_roots};
    use crate::error::ClarityError;
    use crate::model::kind::{ns, EntityKind};
    use crate::xml::Element;

    #[test]
    fn same_local_tag_dispatches_by_namespace() {
        assert_eq!(
            kind_for_tag(Some(ns::STEP), "step").unwrap(),
            EntityKind::Step
        );
        assert_eq!(
            kind_for_tag(Some(ns::PROTOCOL), "step").unwrap(),
            EntityKind::ProtocolStep
        );
    }

    #[test]
    fn creation_roots_resolve_to_their_kind() {
        assert_eq!(
            kind_for_tag(Some(ns::SAMPLE), "samplecreation").unwrap(),
            EntityKind::Sample
        );
        assert_eq!(
            kind_for_tag(Some(ns::STEP), "step-creation").unwrap(),
            EntityKind::Step
        );
        assert_eq!(registered_roots(), EntityKind::ALL.len() + 2);
    }

    #[test]
    fn unknown_or_unqualified_roots_are_rejected() {
        let err = kind_of(&Element::qualified("http://example.com/ri/unknown", "x", "thing"))
            .unwrap_err();
        assert!(matches!(
            err,
            ClarityError::UnsupportedEntityKind { ref tag, .. } if tag == "thing"
        ));

        let err = kind_of(&Element::new("artifact")).unwrap_err();
        assert!(matches!(
            err,
            ClarityError::UnsupportedEntityKind { namespace: None, .. }
        ));
    }
}
