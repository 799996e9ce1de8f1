//! Identity map of live entities.
//!
//! # Responsibility
//! - Hand out exactly one entity cell per `(kind, canonical URI)`.
//! - Never evict implicitly; only an explicit `clear` drops entries.
//!
//! # Invariants
//! - Query strings, fragments and trailing slashes never split a slot.
//! - A cache belongs to one session; two sessions never share cells.

use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use std::collections::HashMap;

/// Strips the query string, fragment and trailing slash from a URI.
pub fn canonical_uri(uri: &str) -> String {
    let uri = uri.trim();
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    let trimmed = uri[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        uri[..end].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Outcome of one cache lookup, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
}

#[derive(Default)]
pub struct EntityCache {
    entries: HashMap<(EntityKind, String), Entity>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: EntityKind, uri: &str) -> Option<Entity> {
        self.entries.get(&(kind, canonical_uri(uri))).cloned()
    }

    /// Returns the cached entity for `uri`, registering `create()` on a miss.
    pub fn get_or_insert_with(
        &mut self,
        kind: EntityKind,
        uri: &str,
        create: impl FnOnce() -> Entity,
    ) -> (Entity, CacheLookup) {
        let key = (kind, canonical_uri(uri));
        if let Some(existing) = self.entries.get(&key) {
            return (existing.clone(), CacheLookup::Hit);
        }
        let entity = create();
        self.entries.insert(key, entity.clone());
        (entity, CacheLookup::Miss)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Handles already given out stay usable but are no
    /// longer returned by lookups.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{canonical_uri, CacheLookup, EntityCache};
    use crate::model::entity::Entity;
    use crate::model::kind::EntityKind;
    use std::rc::Weak;

    #[test]
    fn canonical_uri_strips_version_suffixes() {
        assert_eq!(
            canonical_uri("http://lims/api/v2/artifacts/a1?state=12"),
            "http://lims/api/v2/artifacts/a1"
        );
        assert_eq!(
            canonical_uri("http://lims/api/v2/artifacts/a1/#x"),
            "http://lims/api/v2/artifacts/a1"
        );
        assert_eq!(canonical_uri("..."), "...");
    }

    #[test]
    fn repeated_lookup_returns_the_same_cell() {
        let mut cache = EntityCache::new();
        let uri = "http://lims/api/v2/containers/c1";
        let (first, lookup) = cache.get_or_insert_with(EntityKind::Container, uri, || {
            Entity::new(EntityKind::Container, uri, Weak::new())
        });
        assert_eq!(lookup, CacheLookup::Miss);

        let (second, lookup) = cache.get_or_insert_with(
            EntityKind::Container,
            "http://lims/api/v2/containers/c1?state=1",
            || panic!("cached entity must be reused"),
        );
        assert_eq!(lookup, CacheLookup::Hit);
        assert!(first.same_instance(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forgets_entries() {
        let mut cache = EntityCache::new();
        let uri = "http://lims/api/v2/samples/s1";
        cache.get_or_insert_with(EntityKind::Sample, uri, || {
            Entity::new(EntityKind::Sample, uri, Weak::new())
        });
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(EntityKind::Sample, uri).is_none());
    }
}
