//! Placement diff for step placement documents.
//!
//! # Responsibility
//! - Read `output-placements` as an ordered placement list.
//! - Apply a new list as a minimal edit of the existing elements.
//!
//! # Invariants
//! - Output placements are keyed by the artifact's canonical URI; a kept
//!   element is updated in place and never moves.
//! - `selected-containers` ends up holding each container used by the new
//!   list exactly once.

use super::refs::write_location;
use super::{text_at, Resolver};
use crate::cache::canonical_uri;
use crate::error::{ClarityError, ClarityResult};
use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use crate::model::values::Placement;
use crate::xml::Element;
use log::debug;

const OUTPUT_PLACEMENTS: &str = "output-placements";
const OUTPUT_PLACEMENT: &str = "output-placement";
const SELECTED_CONTAINERS: &str = "selected-containers";
const CONTAINER: &str = "container";

fn keyed_by(element: &Element, tag: &str, key: &str) -> bool {
    element.name.matches(None, tag)
        && element
            .attr("uri")
            .is_some_and(|uri| canonical_uri(uri) == key)
}

pub(super) fn read(root: &Element, resolver: &Resolver<'_>) -> ClarityResult<Vec<Placement>> {
    root.find_all(&[OUTPUT_PLACEMENTS, OUTPUT_PLACEMENT])
        .into_iter()
        .map(|element| {
            let container = element.find(&["location", CONTAINER]).ok_or_else(|| {
                ClarityError::missing("<output-placement> has no <location>/<container>")
            })?;
            let position = text_at(element, &["location", "value"]).ok_or_else(|| {
                ClarityError::missing("<output-placement> has no <location>/<value>")
            })?;
            Ok(Placement {
                artifact: resolver.entity_at(element, EntityKind::Artifact)?,
                container: resolver.entity_at(container, EntityKind::Container)?,
                position: position.to_string(),
            })
        })
        .collect()
}

pub(super) fn write(root: &mut Element, placements: &[Placement]) {
    let wanted: Vec<&str> = placements
        .iter()
        .map(|placement| placement.artifact.canonical_uri())
        .collect();

    let outputs = root.ensure_child(OUTPUT_PLACEMENTS);
    let before = outputs.children.len();
    outputs.children.retain(|element| {
        !element.name.matches(None, OUTPUT_PLACEMENT)
            || element
                .attr("uri")
                .is_some_and(|uri| wanted.contains(&canonical_uri(uri).as_str()))
    });
    let removed = before - outputs.children.len();

    let mut added = 0;
    for placement in placements {
        let key = placement.artifact.canonical_uri();
        match outputs
            .children
            .iter_mut()
            .find(|element| keyed_by(element, OUTPUT_PLACEMENT, key))
        {
            Some(existing) => write_location(existing, &placement.container, &placement.position),
            None => {
                let mut element =
                    Element::new(OUTPUT_PLACEMENT).with_attr("uri", placement.artifact.uri());
                write_location(&mut element, &placement.container, &placement.position);
                outputs.children.push(element);
                added += 1;
            }
        }
    }

    let (containers_added, containers_removed) = sync_selected_containers(root, placements);
    debug!(
        "event=placement_diff module=descriptor status=ok placements={} added={} removed={} containers_added={} containers_removed={}",
        placements.len(),
        added,
        removed,
        containers_added,
        containers_removed
    );
}

/// Returns `(added, removed)` container references.
fn sync_selected_containers(root: &mut Element, placements: &[Placement]) -> (usize, usize) {
    let mut wanted: Vec<&Entity> = Vec::new();
    for placement in placements {
        if !wanted.contains(&&placement.container) {
            wanted.push(&placement.container);
        }
    }

    let selected = root.ensure_child_before(SELECTED_CONTAINERS, OUTPUT_PLACEMENTS);
    let before = selected.children.len();
    let mut kept: Vec<String> = Vec::new();
    selected.children.retain(|element| {
        if !element.name.matches(None, CONTAINER) {
            return true;
        }
        let Some(uri) = element.attr("uri").map(canonical_uri) else {
            return false;
        };
        let keep = !kept.contains(&uri)
            && wanted
                .iter()
                .any(|container| container.canonical_uri() == uri);
        if keep {
            kept.push(uri);
        }
        keep
    });
    let removed = before - selected.children.len();

    let mut added = 0;
    for container in wanted {
        if !kept.iter().any(|uri| uri == container.canonical_uri()) {
            selected
                .children
                .push(Element::new(CONTAINER).with_attr("uri", container.uri()));
            added += 1;
        }
    }
    (added, removed)
}
