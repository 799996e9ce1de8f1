//! Reference-shaped fields: links, locations, workflow stages and
//! input/output maps.

use super::{text_at, Resolver};
use crate::error::{ClarityError, ClarityResult};
use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use crate::model::values::{InputOutput, Location, NamedLink, WorkflowStageStatus};
use crate::xml::Element;

/// Points `element` at `entity`. A `limsid` already on the element is kept
/// in step with the new target.
pub(super) fn write_ref(element: &mut Element, entity: &Entity) {
    element.set_attr("uri", entity.uri());
    if element.attr("limsid").is_some() {
        element.set_attr("limsid", entity.id());
    }
}

pub(super) fn read_links(
    root: &Element,
    path: &[&str],
    resolver: &Resolver<'_>,
) -> ClarityResult<Vec<NamedLink>> {
    root.find_all(path)
        .into_iter()
        .map(|element| {
            let uri = element.attr("uri").ok_or_else(|| {
                ClarityError::missing(format!(
                    "field `{}`: <{}> has no `uri` attribute",
                    resolver.field(),
                    element.local_name()
                ))
            })?;
            Ok(NamedLink {
                name: element.attr("name").map(str::to_string),
                uri: uri.to_string(),
            })
        })
        .collect()
}

pub(super) fn read_location(
    root: &Element,
    resolver: &Resolver<'_>,
) -> ClarityResult<Option<Location>> {
    let Some(location) = root.child("location") else {
        return Ok(None);
    };
    let container = location.child("container").ok_or_else(|| {
        ClarityError::missing(format!(
            "field `{}`: <location> has no <container>",
            resolver.field()
        ))
    })?;
    Ok(Some(Location {
        container: resolver.entity_at(container, EntityKind::Container)?,
        position: text_at(location, &["value"]).unwrap_or_default().to_string(),
    }))
}

/// Updates (or creates) `parent/location` in place: container reference
/// first, then the position value.
pub(super) fn write_location(parent: &mut Element, container: &Entity, position: &str) {
    let location = parent.ensure_child("location");
    let container_ref = location.ensure_child_before("container", "value");
    container_ref.set_attr("uri", container.uri());
    container_ref.set_attr("limsid", container.id());
    location.ensure_child("value").set_text(position);
}

pub(super) fn read_workflow_stages(
    root: &Element,
    resolver: &Resolver<'_>,
) -> ClarityResult<Vec<WorkflowStageStatus>> {
    root.find_all(&["workflow-stages", "workflow-stage"])
        .into_iter()
        .map(|element| {
            Ok(WorkflowStageStatus {
                stage: resolver.entity_at(element, EntityKind::Stage)?,
                status: element.attr("status").map(str::to_string),
                name: element.attr("name").map(str::to_string),
            })
        })
        .collect()
}

pub(super) fn read_input_outputs(
    root: &Element,
    path: &[&str],
    resolver: &Resolver<'_>,
) -> ClarityResult<Vec<InputOutput>> {
    root.find_all(path)
        .into_iter()
        .map(|map| {
            let input = map.child("input").ok_or_else(|| {
                ClarityError::missing(format!(
                    "field `{}`: <{}> has no <input>",
                    resolver.field(),
                    map.local_name()
                ))
            })?;
            let output = map.child("output");
            Ok(InputOutput {
                input: resolver.entity_at(input, EntityKind::Artifact)?,
                output: output
                    .map(|output| resolver.entity_at(output, EntityKind::Artifact))
                    .transpose()?,
                output_type: output
                    .and_then(|output| output.attr("output-type"))
                    .map(str::to_string),
            })
        })
        .collect()
}
