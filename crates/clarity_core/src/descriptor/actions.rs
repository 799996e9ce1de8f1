//! Step actions: next actions (read/write) and escalation (read-only).

use super::Resolver;
use crate::cache::canonical_uri;
use crate::error::ClarityResult;
use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use crate::model::values::{Escalation, EscalationStatus, NextAction};
use crate::xml::Element;

const NEXT_ACTIONS: &str = "next-actions";
const NEXT_ACTION: &str = "next-action";
const ARTIFACT_URI: &str = "artifact-uri";
const STEP_URI: &str = "step-uri";
const REWORK_STEP_URI: &str = "rework-step-uri";

pub(super) fn read_next_actions(
    root: &Element,
    resolver: &Resolver<'_>,
) -> ClarityResult<Vec<NextAction>> {
    let optional_step = |element: &Element, attr: &str| {
        element
            .attr(attr)
            .map(|uri| resolver.entity(EntityKind::Step, uri))
    };
    root.find_all(&[NEXT_ACTIONS, NEXT_ACTION])
        .into_iter()
        .map(|element| {
            Ok(NextAction {
                artifact: resolver.entity_by_attr(element, ARTIFACT_URI, EntityKind::Artifact)?,
                action: element.attr("action").map(str::to_string),
                step: optional_step(element, STEP_URI),
                rework_step: optional_step(element, REWORK_STEP_URI),
            })
        })
        .collect()
}

fn set_or_remove(element: &mut Element, attr: &str, value: Option<&str>) {
    match value {
        Some(value) => element.set_attr(attr, value),
        None => {
            element.remove_attr(attr);
        }
    }
}

fn apply(element: &mut Element, next_action: &NextAction) {
    set_or_remove(element, "action", next_action.action.as_deref());
    set_or_remove(element, STEP_URI, next_action.step.as_ref().map(Entity::uri));
    set_or_remove(
        element,
        REWORK_STEP_URI,
        next_action.rework_step.as_ref().map(Entity::uri),
    );
}

/// Updates `next-action` elements keyed by artifact; unlisted artifacts are
/// dropped and new ones appended.
pub(super) fn write_next_actions(root: &mut Element, next_actions: &[NextAction]) {
    let wanted: Vec<&str> = next_actions
        .iter()
        .map(|next_action| next_action.artifact.canonical_uri())
        .collect();
    let list = root.ensure_child(NEXT_ACTIONS);
    list.children.retain(|element| {
        !element.name.matches(None, NEXT_ACTION)
            || element
                .attr(ARTIFACT_URI)
                .is_some_and(|uri| wanted.contains(&canonical_uri(uri).as_str()))
    });

    for next_action in next_actions {
        let key = next_action.artifact.canonical_uri();
        let existing = list.children.iter_mut().find(|element| {
            element.name.matches(None, NEXT_ACTION)
                && element
                    .attr(ARTIFACT_URI)
                    .is_some_and(|uri| canonical_uri(uri) == key)
        });
        match existing {
            Some(element) => apply(element, next_action),
            None => {
                let mut element =
                    Element::new(NEXT_ACTION).with_attr(ARTIFACT_URI, next_action.artifact.uri());
                apply(&mut element, next_action);
                list.children.push(element);
            }
        }
    }
}

/// Escalation block, if the step has one.
///
/// The request author asked; the review author answered. A present
/// `<review>` marks the escalation reviewed.
pub(super) fn read_escalation(
    root: &Element,
    resolver: &Resolver<'_>,
) -> ClarityResult<Option<Escalation>> {
    let Some(escalation) = root.child("escalation") else {
        return Ok(None);
    };
    let researcher = |element: Option<&Element>| {
        element
            .map(|element| resolver.entity_at(element, EntityKind::Researcher))
            .transpose()
    };
    let comment = |element: Option<&Element>| {
        element
            .and_then(|element| element.child("comment"))
            .and_then(Element::trimmed_text)
            .map(str::to_string)
    };

    let request = escalation.child("request");
    let review = escalation.child("review");
    let reviewer = match review {
        Some(review) => review.child("author"),
        None => request.and_then(|request| request.child("reviewer")),
    };

    Ok(Some(Escalation {
        status: if review.is_some() {
            EscalationStatus::Reviewed
        } else {
            EscalationStatus::Pending
        },
        author: researcher(request.and_then(|request| request.child("author")))?,
        reviewer: researcher(reviewer)?,
        request: comment(request),
        answer: comment(review),
        artifacts: escalation
            .find_all(&["escalated-artifacts", "escalated-artifact"])
            .into_iter()
            .map(|element| resolver.entity_at(element, EntityKind::Artifact))
            .collect::<ClarityResult<_>>()?,
    }))
}
