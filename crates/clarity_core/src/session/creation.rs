//! Creation requests: documents POSTed to a collection URI.
//!
//! Each request type carries exactly the fields the server accepts for
//! creation; the response document is installed into the cached entity for
//! the returned `uri`.

use super::Session;
use crate::descriptor::format_date;
use crate::error::{ClarityError, ClarityResult};
use crate::model::catalog;
use crate::model::entity::Entity;
use crate::model::kind::{ns, EntityKind};
use crate::transport::Method;
use crate::xml::{self, Element};
use chrono::NaiveDate;
use log::{error, info};
use std::time::Instant;

fn expect_kind(entity: &Entity, kind: EntityKind, role: &str) -> ClarityResult<()> {
    if entity.kind() == kind {
        return Ok(());
    }
    Err(ClarityError::InvalidArgument(format!(
        "{role} must be a {}, got a {}",
        kind.name(),
        entity.kind().name()
    )))
}

fn ref_to(tag: &str, entity: &Entity) -> Element {
    Element::new(tag).with_attr("uri", entity.uri())
}

fn text(tag: &str, value: impl Into<String>) -> Element {
    Element::new(tag).with_text(value)
}

/// Starts a step from a protocol step and its input artifacts.
#[derive(Debug, Clone)]
pub struct StepCreation {
    pub protocol_step: Entity,
    pub inputs: Vec<Entity>,
    /// One count per input; every input gets 1 when unset.
    pub replicates: Option<Vec<u32>>,
    /// Defaults to the protocol step's first permitted container type.
    pub container_type: Option<String>,
}

impl StepCreation {
    pub fn new(protocol_step: Entity, inputs: Vec<Entity>) -> Self {
        Self {
            protocol_step,
            inputs,
            replicates: None,
            container_type: None,
        }
    }

    pub fn with_replicates(mut self, replicates: Vec<u32>) -> Self {
        self.replicates = Some(replicates);
        self
    }

    pub fn with_container_type(mut self, container_type: impl Into<String>) -> Self {
        self.container_type = Some(container_type.into());
        self
    }

    /// Builds the `stp:step-creation` body. Reads the protocol step's name
    /// and, when no container type was given, its permitted containers.
    pub fn to_element(&self) -> ClarityResult<Element> {
        expect_kind(&self.protocol_step, EntityKind::ProtocolStep, "protocol_step")?;
        for input in &self.inputs {
            expect_kind(input, EntityKind::Artifact, "input")?;
        }
        let replicates = match &self.replicates {
            Some(replicates) if replicates.len() != self.inputs.len() => {
                return Err(ClarityError::InvalidArgument(format!(
                    "{} replicate counts given for {} inputs",
                    replicates.len(),
                    self.inputs.len()
                )))
            }
            Some(replicates) => replicates.clone(),
            None => vec![1; self.inputs.len()],
        };

        let name = self.protocol_step.get_text("name")?.ok_or_else(|| {
            ClarityError::missing(format!(
                "protocol step {} has no name",
                self.protocol_step.uri()
            ))
        })?;
        let container_type = match &self.container_type {
            Some(container_type) => container_type.clone(),
            None => self
                .protocol_step
                .get_texts("permitted_containers")?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    ClarityError::InvalidArgument(format!(
                        "protocol step {} permits no container type; pass one explicitly",
                        self.protocol_step.uri()
                    ))
                })?,
        };

        let inputs = self
            .inputs
            .iter()
            .zip(replicates)
            .fold(Element::new("inputs"), |inputs, (input, count)| {
                inputs.with_child(ref_to("input", input).with_attr("replicates", count.to_string()))
            });
        let spec = EntityKind::Step.spec();
        Ok(
            Element::qualified(ns::STEP, spec.prefix, spec.creation_tag.unwrap_or(spec.root_tag))
                .with_child(ref_to("configuration", &self.protocol_step).with_text(name))
                .with_child(text("container-type", container_type))
                .with_child(inputs),
        )
    }
}

/// New sample placed in a container well.
#[derive(Debug, Clone)]
pub struct SampleCreation {
    pub name: String,
    pub project: Entity,
    pub container: Entity,
    pub position: String,
}

impl SampleCreation {
    pub fn new(
        name: impl Into<String>,
        project: Entity,
        container: Entity,
        position: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project,
            container,
            position: position.into(),
        }
    }

    pub fn to_element(&self) -> ClarityResult<Element> {
        expect_kind(&self.project, EntityKind::Project, "project")?;
        expect_kind(&self.container, EntityKind::Container, "container")?;
        let spec = EntityKind::Sample.spec();
        Ok(
            Element::qualified(ns::SAMPLE, spec.prefix, spec.creation_tag.unwrap_or(spec.root_tag))
                .with_child(text("name", self.name.as_str()))
                .with_child(ref_to("project", &self.project))
                .with_child(
                    Element::new("location")
                        .with_child(ref_to("container", &self.container))
                        .with_child(text("value", self.position.as_str())),
                ),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReagentKitCreation {
    pub name: String,
    pub supplier: Option<String>,
    pub website: Option<String>,
    pub catalogue_number: Option<String>,
    pub archived: bool,
}

impl ReagentKitCreation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supplier: None,
            website: None,
            catalogue_number: None,
            archived: false,
        }
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_catalogue_number(mut self, catalogue_number: impl Into<String>) -> Self {
        self.catalogue_number = Some(catalogue_number.into());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn to_element(&self) -> Element {
        let spec = EntityKind::ReagentKit.spec();
        let mut root = Element::qualified(ns::REAGENT_KIT, spec.prefix, spec.root_tag)
            .with_child(text("name", self.name.as_str()));
        let optional = [
            ("supplier", &self.supplier),
            ("website", &self.website),
            ("catalogue-number", &self.catalogue_number),
        ];
        for (tag, value) in optional {
            if let Some(value) = value {
                root.children.push(text(tag, value.as_str()));
            }
        }
        root.with_child(text("archived", self.archived.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ReagentLotCreation {
    pub reagent_kit: Entity,
    pub name: String,
    pub lot_number: String,
    pub expiry_date: Option<NaiveDate>,
    /// e.g. `ACTIVE`, `PENDING`, `ARCHIVED`.
    pub status: Option<String>,
}

impl ReagentLotCreation {
    pub fn new(reagent_kit: Entity, name: impl Into<String>, lot_number: impl Into<String>) -> Self {
        Self {
            reagent_kit,
            name: name.into(),
            lot_number: lot_number.into(),
            expiry_date: None,
            status: None,
        }
    }

    pub fn with_expiry_date(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn to_element(&self) -> ClarityResult<Element> {
        expect_kind(&self.reagent_kit, EntityKind::ReagentKit, "reagent_kit")?;
        let spec = EntityKind::ReagentLot.spec();
        let mut root = Element::qualified(ns::REAGENT_LOT, spec.prefix, spec.root_tag)
            .with_child(ref_to("reagent-kit", &self.reagent_kit))
            .with_child(text("name", self.name.as_str()))
            .with_child(text("lot-number", self.lot_number.as_str()));
        if let Some(expiry_date) = self.expiry_date {
            root.children.push(text("expiry-date", format_date(expiry_date)));
        }
        if let Some(status) = &self.status {
            root.children.push(text("status", status.as_str()));
        }
        Ok(root)
    }
}

impl Session {
    pub fn create_step(&self, request: &StepCreation) -> ClarityResult<Entity> {
        self.create(EntityKind::Step, request.to_element()?)
    }

    pub fn create_sample(&self, request: &SampleCreation) -> ClarityResult<Entity> {
        self.create(EntityKind::Sample, request.to_element()?)
    }

    pub fn create_reagent_kit(&self, request: &ReagentKitCreation) -> ClarityResult<Entity> {
        self.create(EntityKind::ReagentKit, request.to_element())
    }

    pub fn create_reagent_lot(&self, request: &ReagentLotCreation) -> ClarityResult<Entity> {
        self.create(EntityKind::ReagentLot, request.to_element()?)
    }

    /// POSTs `body` to the kind's collection and installs the response.
    ///
    /// # Errors
    /// - `InvalidArgument` for kinds without a collection URI.
    /// - `MalformedDocument` when the response is not a `kind` document or
    ///   has no `uri`.
    pub fn create(&self, kind: EntityKind, body: Element) -> ClarityResult<Entity> {
        let segment = kind.spec().uri_segment.ok_or_else(|| {
            ClarityError::InvalidArgument(format!("{} cannot be created directly", kind.name()))
        })?;
        let uri = self.get_uri(&[segment]);
        let started_at = Instant::now();

        let result = xml::to_bytes(&body)
            .and_then(|bytes| self.send(Method::Post, &uri, Some(bytes.as_slice())))
            .and_then(|response| xml::parse_document(&response.body))
            .and_then(|root| {
                let found = catalog::kind_of(&root)?;
                if found != kind {
                    return Err(ClarityError::MalformedDocument(format!(
                        "creating a {} returned a {} document",
                        kind.name(),
                        found.name()
                    )));
                }
                self.adopt(root)
            });

        match &result {
            Ok(entity) => info!(
                "event=entity_create module=session status=ok kind={} uri={} duration_ms={}",
                kind.name(),
                entity.uri(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=entity_create module=session status=error kind={} collection={} duration_ms={} error={}",
                kind.name(),
                uri,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{ReagentKitCreation, StepCreation};
    use crate::error::ClarityError;
    use crate::model::entity::Entity;
    use crate::model::kind::EntityKind;
    use std::rc::Weak;

    #[test]
    fn reagent_kit_body_skips_unset_fields() {
        let body = ReagentKitCreation::new("kit").with_website("www.kit.org").to_element();
        let tags: Vec<&str> = body.children.iter().map(|child| child.local_name()).collect();
        assert_eq!(body.local_name(), "reagent-kit");
        assert_eq!(tags, ["name", "website", "archived"]);
    }

    #[test]
    fn mismatched_replicate_count_is_rejected_before_any_fetch() {
        let protocol_step = Entity::new(EntityKind::ProtocolStep, "http://lims/p1s1", Weak::new());
        let input = Entity::new(EntityKind::Artifact, "http://lims/a1", Weak::new());
        let err = StepCreation::new(protocol_step, vec![input])
            .with_replicates(vec![1, 2])
            .to_element()
            .unwrap_err();
        assert!(matches!(err, ClarityError::InvalidArgument(_)));
    }
}
