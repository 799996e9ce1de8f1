//! Descriptor layer: typed fields bound to locations in an entity document.
//!
//! # Responsibility
//! - Declare, per entity kind, which fields exist and where they live.
//! - Read and write those fields against the entity's held document.
//!
//! # Invariants
//! - Every read goes back to the document; no value is cached beside it.
//! - Reads load the entity first. Writes touch memory only, until the
//!   entity is saved through its session.
//! - Writing one field never disturbs sibling elements of other tags.
//!
//! # See also
//! - `fields` for the per-kind tables.
//! - `placement` for the placement diff.

mod actions;
mod fields;
mod placement;
mod refs;
mod udf;

pub use fields::{field_def, fields_of};

use crate::error::{ClarityError, ClarityResult};
use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use crate::model::values::{
    Escalation, FieldValue, InputOutput, Location, NamedLink, NextAction, Placement, UdfMap,
    UdfValue, WorkflowStageStatus,
};
use crate::session::Session;
use crate::xml::Element;
use chrono::NaiveDate;

/// Child element names from the document root; empty means the root itself.
pub type Path = &'static [&'static str];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shape of one field inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// Text of the element at `path`.
    Text(Path),
    /// Attribute on the document root.
    Attribute(&'static str),
    Integer(Path),
    /// `true` or `false`, case-sensitive.
    Boolean(Path),
    /// `YYYY-MM-DD`.
    Date(Path),
    /// `uri` attribute of the element at `path`.
    EntityRef { path: Path, kind: EntityKind },
    /// `uri` attributes of every element matching `path`, in document order.
    EntityList { path: Path, kind: EntityKind },
    TextList(Path),
    /// `name` + `uri` pairs of every element matching `path`.
    NamedLinks(Path),
    /// `udf:field` children of the element at `path`.
    Udf(Path),
    /// `location/container` plus `location/value`.
    Location,
    WorkflowStages,
    NextActions,
    Escalation,
    InputOutputMaps(Path),
    Placements,
}

impl Descriptor {
    pub const fn is_writable(self) -> bool {
        !matches!(
            self,
            Self::EntityList { .. }
                | Self::NamedLinks(_)
                | Self::WorkflowStages
                | Self::Escalation
                | Self::InputOutputMaps(_)
        )
    }

    /// Value shape named in type errors.
    pub const fn value_type(self) -> &'static str {
        match self {
            Self::Text(_) | Self::Attribute(_) => "text",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::EntityRef { .. } => "entity",
            Self::EntityList { .. } => "entity list",
            Self::TextList(_) => "text list",
            Self::NamedLinks(_) => "link list",
            Self::Udf(_) => "udf map",
            Self::Location => "location",
            Self::WorkflowStages => "workflow stage list",
            Self::NextActions => "next action list",
            Self::Escalation => "escalation",
            Self::InputOutputMaps(_) => "input/output list",
            Self::Placements => "placement list",
        }
    }
}

/// One named field of an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub descriptor: Descriptor,
    pub writable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, descriptor: Descriptor) -> Self {
        Self {
            name,
            descriptor,
            writable: descriptor.is_writable(),
        }
    }

    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// Turns references found in a document into cached entities.
pub(crate) struct Resolver<'a> {
    session: &'a Session,
    field: &'a str,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(session: &'a Session, field: &'a str) -> Self {
        Self { session, field }
    }

    pub(crate) fn field(&self) -> &str {
        self.field
    }

    pub(crate) fn entity(&self, kind: EntityKind, uri: &str) -> Entity {
        self.session.entity(kind, uri)
    }

    /// Entity named by `element`'s `uri` attribute.
    pub(crate) fn entity_at(&self, element: &Element, kind: EntityKind) -> ClarityResult<Entity> {
        self.entity_by_attr(element, "uri", kind)
    }

    pub(crate) fn entity_by_attr(
        &self,
        element: &Element,
        attr: &str,
        kind: EntityKind,
    ) -> ClarityResult<Entity> {
        let uri = element.attr(attr).ok_or_else(|| {
            ClarityError::missing(format!(
                "field `{}`: <{}> has no `{attr}` attribute",
                self.field,
                element.local_name()
            ))
        })?;
        Ok(self.entity(kind, uri))
    }
}

pub(crate) fn text_at<'e>(root: &'e Element, path: &[&str]) -> Option<&'e str> {
    root.find(path).and_then(Element::trimmed_text)
}

pub(crate) fn parse_bool(field: &str, raw: &str) -> ClarityResult<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ClarityError::conversion(field, raw, "boolean")),
    }
}

pub(crate) fn parse_date(field: &str, raw: &str) -> ClarityResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ClarityError::conversion(field, raw, "date (YYYY-MM-DD)"))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_integer(field: &str, raw: &str) -> ClarityResult<i64> {
    raw.parse()
        .map_err(|_| ClarityError::conversion(field, raw, "integer"))
}

/// Reads one field from a loaded document.
pub(crate) fn read(
    def: &FieldDef,
    root: &Element,
    resolver: &Resolver<'_>,
) -> ClarityResult<Option<FieldValue>> {
    let field = def.name;
    let value = match def.descriptor {
        Descriptor::Text(path) => text_at(root, path).map(|text| FieldValue::Text(text.to_string())),
        Descriptor::Attribute(name) => root.attr(name).map(|value| FieldValue::Text(value.to_string())),
        Descriptor::Integer(path) => text_at(root, path)
            .map(|raw| parse_integer(field, raw).map(FieldValue::Integer))
            .transpose()?,
        Descriptor::Boolean(path) => text_at(root, path)
            .map(|raw| parse_bool(field, raw).map(FieldValue::Boolean))
            .transpose()?,
        Descriptor::Date(path) => text_at(root, path)
            .map(|raw| parse_date(field, raw).map(FieldValue::Date))
            .transpose()?,
        Descriptor::EntityRef { path, kind } => root
            .find(path)
            .map(|element| resolver.entity_at(element, kind).map(FieldValue::Entity))
            .transpose()?,
        Descriptor::EntityList { path, kind } => Some(FieldValue::Entities(
            root.find_all(path)
                .into_iter()
                .map(|element| resolver.entity_at(element, kind))
                .collect::<ClarityResult<_>>()?,
        )),
        Descriptor::TextList(path) => Some(FieldValue::Texts(
            root.find_all(path)
                .into_iter()
                .filter_map(Element::trimmed_text)
                .map(str::to_string)
                .collect(),
        )),
        Descriptor::NamedLinks(path) => Some(FieldValue::Links(refs::read_links(root, path, resolver)?)),
        Descriptor::Udf(parent) => Some(FieldValue::Udf(match root.find(parent) {
            Some(parent) => udf::read(parent)?,
            None => UdfMap::new(),
        })),
        Descriptor::Location => refs::read_location(root, resolver)?.map(FieldValue::Location),
        Descriptor::WorkflowStages => Some(FieldValue::WorkflowStages(
            refs::read_workflow_stages(root, resolver)?,
        )),
        Descriptor::NextActions => Some(FieldValue::NextActions(actions::read_next_actions(
            root, resolver,
        )?)),
        Descriptor::Escalation => actions::read_escalation(root, resolver)?.map(FieldValue::Escalation),
        Descriptor::InputOutputMaps(path) => Some(FieldValue::InputOutputs(
            refs::read_input_outputs(root, path, resolver)?,
        )),
        Descriptor::Placements => Some(FieldValue::Placements(placement::read(root, resolver)?)),
    };
    Ok(value)
}

/// Writes one field into a loaded document.
pub(crate) fn write(def: &FieldDef, root: &mut Element, value: FieldValue) -> ClarityResult<()> {
    let mismatch = |expected: &'static str| ClarityError::FieldType {
        field: def.name.to_string(),
        expected,
    };
    match (def.descriptor, value) {
        (Descriptor::Text(path), FieldValue::Text(text)) => {
            if text.trim().is_empty() {
                return Err(ClarityError::InvalidArgument(format!(
                    "{} cannot be blank; clear the field instead",
                    def.name
                )));
            }
            root.ensure_path(path).set_text(text)
        }
        (Descriptor::Attribute(name), FieldValue::Text(text)) => root.set_attr(name, text),
        (Descriptor::Integer(path), FieldValue::Integer(value)) => {
            root.ensure_path(path).set_text(value.to_string())
        }
        (Descriptor::Boolean(path), FieldValue::Boolean(value)) => {
            root.ensure_path(path).set_text(value.to_string())
        }
        (Descriptor::Date(path), FieldValue::Date(value)) => {
            root.ensure_path(path).set_text(format_date(value))
        }
        (Descriptor::EntityRef { path, kind }, FieldValue::Entity(entity)) => {
            if entity.kind() != kind {
                return Err(mismatch(kind.name()));
            }
            refs::write_ref(root.ensure_path(path), &entity);
        }
        (Descriptor::TextList(path), FieldValue::Texts(values)) => {
            let Some((item, parents)) = path.split_last() else {
                return Err(mismatch("text list"));
            };
            let parent = root.ensure_path(parents);
            parent.remove_children(item);
            parent
                .children
                .extend(values.into_iter().map(|value| Element::new(*item).with_text(value)));
        }
        (Descriptor::Udf(parent), FieldValue::Udf(map)) => udf::write_all(root.ensure_path(parent), &map),
        (Descriptor::Location, FieldValue::Location(location)) => {
            refs::write_location(root, &location.container, &location.position)
        }
        (Descriptor::NextActions, FieldValue::NextActions(next_actions)) => {
            actions::write_next_actions(root, &next_actions)
        }
        (Descriptor::Placements, FieldValue::Placements(placements)) => {
            placement::write(root, &placements)
        }
        (descriptor, _) => return Err(mismatch(descriptor.value_type())),
    }
    Ok(())
}

/// Removes a field from a loaded document; absent fields are a no-op.
pub(crate) fn clear(def: &FieldDef, root: &mut Element) -> ClarityResult<()> {
    match def.descriptor {
        Descriptor::Attribute(name) => {
            root.remove_attr(name);
        }
        Descriptor::Text(path)
        | Descriptor::Integer(path)
        | Descriptor::Boolean(path)
        | Descriptor::Date(path)
        | Descriptor::TextList(path)
        | Descriptor::EntityRef { path, .. } => remove_at(root, path),
        Descriptor::Udf(parent) => {
            if let Some(parent) = root.find_mut(parent) {
                udf::write_all(parent, &UdfMap::new());
            }
        }
        Descriptor::Location => remove_at(root, &["location"]),
        Descriptor::NextActions => actions::write_next_actions(root, &[]),
        Descriptor::Placements => placement::write(root, &[]),
        _ => {
            return Err(ClarityError::ReadOnlyField {
                field: def.name.to_string(),
            })
        }
    }
    Ok(())
}

fn remove_at(root: &mut Element, path: &[&str]) {
    if let Some((last, parents)) = path.split_last() {
        if let Some(parent) = root.find_mut(parents) {
            parent.remove_children(last);
        }
    }
}

fn wrong_type(field: &str, expected: &'static str) -> ClarityError {
    ClarityError::FieldType {
        field: field.to_string(),
        expected,
    }
}

impl Entity {
    /// Field definition for `name` on this entity's kind.
    pub fn field(&self, name: &str) -> ClarityResult<&'static FieldDef> {
        field_def(self.kind(), name).ok_or_else(|| ClarityError::UnknownField {
            kind: self.kind(),
            field: name.to_string(),
        })
    }

    /// Reads a field, loading the document first if needed.
    ///
    /// Absent scalar fields read as `None`; list-shaped fields always return
    /// a (possibly empty) list.
    pub fn get(&self, name: &str) -> ClarityResult<Option<FieldValue>> {
        let def = self.field(name)?;
        let session = self.session()?;
        let resolver = Resolver::new(&session, def.name);
        self.with_root(|root| read(def, root, &resolver))
    }

    /// Writes a field into the in-memory document.
    ///
    /// # Errors
    /// - `InvalidArgument` for blank text, which would read back as absent.
    pub fn set(&self, name: &str, value: impl Into<FieldValue>) -> ClarityResult<()> {
        let def = self.field(name)?;
        if !def.writable {
            return Err(ClarityError::ReadOnlyField {
                field: def.name.to_string(),
            });
        }
        let value = value.into();
        self.with_root_mut(|root| write(def, root, value))
    }

    /// Removes a field from the in-memory document.
    pub fn clear(&self, name: &str) -> ClarityResult<()> {
        let def = self.field(name)?;
        if !def.writable {
            return Err(ClarityError::ReadOnlyField {
                field: def.name.to_string(),
            });
        }
        self.with_root_mut(|root| clear(def, root))
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(FieldValue) -> Option<T>,
    ) -> ClarityResult<Option<T>> {
        match self.get(name)? {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| wrong_type(name, expected)),
        }
    }

    pub fn get_text(&self, name: &str) -> ClarityResult<Option<String>> {
        self.typed(name, "text", |value| match value {
            FieldValue::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn get_integer(&self, name: &str) -> ClarityResult<Option<i64>> {
        self.typed(name, "integer", |value| value.as_integer())
    }

    pub fn get_bool(&self, name: &str) -> ClarityResult<Option<bool>> {
        self.typed(name, "boolean", |value| value.as_bool())
    }

    pub fn get_date(&self, name: &str) -> ClarityResult<Option<NaiveDate>> {
        self.typed(name, "date", |value| value.as_date())
    }

    pub fn get_entity(&self, name: &str) -> ClarityResult<Option<Entity>> {
        self.typed(name, "entity", |value| match value {
            FieldValue::Entity(entity) => Some(entity),
            _ => None,
        })
    }

    pub fn get_entities(&self, name: &str) -> ClarityResult<Vec<Entity>> {
        Ok(self
            .typed(name, "entity list", FieldValue::into_entities)?
            .unwrap_or_default())
    }

    pub fn get_texts(&self, name: &str) -> ClarityResult<Vec<String>> {
        Ok(self
            .typed(name, "text list", FieldValue::into_texts)?
            .unwrap_or_default())
    }

    /// Every user-defined field of this entity.
    pub fn udf(&self) -> ClarityResult<UdfMap> {
        Ok(self
            .typed("udf", "udf map", |value| match value {
                FieldValue::Udf(map) => Some(map),
                _ => None,
            })?
            .unwrap_or_default())
    }

    pub fn udf_value(&self, name: &str) -> ClarityResult<Option<UdfValue>> {
        Ok(self.udf()?.remove(name))
    }

    /// Sets one user-defined field, keeping an existing `type` attribute.
    pub fn set_udf(&self, name: &str, value: impl Into<UdfValue>) -> ClarityResult<()> {
        let Descriptor::Udf(parent) = self.field("udf")?.descriptor else {
            return Err(wrong_type("udf", "udf map"));
        };
        let value = value.into();
        self.with_root_mut(|root| {
            udf::write_one(root.ensure_path(parent), name, &value);
            Ok(())
        })
    }

    /// Removes one user-defined field; returns whether it existed.
    pub fn remove_udf(&self, name: &str) -> ClarityResult<bool> {
        let Descriptor::Udf(parent) = self.field("udf")?.descriptor else {
            return Err(wrong_type("udf", "udf map"));
        };
        self.with_root_mut(|root| Ok(root.find_mut(parent).is_some_and(|parent| udf::remove_one(parent, name))))
    }

    pub fn location(&self) -> ClarityResult<Option<Location>> {
        self.typed("location", "location", |value| match value {
            FieldValue::Location(location) => Some(location),
            _ => None,
        })
    }

    pub fn workflow_stages(&self) -> ClarityResult<Vec<WorkflowStageStatus>> {
        Ok(self
            .typed("workflow_stages", "workflow stage list", |value| match value {
                FieldValue::WorkflowStages(stages) => Some(stages),
                _ => None,
            })?
            .unwrap_or_default())
    }

    pub fn input_outputs(&self) -> ClarityResult<Vec<InputOutput>> {
        Ok(self
            .typed("input_output_maps", "input/output list", |value| match value {
                FieldValue::InputOutputs(maps) => Some(maps),
                _ => None,
            })?
            .unwrap_or_default())
    }

    pub fn available_programs(&self) -> ClarityResult<Vec<NamedLink>> {
        Ok(self
            .typed("available_programs", "link list", FieldValue::into_links)?
            .unwrap_or_default())
    }

    /// Names of the available programs, in document order.
    pub fn program_names(&self) -> ClarityResult<Vec<String>> {
        Ok(self
            .available_programs()?
            .into_iter()
            .filter_map(|link| link.name)
            .collect())
    }

    pub fn placement_list(&self) -> ClarityResult<Vec<Placement>> {
        Ok(self
            .typed("placement_list", "placement list", |value| match value {
                FieldValue::Placements(placements) => Some(placements),
                _ => None,
            })?
            .unwrap_or_default())
    }

    /// Replaces the placement list with a minimal edit of the document.
    pub fn set_placement_list(&self, placements: Vec<Placement>) -> ClarityResult<()> {
        self.set("placement_list", FieldValue::Placements(placements))
    }

    pub fn next_actions(&self) -> ClarityResult<Vec<NextAction>> {
        Ok(self
            .typed("next_actions", "next action list", |value| match value {
                FieldValue::NextActions(actions) => Some(actions),
                _ => None,
            })?
            .unwrap_or_default())
    }

    pub fn set_next_actions(&self, next_actions: Vec<NextAction>) -> ClarityResult<()> {
        self.set("next_actions", FieldValue::NextActions(next_actions))
    }

    pub fn escalation(&self) -> ClarityResult<Option<Escalation>> {
        self.typed("escalation", "escalation", |value| match value {
            FieldValue::Escalation(escalation) => Some(escalation),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, parse_date, Descriptor, FieldDef};
    use crate::error::ClarityError;
    use chrono::NaiveDate;

    #[test]
    fn booleans_are_case_sensitive() {
        assert!(!parse_bool("archived", "false").unwrap());
        assert!(parse_bool("archived", "true").unwrap());
        let err = parse_bool("archived", "True").unwrap_err();
        assert!(matches!(
            err,
            ClarityError::ValueConversion { ref field, ref raw, .. } if field == "archived" && raw == "True"
        ));
    }

    #[test]
    fn dates_use_iso_calendar_format() {
        assert_eq!(
            parse_date("expiry_date", "2022-08-16").unwrap(),
            NaiveDate::from_ymd_opt(2022, 8, 16).unwrap()
        );
        assert!(parse_date("expiry_date", "16/08/2022").is_err());
    }

    #[test]
    fn read_only_descriptors_are_not_writable() {
        assert!(FieldDef::new("name", Descriptor::Text(&["name"])).writable);
        assert!(!FieldDef::new("stages", Descriptor::WorkflowStages).writable);
        assert!(!FieldDef::new("limsid", Descriptor::Attribute("limsid")).read_only().writable);
    }
}
