//! Typed values produced and consumed by field descriptors.

use crate::descriptor::format_date;
use crate::model::entity::Entity;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// User-defined field value typed by the element's `type` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum UdfValue {
    Text(String),
    /// `Numeric` field whose text is integral.
    Integer(i64),
    /// `Numeric` field with a fractional part.
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl UdfValue {
    /// `type` attribute written for a newly created field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "String",
            Self::Integer(_) | Self::Float(_) => "Numeric",
            Self::Boolean(_) => "Boolean",
            Self::Date(_) => "Date",
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            // `2.0` keeps its fraction so it reads back as a float.
            Self::Float(value) => format!("{value:?}"),
            Self::Boolean(value) => value.to_string(),
            Self::Date(value) => format_date(*value),
        }
    }
}

impl From<&str> for UdfValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for UdfValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for UdfValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for UdfValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for UdfValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Field name to typed value.
pub type UdfMap = BTreeMap<String, UdfValue>;

/// Well inside a container, e.g. `A:1` or `1:1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub container: Entity,
    pub position: String,
}

impl Location {
    pub fn new(container: Entity, position: impl Into<String>) -> Self {
        Self {
            container,
            position: position.into(),
        }
    }
}

/// Output artifact assigned to a container well within a step.
///
/// Uniqueness of `(container, position)` across one step is left to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub artifact: Entity,
    pub container: Entity,
    pub position: String,
}

impl Placement {
    pub fn new(artifact: Entity, container: Entity, position: impl Into<String>) -> Self {
        Self {
            artifact,
            container,
            position: position.into(),
        }
    }
}

/// Name plus URI pair, e.g. one available program of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLink {
    pub name: Option<String>,
    pub uri: String,
}

/// One entry of an artifact's workflow stage history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStageStatus {
    pub stage: Entity,
    pub status: Option<String>,
    pub name: Option<String>,
}

/// Planned follow-up for one artifact leaving a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextAction {
    pub artifact: Entity,
    /// e.g. `nextstep`, `requeue`, `rework`, `complete`.
    pub action: Option<String>,
    pub step: Option<Entity>,
    pub rework_step: Option<Entity>,
}

impl NextAction {
    pub fn new(artifact: Entity, action: impl Into<String>) -> Self {
        Self {
            artifact,
            action: Some(action.into()),
            step: None,
            rework_step: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationStatus {
    Pending,
    Reviewed,
}

/// Escalation request and its optional review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    pub status: EscalationStatus,
    /// Researcher who requested the escalation.
    pub author: Option<Entity>,
    /// Researcher who reviewed it; `None` while pending.
    pub reviewer: Option<Entity>,
    /// Request comment.
    pub request: Option<String>,
    /// Review comment.
    pub answer: Option<String>,
    pub artifacts: Vec<Entity>,
}

/// Input artifact paired with the output it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOutput {
    pub input: Entity,
    pub output: Option<Entity>,
    pub output_type: Option<String>,
}

/// Value read from or written to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    Entity(Entity),
    Entities(Vec<Entity>),
    Texts(Vec<String>),
    Links(Vec<NamedLink>),
    Udf(UdfMap),
    Location(Location),
    WorkflowStages(Vec<WorkflowStageStatus>),
    NextActions(Vec<NextAction>),
    Escalation(Escalation),
    InputOutputs(Vec<InputOutput>),
    Placements(Vec<Placement>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_entities(self) -> Option<Vec<Entity>> {
        match self {
            Self::Entities(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_texts(self) -> Option<Vec<String>> {
        match self {
            Self::Texts(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_links(self) -> Option<Vec<NamedLink>> {
        match self {
            Self::Links(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Entity> for FieldValue {
    fn from(value: Entity) -> Self {
        Self::Entity(value)
    }
}

#[cfg(test)]
mod tests {
    use super::UdfValue;
    use chrono::NaiveDate;

    #[test]
    fn udf_text_keeps_float_fraction_and_iso_dates() {
        assert_eq!(UdfValue::Float(2.0).to_text(), "2.0");
        assert_eq!(UdfValue::Float(2.5).to_text(), "2.5");
        assert_eq!(UdfValue::Integer(2).to_text(), "2");
        let date = NaiveDate::from_ymd_opt(2022, 8, 16).unwrap();
        assert_eq!(UdfValue::Date(date).to_text(), "2022-08-16");
    }
}
