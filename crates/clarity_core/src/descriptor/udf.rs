//! User-defined fields: `udf:field` elements keyed by their `name` attribute.

use super::{parse_bool, parse_date};
use crate::error::{ClarityError, ClarityResult};
use crate::model::kind::ns;
use crate::model::values::{UdfMap, UdfValue};
use crate::xml::Element;

const UDF_PREFIX: &str = "udf";
const UDF_TAG: &str = "field";

fn is_udf(element: &Element) -> bool {
    element.name.matches(Some(ns::UDF), UDF_TAG)
}

fn is_named(element: &Element, name: &str) -> bool {
    is_udf(element) && element.attr("name") == Some(name)
}

/// Typed view of every field under `parent`. Fields with no text are skipped.
pub(super) fn read(parent: &Element) -> ClarityResult<UdfMap> {
    let mut map = UdfMap::new();
    for element in parent.children.iter().filter(|child| is_udf(child)) {
        let name = element.attr("name").ok_or_else(|| {
            ClarityError::missing(format!(
                "<udf:field> under <{}> has no `name` attribute",
                parent.local_name()
            ))
        })?;
        let Some(raw) = element.trimmed_text() else {
            continue;
        };
        map.insert(name.to_string(), parse_value(name, element.attr("type"), raw)?);
    }
    Ok(map)
}

fn parse_value(name: &str, type_name: Option<&str>, raw: &str) -> ClarityResult<UdfValue> {
    match type_name {
        Some("Numeric") => {
            if let Ok(value) = raw.parse::<i64>() {
                Ok(UdfValue::Integer(value))
            } else {
                raw.parse::<f64>()
                    .map(UdfValue::Float)
                    .map_err(|_| ClarityError::conversion(name, raw, "numeric"))
            }
        }
        Some("Boolean") => parse_bool(name, raw).map(UdfValue::Boolean),
        Some("Date") => parse_date(name, raw).map(UdfValue::Date),
        _ => Ok(UdfValue::Text(raw.to_string())),
    }
}

/// Locates or creates the field named `name` and sets its text.
///
/// An existing `type` attribute is kept. A new field is typed from the value
/// and placed after the last existing field, or at the end.
pub(super) fn write_one(parent: &mut Element, name: &str, value: &UdfValue) {
    if let Some(existing) = parent
        .children
        .iter_mut()
        .find(|child| is_named(child, name))
    {
        if existing.attr("type").is_none() {
            existing.set_attr("type", value.type_name());
        }
        existing.set_text(value.to_text());
        return;
    }

    let field = Element::qualified(ns::UDF, UDF_PREFIX, UDF_TAG)
        .with_attr("type", value.type_name())
        .with_attr("name", name)
        .with_text(value.to_text());
    let at = parent
        .children
        .iter()
        .rposition(is_udf)
        .map_or(parent.children.len(), |index| index + 1);
    parent.children.insert(at, field);
}

/// Makes the fields under `parent` match `map`: absent names are removed,
/// the rest are written in place.
pub(super) fn write_all(parent: &mut Element, map: &UdfMap) {
    parent.children.retain(|child| {
        !is_udf(child) || child.attr("name").is_some_and(|name| map.contains_key(name))
    });
    for (name, value) in map {
        write_one(parent, name, value);
    }
}

pub(super) fn remove_one(parent: &mut Element, name: &str) -> bool {
    let before = parent.children.len();
    parent.children.retain(|child| !is_named(child, name));
    before != parent.children.len()
}

#[cfg(test)]
mod tests {
    use super::{read, remove_one, write_all, write_one};
    use crate::error::ClarityError;
    use crate::model::kind::ns;
    use crate::model::values::{UdfMap, UdfValue};
    use crate::xml::Element;

    fn udf(type_name: &str, name: &str, text: &str) -> Element {
        Element::qualified(ns::UDF, "udf", "field")
            .with_attr("type", type_name)
            .with_attr("name", name)
            .with_text(text)
    }

    fn artifact() -> Element {
        Element::new("artifact")
            .with_child(Element::new("name").with_text("a"))
            .with_child(udf("Numeric", "Ave. Conc. (ng/uL)", "1"))
            .with_child(udf("String", "Workflow Desired", "TruSeq"))
            .with_child(Element::new("workflow-stages"))
    }

    #[test]
    fn numeric_fields_read_as_numbers() {
        let mut root = artifact();
        root.children.push(udf("Numeric", "Volume", "2.5"));
        let map = read(&root).unwrap();

        assert_eq!(map["Ave. Conc. (ng/uL)"], UdfValue::Integer(1));
        assert_eq!(map["Volume"], UdfValue::Float(2.5));
        assert_eq!(map["Workflow Desired"], UdfValue::Text("TruSeq".into()));
    }

    #[test]
    fn bad_numeric_text_names_the_field() {
        let root = Element::new("sample").with_child(udf("Numeric", "Volume", "lots"));
        let err = read(&root).unwrap_err();
        assert!(matches!(err, ClarityError::ValueConversion { ref field, .. } if field == "Volume"));
    }

    #[test]
    fn write_one_keeps_type_and_appends_after_last_field() {
        let mut root = artifact();
        write_one(&mut root, "Ave. Conc. (ng/uL)", &UdfValue::Text("3".into()));
        write_one(&mut root, "Passed", &UdfValue::Boolean(true));

        assert_eq!(root.children[1].attr("type"), Some("Numeric"));
        assert_eq!(root.children[1].trimmed_text(), Some("3"));
        assert_eq!(root.children[3].attr("name"), Some("Passed"));
        assert_eq!(root.children[3].attr("type"), Some("Boolean"));
        assert_eq!(root.children[4].local_name(), "workflow-stages");
    }

    #[test]
    fn write_all_leaves_other_tags_alone() {
        let mut root = artifact();
        let mut map = UdfMap::new();
        map.insert("Workflow Desired".into(), UdfValue::Text("Nextera".into()));
        write_all(&mut root, &map);

        let names: Vec<&str> = root.children.iter().map(Element::local_name).collect();
        assert_eq!(names, ["name", "field", "workflow-stages"]);
        assert_eq!(root.children[1].trimmed_text(), Some("Nextera"));
        assert!(!remove_one(&mut root, "Ave. Conc. (ng/uL)"));
        assert!(remove_one(&mut root, "Workflow Desired"));
    }
}
