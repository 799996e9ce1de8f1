//! [`Element`] tree to bytes.

use super::element::Element;
use crate::error::{ClarityError, ClarityResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::HashMap;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Serializes `root` with an XML declaration. Every namespace used in the
/// tree is declared once on the root element.
pub fn to_bytes(root: &Element) -> ClarityResult<Vec<u8>> {
    let mut prefixes = PrefixTable::default();
    prefixes.collect(root);

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, root, &prefixes, true)?;
    Ok(writer.into_inner())
}

pub fn to_string(root: &Element) -> ClarityResult<String> {
    let bytes = to_bytes(root)?;
    String::from_utf8(bytes).map_err(write_error)
}

#[derive(Default)]
struct PrefixTable {
    by_namespace: HashMap<String, String>,
    declared: Vec<(String, String)>,
}

impl PrefixTable {
    fn collect(&mut self, element: &Element) {
        if let Some(namespace) = element.namespace() {
            self.register(namespace, element.prefix.as_deref());
        }
        for (prefix, namespace) in &element.attribute_namespaces {
            if namespace != XML_NAMESPACE {
                self.register(namespace, Some(prefix.as_str()));
            }
        }
        for child in &element.children {
            self.collect(child);
        }
    }

    fn register(&mut self, namespace: &str, preferred: Option<&str>) {
        if self.by_namespace.contains_key(namespace) {
            return;
        }
        let prefix = match preferred {
            Some(prefix) if !self.prefix_taken(prefix) => prefix.to_string(),
            _ => self.generated_prefix(),
        };
        self.by_namespace.insert(namespace.to_string(), prefix.clone());
        self.declared.push((prefix, namespace.to_string()));
    }

    fn prefix_taken(&self, prefix: &str) -> bool {
        self.declared.iter().any(|(taken, _)| taken == prefix)
    }

    fn generated_prefix(&self) -> String {
        (0..)
            .map(|n| format!("ns{n}"))
            .find(|candidate| !self.prefix_taken(candidate))
            .unwrap_or_default()
    }

    fn qualified_name(&self, element: &Element) -> String {
        match element
            .namespace()
            .and_then(|namespace| self.by_namespace.get(namespace))
        {
            Some(prefix) => format!("{prefix}:{}", element.local_name()),
            None => element.local_name().to_string(),
        }
    }

    /// Attribute key under the declared prefix of its namespace.
    fn attribute_key<'a>(&self, element: &Element, key: &'a str) -> Cow<'a, str> {
        let declared = element
            .attribute_namespace(key)
            .and_then(|namespace| self.by_namespace.get(namespace));
        match (declared, key.split_once(':')) {
            (Some(prefix), Some((_, local))) => Cow::Owned(format!("{prefix}:{local}")),
            _ => Cow::Borrowed(key),
        }
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    prefixes: &PrefixTable,
    is_root: bool,
) -> ClarityResult<()> {
    let name = prefixes.qualified_name(element);
    let mut start = BytesStart::new(name.as_str());
    if is_root {
        for (prefix, namespace) in &prefixes.declared {
            let key = format!("xmlns:{prefix}");
            start.push_attribute((key.as_str(), namespace.as_str()));
        }
    }
    for (key, value) in &element.attributes {
        let key = prefixes.attribute_key(element, key);
        start.push_attribute((key.as_ref(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in &element.children {
        write_element(writer, child, prefixes, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(write_error)
}

fn write_error(err: impl std::fmt::Display) -> ClarityError {
    ClarityError::MalformedDocument(format!("failed to serialize document: {err}"))
}

#[cfg(test)]
mod tests {
    use super::to_string;
    use crate::xml::{elements_equal, parse_document, Element};

    #[test]
    fn declares_each_namespace_once_on_root() {
        let root = Element::qualified("http://genologics.com/ri/artifact", "art", "artifact")
            .with_child(
                Element::qualified("http://genologics.com/ri/userdefined", "udf", "field")
                    .with_attr("name", "Conc")
                    .with_text("1"),
            )
            .with_child(
                Element::qualified("http://genologics.com/ri/userdefined", "udf", "field")
                    .with_attr("name", "Vol")
                    .with_text("2"),
            );

        let xml = to_string(&root).unwrap();
        assert_eq!(xml.matches("xmlns:udf=").count(), 1);
        assert!(xml.contains("<art:artifact xmlns:art=\"http://genologics.com/ri/artifact\""));
        assert!(xml.contains("<udf:field name=\"Conc\">1</udf:field>"));
    }

    #[test]
    fn escapes_text_and_survives_reparse() {
        let root = Element::qualified("http://genologics.com/ri/sample", "smp", "sample")
            .with_child(Element::new("name").with_text("a < b & c"));

        let xml = to_string(&root).unwrap();
        let reparsed = parse_document(xml.as_bytes()).unwrap();
        assert!(elements_equal(&root, &reparsed));
        assert_eq!(reparsed.child("name").unwrap().trimmed_text(), Some("a < b & c"));
    }

    #[test]
    fn clashing_prefixes_get_distinct_declarations() {
        let root = Element::qualified("http://one", "p", "root")
            .with_child(Element::qualified("http://two", "p", "child"));

        let xml = to_string(&root).unwrap();
        assert!(xml.contains("xmlns:p=\"http://one\""));
        assert!(xml.contains("xmlns:ns0=\"http://two\""));
        assert!(xml.contains("<ns0:child/>"));
    }

    #[test]
    fn declares_namespaces_used_only_by_attributes() {
        let source = br#"<art:artifact xmlns:art="http://genologics.com/ri/artifact" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://genologics.com/ri/artifact artifact.xsd" uri="u"><name>a1</name></art:artifact>"#;
        let root = parse_document(source).unwrap();

        let xml = to_string(&root).unwrap();
        assert!(xml.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
        assert!(xml.contains("xsi:schemaLocation=\"http://genologics.com/ri/artifact artifact.xsd\""));

        let reparsed = parse_document(xml.as_bytes()).unwrap();
        assert!(elements_equal(&root, &reparsed));
    }

    #[test]
    fn renames_attribute_prefixes_that_clash_with_elements() {
        let mut root = Element::qualified("http://one", "p", "root").with_attr("p:flag", "yes");
        root.attribute_namespaces
            .push(("p".to_string(), "http://two".to_string()));

        let xml = to_string(&root).unwrap();
        assert!(xml.contains("xmlns:p=\"http://one\""));
        assert!(xml.contains("xmlns:ns0=\"http://two\""));
        assert!(xml.contains("ns0:flag=\"yes\""));

        let reparsed = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.attribute_namespace("ns0:flag"), Some("http://two"));
    }
}
