//! Bytes to [`Element`] tree.

use super::element::{Element, QName};
use crate::error::{ClarityError, ClarityResult};
use roxmltree::{Document, Node};

/// Parses a namespaced XML body into an owned tree.
///
/// Element identity is `(namespace URI, local name)`; whichever prefix the
/// server chose is recorded only so re-serialization can reuse it.
pub fn parse_document(bytes: &[u8]) -> ClarityResult<Element> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| ClarityError::MalformedDocument(format!("body is not UTF-8: {err}")))?;
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.is_empty() {
        return Err(ClarityError::missing("empty body"));
    }
    let document = Document::parse(text)?;
    Ok(convert(document.root_element()))
}

fn convert(node: Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let (name, prefix) = match tag.namespace() {
        Some(namespace) => (
            QName::qualified(namespace, tag.name()),
            node.lookup_prefix(namespace).map(str::to_string),
        ),
        None => (QName::local(tag.name()), None),
    };

    let mut attributes = Vec::new();
    let mut attribute_namespaces: Vec<(String, String)> = Vec::new();
    for attr in node.attributes() {
        let bound = attr
            .namespace()
            .and_then(|ns| node.lookup_prefix(ns).map(|attr_prefix| (attr_prefix, ns)));
        let key = match bound {
            Some((attr_prefix, ns)) => {
                if !attribute_namespaces.iter().any(|(known, _)| known == attr_prefix) {
                    attribute_namespaces.push((attr_prefix.to_string(), ns.to_string()));
                }
                format!("{attr_prefix}:{}", attr.name())
            }
            None => attr.name().to_string(),
        };
        attributes.push((key, attr.value().to_string()));
    }

    let mut text = String::new();
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert(child));
        } else if let Some(fragment) = child.text().filter(|_| child.is_text()) {
            text.push_str(fragment);
        }
    }

    Element {
        name,
        prefix,
        attributes,
        attribute_namespaces,
        text: (!text.trim().is_empty()).then_some(text),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_document;
    use crate::error::ClarityError;

    #[test]
    fn resolves_namespace_regardless_of_prefix() {
        let a = parse_document(
            br#"<art:artifact xmlns:art="http://genologics.com/ri/artifact"><name>x</name></art:artifact>"#,
        )
        .unwrap();
        let b = parse_document(
            br#"<zz:artifact xmlns:zz="http://genologics.com/ri/artifact"><name>x</name></zz:artifact>"#,
        )
        .unwrap();

        assert_eq!(a.name, b.name);
        assert_eq!(a.prefix.as_deref(), Some("art"));
        assert_eq!(b.prefix.as_deref(), Some("zz"));
        assert_eq!(a.child("name").unwrap().trimmed_text(), Some("x"));
    }

    #[test]
    fn records_namespaces_of_prefixed_attributes() {
        let root = parse_document(
            br#"<art:artifact xmlns:art="http://genologics.com/ri/artifact" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://genologics.com/ri/artifact artifact.xsd" uri="u"/>"#,
        )
        .unwrap();

        assert_eq!(
            root.attr("xsi:schemaLocation"),
            Some("http://genologics.com/ri/artifact artifact.xsd")
        );
        assert_eq!(
            root.attribute_namespace("xsi:schemaLocation"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(root.attribute_namespace("uri"), None);
    }

    #[test]
    fn drops_whitespace_only_text_between_children() {
        let root = parse_document(b"\n<root>\n  <a uri=\"u\"/>\n</root>").unwrap();
        assert_eq!(root.text, None);
        assert_eq!(root.children[0].attr("uri"), Some("u"));
    }

    #[test]
    fn rejects_non_xml_bodies() {
        let err = parse_document(b"not xml").unwrap_err();
        assert!(matches!(err, ClarityError::MalformedDocument(_)));

        let err = parse_document(b"   ").unwrap_err();
        assert!(matches!(err, ClarityError::MalformedDocument(_)));
    }
}
