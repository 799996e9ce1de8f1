//! Mutable element tree backing one entity document.

/// Namespace-qualified element name. The namespace URI is authoritative;
/// prefixes are presentation only and live on [`Element::prefix`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

/// One XML element with its attributes, direct text and child elements.
///
/// Mixed content is not modelled: text interleaved between children is
/// folded into `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub prefix: Option<String>,
    pub attributes: Vec<(String, String)>,
    /// Prefix to namespace URI for prefixed attribute keys such as
    /// `xsi:schemaLocation`.
    pub attribute_namespaces: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with no namespace.
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            name: QName::local(local),
            prefix: None,
            attributes: Vec::new(),
            attribute_namespaces: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates a namespaced element that serializes as `prefix:local`.
    pub fn qualified(
        namespace: impl Into<String>,
        prefix: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            name: QName::qualified(namespace, local),
            prefix: Some(prefix.into()),
            attributes: Vec::new(),
            attribute_namespaces: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute in place, appending it when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Namespace bound to the prefix of a `prefix:local` attribute key.
    pub fn attribute_namespace(&self, key: &str) -> Option<&str> {
        let (prefix, _) = key.split_once(':')?;
        self.attribute_namespaces
            .iter()
            .find(|(declared, _)| declared == prefix)
            .map(|(_, namespace)| namespace.as_str())
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Direct text with surrounding whitespace removed; empty text is `None`.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// First un-namespaced child named `local`.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|child| child.name.matches(None, local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .find(|child| child.name.matches(None, local))
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name.matches(None, local))
    }

    /// Follows un-namespaced child names; the empty path is `self`.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |current, segment| current.child(segment))
    }

    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for segment in path {
            current = current.child_mut(segment)?;
        }
        Some(current)
    }

    /// Every element matching the last path segment under the first
    /// occurrence of the parent path, in document order.
    pub fn find_all<'a>(&'a self, path: &[&'a str]) -> Vec<&'a Element> {
        match path.split_last() {
            Some((last, parents)) => self
                .find(parents)
                .map(|parent| parent.children_named(*last).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Returns the first child named `local`, appending an empty one if absent.
    pub fn ensure_child(&mut self, local: &str) -> &mut Element {
        let index = match self
            .children
            .iter()
            .position(|child| child.name.matches(None, local))
        {
            Some(index) => index,
            None => {
                self.children.push(Element::new(local));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Like [`Element::ensure_child`], but a new child is inserted before the
    /// first sibling named `before` when one exists.
    pub fn ensure_child_before(&mut self, local: &str, before: &str) -> &mut Element {
        let index = match self
            .children
            .iter()
            .position(|child| child.name.matches(None, local))
        {
            Some(index) => index,
            None => {
                let at = self
                    .children
                    .iter()
                    .position(|child| child.name.matches(None, before))
                    .unwrap_or(self.children.len());
                self.children.insert(at, Element::new(local));
                at
            }
        };
        &mut self.children[index]
    }

    /// Ensures every segment of `path` exists and returns the last one.
    pub fn ensure_path(&mut self, path: &[&str]) -> &mut Element {
        let mut current = self;
        for segment in path {
            current = current.ensure_child(segment);
        }
        current
    }

    /// Removes all un-namespaced children named `local`; returns how many.
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|child| !child.name.matches(None, local));
        before - self.children.len()
    }
}

/// Structural equality ignoring prefixes, attribute order, whitespace-only
/// text and whitespace around text.
pub fn elements_equal(left: &Element, right: &Element) -> bool {
    if left.name != right.name {
        return false;
    }
    if left.trimmed_text() != right.trimmed_text() {
        return false;
    }
    if left.attributes.len() != right.attributes.len() {
        return false;
    }
    let attributes_match = left
        .attributes
        .iter()
        .all(|(key, value)| right.attr(key) == Some(value.as_str()));
    if !attributes_match {
        return false;
    }
    left.children.len() == right.children.len()
        && left
            .children
            .iter()
            .zip(&right.children)
            .all(|(l, r)| elements_equal(l, r))
}

#[cfg(test)]
mod tests {
    use super::{elements_equal, Element};

    #[test]
    fn set_attr_replaces_in_place() {
        let mut element = Element::new("container")
            .with_attr("uri", "u1")
            .with_attr("limsid", "c1");
        element.set_attr("uri", "u2");

        assert_eq!(element.attributes[0], ("uri".to_string(), "u2".to_string()));
        assert_eq!(element.attributes.len(), 2);
    }

    #[test]
    fn ensure_child_before_inserts_ahead_of_anchor() {
        let mut root = Element::new("placements")
            .with_child(Element::new("step"))
            .with_child(Element::new("output-placements"));
        root.ensure_child_before("selected-containers", "output-placements");

        let names: Vec<&str> = root.children.iter().map(Element::local_name).collect();
        assert_eq!(names, ["step", "selected-containers", "output-placements"]);
    }

    #[test]
    fn find_all_returns_repeated_siblings_in_order() {
        let root = Element::new("artifact").with_child(
            Element::new("workflow-stages")
                .with_child(Element::new("workflow-stage").with_attr("name", "s2"))
                .with_child(Element::new("workflow-stage").with_attr("name", "s1")),
        );

        let names: Vec<&str> = root
            .find_all(&["workflow-stages", "workflow-stage"])
            .into_iter()
            .filter_map(|stage| stage.attr("name"))
            .collect();
        assert_eq!(names, ["s2", "s1"]);
    }

    #[test]
    fn elements_equal_ignores_prefix_and_whitespace() {
        let mut left = Element::qualified("http://ns", "a", "root").with_text("\n  ");
        left.children.push(Element::new("name").with_text("  x "));
        let mut right = Element::qualified("http://ns", "b", "root");
        right.children.push(Element::new("name").with_text("x"));

        assert!(elements_equal(&left, &right));

        right.children[0].set_attr("extra", "1");
        assert!(!elements_equal(&left, &right));
    }
}
