/// Ordered attribute list with unique keys.
///
/// Insertion order is preserved on output. Setting an existing key replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, keeping the original position if the key exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

/// A child of an [`XmlNode`]: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

impl XmlChild {
    pub fn as_element(&self) -> Option<&XmlNode> {
        match self {
            XmlChild::Element(node) => Some(node),
            XmlChild::Text(_) => None,
        }
    }
}

impl From<XmlNode> for XmlChild {
    fn from(node: XmlNode) -> Self {
        XmlChild::Element(node)
    }
}

impl From<&str> for XmlChild {
    fn from(text: &str) -> Self {
        XmlChild::Text(text.to_string())
    }
}

impl From<String> for XmlChild {
    fn from(text: String) -> Self {
        XmlChild::Text(text)
    }
}

/// A generic XML element: tag, ordered attributes and ordered children.
///
/// The same type backs the feed, its entries, and XHTML fragments. Child and
/// attribute order is significant and is what the writer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<XmlChild>,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// An element with no attributes and a single text child.
    pub fn simple(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).with_text(text)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<XmlChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(XmlChild::Text(text.into()))
    }

    /// True when the element renders self-closed: no children, or only empty text.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|child| match child {
            XmlChild::Text(text) => text.is_empty(),
            XmlChild::Element(_) => false,
        })
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlChild::Text(text) => Some(text.as_str()),
                XmlChild::Element(_) => None,
            })
            .collect()
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(XmlChild::as_element)
    }

    /// First child element named `tag`.
    pub fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.child_elements().find(|node| node.tag == tag)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attribute_set_replaces_in_place() {
        let mut attrs = Attributes::new();
        attrs.set("href", "http://a.example");
        attrs.set("rel", "self");
        attrs.set("href", "http://b.example");

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("href", "http://b.example"), ("rel", "self")]);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_attributes_from_iter_dedups_keys() {
        let attrs: Attributes = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(attrs.get("a"), Some("3"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_simple_element() {
        let node = XmlNode::simple("title", "My feed");
        assert!(node.attributes.is_empty());
        assert_eq!(node.children, vec![XmlChild::Text("My feed".to_string())]);
        assert_eq!(node.text(), "My feed");
    }

    #[test]
    fn test_is_empty() {
        assert!(XmlNode::new("link").is_empty());
        assert!(XmlNode::simple("email", "").is_empty());
        assert!(!XmlNode::simple("name", "x").is_empty());
        assert!(!XmlNode::new("div").with_child(XmlNode::new("br")).is_empty());
    }

    #[test]
    fn test_child_lookup_returns_first_match() {
        let node = XmlNode::new("author")
            .with_child(XmlNode::simple("name", "Jane"))
            .with_text(" ")
            .with_child(XmlNode::simple("name", "Other"));

        assert_eq!(node.child("name").map(XmlNode::text).as_deref(), Some("Jane"));
        assert!(node.child("email").is_none());
        assert_eq!(node.child_elements().count(), 2);
    }
}
