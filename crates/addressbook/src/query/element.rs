//! Element tree consumed by the query parser.
//!
//! The transport layer decodes the request body (namespaces stripped) into
//! this shape. It also derives serde so drivers can hand queries over as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Element and attribute names
// ---------------------------------------------------------------------------

pub const ADDRESSBOOK_QUERY: &str = "addressbook-query";
pub const PROP: &str = "prop";
pub const ADDRESS_DATA: &str = "address-data";
pub const LIMIT: &str = "limit";
pub const NRESULTS: &str = "nresults";
pub const FILTER: &str = "filter";
pub const PROP_FILTER: &str = "prop-filter";
pub const PARAM_FILTER: &str = "param-filter";
pub const IS_NOT_DEFINED: &str = "is-not-defined";
pub const TEXT_MATCH: &str = "text-match";

pub const ATTR_NAME: &str = "name";
pub const ATTR_TEST: &str = "test";
pub const ATTR_MATCH_TYPE: &str = "match-type";
pub const ATTR_COLLATION: &str = "collation";
pub const ATTR_NEGATE_CONDITION: &str = "negate-condition";

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A node of the request tree: local name, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.first_child(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_named_preserves_order() {
        let root = Element::new(FILTER)
            .with_child(Element::new(PROP_FILTER).with_attribute(ATTR_NAME, "FN"))
            .with_child(Element::new(TEXT_MATCH))
            .with_child(Element::new(PROP_FILTER).with_attribute(ATTR_NAME, "EMAIL"));

        let names = root
            .children_named(PROP_FILTER)
            .filter_map(|child| child.attribute(ATTR_NAME))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["FN", "EMAIL"]);
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let element: Element = serde_json::from_str(
            r#"{
                "name": "prop-filter",
                "attributes": {"name": "EMAIL"},
                "children": [{"name": "is-not-defined"}]
            }"#,
        )
        .unwrap();

        assert_eq!(element.attribute(ATTR_NAME), Some("EMAIL"));
        assert!(element.has_child(IS_NOT_DEFINED));
        assert!(element.text.is_empty());
    }
}
