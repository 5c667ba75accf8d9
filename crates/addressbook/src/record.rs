//! Read-only view of a parsed contact card.
//!
//! The query engine only needs to look properties and parameters up by name,
//! so the record is expressed as two traits. [`Card`] is a plain in-memory
//! implementation for callers that already hold parsed vCard data.

use serde::{Deserialize, Serialize};

/// One occurrence of a property on a card.
pub trait PropertyInstance {
    /// The scalar value of the property.
    fn value(&self) -> &str;

    /// All values of the parameters named `name` on this instance.
    fn parameter_values(&self, name: &str) -> Vec<&str>;

    fn has_parameter(&self, name: &str) -> bool {
        !self.parameter_values(name).is_empty()
    }
}

/// A contact card the query engine can evaluate filters against.
pub trait ContactRecord {
    type Property: PropertyInstance;

    /// Identity reported back for matching cards (usually the resource name).
    fn id(&self) -> &str;

    /// All instances of the property named `name`, in card order.
    fn properties(&self, name: &str) -> Vec<&Self::Property>;

    fn has_property(&self, name: &str) -> bool {
        !self.properties(name).is_empty()
    }
}

// ---------------------------------------------------------------------------
// In-memory card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardParameter {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A property instance. The name never carries a group prefix; see [`CardProperty::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCardProperty")]
pub struct CardProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<CardParameter>,
}

/// Wire form of [`CardProperty`]; `name` may still be spelled `group.NAME`.
#[derive(Deserialize)]
struct RawCardProperty {
    #[serde(default)]
    group: Option<String>,
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    parameters: Vec<CardParameter>,
}

impl From<RawCardProperty> for CardProperty {
    fn from(raw: RawCardProperty) -> Self {
        let (group, name) = split_group(&raw.name);
        Self {
            group: raw.group.or(group),
            name,
            value: raw.value,
            parameters: raw.parameters,
        }
    }
}

fn split_group(name: &str) -> (Option<String>, String) {
    match name.rsplit_once('.') {
        Some((group, name)) if !group.is_empty() => (Some(group.to_string()), name.to_string()),
        _ => (None, name.to_string()),
    }
}

impl CardProperty {
    /// Creates a property; a `group.NAME` spelling is split into group and name.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        let (group, name) = split_group(name);
        Self {
            group,
            name,
            value: value.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.push(CardParameter {
            name: name.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Matches a filter's property name, ignoring case.
    ///
    /// A bare name ignores the vCard group; a `group.NAME` filter name must
    /// match both parts.
    pub fn name_matches(&self, wanted: &str) -> bool {
        match wanted.rsplit_once('.') {
            Some((group, name)) => {
                self.name.eq_ignore_ascii_case(name)
                    && self
                        .group
                        .as_deref()
                        .is_some_and(|own| own.eq_ignore_ascii_case(group))
            }
            None => self.name.eq_ignore_ascii_case(wanted),
        }
    }
}

impl PropertyInstance for CardProperty {
    fn value(&self) -> &str {
        self.value.as_str()
    }

    fn parameter_values(&self, name: &str) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.name.eq_ignore_ascii_case(name))
            .flat_map(|parameter| parameter.values.iter().map(String::as_str))
            .collect()
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters
            .iter()
            .any(|parameter| parameter.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub properties: Vec<CardProperty>,
}

impl Card {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: CardProperty) -> Self {
        self.properties.push(property);
        self
    }
}

impl ContactRecord for Card {
    type Property = CardProperty;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn properties(&self, name: &str) -> Vec<&CardProperty> {
        self.properties
            .iter()
            .filter(|property| property.name_matches(name))
            .collect()
    }

    fn has_property(&self, name: &str) -> bool {
        self.properties
            .iter()
            .any(|property| property.name_matches(name))
    }
}
