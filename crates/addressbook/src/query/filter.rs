//! Filter model: the validated form of an addressbook query.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

use super::element::{
    Element, ADDRESSBOOK_QUERY, ADDRESS_DATA, ATTR_COLLATION, ATTR_MATCH_TYPE, ATTR_NAME,
    ATTR_NEGATE_CONDITION, ATTR_TEST, FILTER, IS_NOT_DEFINED, LIMIT, NRESULTS, PARAM_FILTER, PROP,
    PROP_FILTER, TEXT_MATCH,
};
use super::text_match::text_matches;

pub const DEFAULT_COLLATION: &str = "i;unicode-casemap";
pub const ASCII_CASEMAP_COLLATION: &str = "i;ascii-casemap";
pub const OCTET_COLLATION: &str = "i;octet";

// ---------------------------------------------------------------------------
// Combinators and match types
// ---------------------------------------------------------------------------

/// How sibling constraints are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTest {
    #[default]
    AnyOf,
    AllOf,
}

impl FilterTest {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case("anyof") {
            Ok(Self::AnyOf)
        } else if raw.eq_ignore_ascii_case("allof") {
            Ok(Self::AllOf)
        } else {
            Err(QueryError::InvalidTest(raw.to_string()))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnyOf => "anyof",
            Self::AllOf => "allof",
        }
    }

    /// Returns true when `result` alone decides the combination.
    #[inline]
    pub fn short_circuits(self, result: bool) -> bool {
        match self {
            Self::AnyOf => result,
            Self::AllOf => !result,
        }
    }

    /// Result when no sibling short-circuited.
    #[inline]
    pub fn fallback(self) -> bool {
        self == Self::AllOf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    #[default]
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "equals" => Ok(Self::Equals),
            "starts-with" => Ok(Self::StartsWith),
            "ends-with" => Ok(Self::EndsWith),
            _ => Err(QueryError::InvalidMatchType(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "starts-with",
            Self::EndsWith => "ends-with",
        }
    }
}

// ---------------------------------------------------------------------------
// Collation
// ---------------------------------------------------------------------------

/// Comparison rules selected by a collation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollationKind {
    UnicodeCasemap,
    AsciiCasemap,
    Octet,
    /// Identifier the engine does not know; compared like the default.
    Unrecognized,
}

/// An opaque collation identifier, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collation(String);

impl Collation {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn kind(&self) -> CollationKind {
        match self.0.as_str() {
            DEFAULT_COLLATION => CollationKind::UnicodeCasemap,
            ASCII_CASEMAP_COLLATION => CollationKind::AsciiCasemap,
            OCTET_COLLATION => CollationKind::Octet,
            _ => CollationKind::Unrecognized,
        }
    }
}

impl Default for Collation {
    fn default() -> Self {
        Self(DEFAULT_COLLATION.to_string())
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A single text comparison against a property or parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextMatch {
    pub value: String,
    pub match_type: MatchType,
    pub collation: Collation,
    pub negate: bool,
}

impl TextMatch {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Collation::new(collation);
        self
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Raw comparison of `candidate` against the pattern, before negation.
    pub fn matches(&self, candidate: &str) -> bool {
        text_matches(
            candidate,
            self.value.as_str(),
            &self.collation,
            self.match_type,
        )
    }
}

/// A constraint on one named parameter of a property instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamFilter {
    pub name: String,
    pub is_not_defined: bool,
    pub text_match: Option<TextMatch>,
}

impl ParamFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_not_defined: false,
            text_match: None,
        }
    }

    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self
    }

    pub fn with_text_match(mut self, text_match: TextMatch) -> Self {
        self.text_match = Some(text_match);
        self
    }
}

/// A constraint on one named property of a card.
///
/// When `is_not_defined` is set the sub-filters are retained as parsed but
/// never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropFilter {
    pub name: String,
    pub test: FilterTest,
    pub is_not_defined: bool,
    pub param_filters: Vec<ParamFilter>,
    pub text_matches: Vec<TextMatch>,
}

impl PropFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: FilterTest::AnyOf,
            is_not_defined: false,
            param_filters: Vec::new(),
            text_matches: Vec::new(),
        }
    }

    pub fn not_defined(mut self) -> Self {
        self.is_not_defined = true;
        self
    }

    pub fn with_test(mut self, test: FilterTest) -> Self {
        self.test = test;
        self
    }

    pub fn with_param_filter(mut self, filter: ParamFilter) -> Self {
        self.param_filters.push(filter);
        self
    }

    pub fn with_text_match(mut self, text_match: TextMatch) -> Self {
        self.text_matches.push(text_match);
        self
    }

    pub fn has_sub_filters(&self) -> bool {
        !self.param_filters.is_empty() || !self.text_matches.is_empty()
    }
}

/// A parsed addressbook query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub prop_filters: Vec<PropFilter>,
    pub test: FilterTest,
    /// Positive result limit requested by the client.
    pub limit: Option<usize>,
    /// Names of the response properties the client asked for (e.g. `getetag`).
    pub requested_properties: BTreeSet<String>,
    /// vCard property names selected inside `address-data`, upper-cased.
    pub address_data: BTreeSet<String>,
}

impl FilterSpec {
    /// A spec without property filters; it matches every card.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn new(test: FilterTest, prop_filters: Vec<PropFilter>) -> Self {
        Self {
            prop_filters,
            test,
            ..Self::default()
        }
    }

    /// Sets the result limit. Zero is normalized to "unbounded".
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|value| *value > 0);
        self
    }

    /// Adds a name to the pass-through `prop` list.
    pub fn with_requested_property(mut self, name: impl Into<String>) -> Self {
        self.requested_properties.insert(name.into());
        self
    }

    /// Renders the spec back into an element tree with every default spelled out.
    ///
    /// Parsing the result yields a spec equal to `self`.
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(ADDRESSBOOK_QUERY);

        if !self.requested_properties.is_empty() || !self.address_data.is_empty() {
            let mut prop = Element::new(PROP);
            for name in &self.requested_properties {
                if name == ADDRESS_DATA {
                    continue;
                }
                prop = prop.with_child(Element::new(name.as_str()));
            }
            if self.requested_properties.contains(ADDRESS_DATA) || !self.address_data.is_empty() {
                let mut address_data = Element::new(ADDRESS_DATA);
                for name in &self.address_data {
                    address_data = address_data
                        .with_child(Element::new(PROP).with_attribute(ATTR_NAME, name.as_str()));
                }
                prop = prop.with_child(address_data);
            }
            root = root.with_child(prop);
        }

        let mut filter = Element::new(FILTER).with_attribute(ATTR_TEST, self.test.as_str());
        for prop_filter in &self.prop_filters {
            filter = filter.with_child(prop_filter_element(prop_filter));
        }
        root = root.with_child(filter);

        if let Some(limit) = self.limit {
            root = root.with_child(
                Element::new(LIMIT).with_child(Element::new(NRESULTS).with_text(limit.to_string())),
            );
        }

        root
    }
}

fn prop_filter_element(filter: &PropFilter) -> Element {
    let mut element = Element::new(PROP_FILTER)
        .with_attribute(ATTR_NAME, filter.name.as_str())
        .with_attribute(ATTR_TEST, filter.test.as_str());
    if filter.is_not_defined {
        element = element.with_child(Element::new(IS_NOT_DEFINED));
    }
    for param_filter in &filter.param_filters {
        let mut param =
            Element::new(PARAM_FILTER).with_attribute(ATTR_NAME, param_filter.name.as_str());
        if param_filter.is_not_defined {
            param = param.with_child(Element::new(IS_NOT_DEFINED));
        }
        if let Some(text_match) = param_filter.text_match.as_ref() {
            param = param.with_child(text_match_element(text_match));
        }
        element = element.with_child(param);
    }
    for text_match in &filter.text_matches {
        element = element.with_child(text_match_element(text_match));
    }
    element
}

fn text_match_element(text_match: &TextMatch) -> Element {
    Element::new(TEXT_MATCH)
        .with_attribute(ATTR_MATCH_TYPE, text_match.match_type.as_str())
        .with_attribute(ATTR_COLLATION, text_match.collation.as_str())
        .with_attribute(
            ATTR_NEGATE_CONDITION,
            if text_match.negate { "yes" } else { "no" },
        )
        .with_text(text_match.value.as_str())
}
