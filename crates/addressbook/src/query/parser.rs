//! Addressbook query parser.
//!
//! Turns the request element tree into a validated [`FilterSpec`]. All
//! defaulting and validation happens here; the evaluator trusts its input.

use std::collections::BTreeSet;

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};

use super::element::{
    Element, ADDRESS_DATA, ATTR_COLLATION, ATTR_MATCH_TYPE, ATTR_NAME, ATTR_NEGATE_CONDITION,
    ATTR_TEST, FILTER, IS_NOT_DEFINED, LIMIT, NRESULTS, PARAM_FILTER, PROP, PROP_FILTER,
    TEXT_MATCH,
};
use super::filter::{
    Collation, CollationKind, FilterSpec, FilterTest, MatchType, ParamFilter, PropFilter,
    TextMatch,
};

#[derive(Debug, Default)]
pub struct QueryParser {
    default_collation: Collation,
}

impl QueryParser {
    /// Parses a query with the built-in defaults.
    pub fn parse(root: &Element) -> Result<FilterSpec> {
        Self::default().parse_query(root)
    }

    pub fn with_config(config: &QueryConfig) -> Self {
        Self {
            default_collation: Collation::new(config.default_collation.as_str()),
        }
    }

    pub fn parse_query(&self, root: &Element) -> Result<FilterSpec> {
        let limit = parse_limit(root);
        let (requested_properties, address_data) = parse_requested_properties(root);

        let mut containers = root.children_named(FILTER);
        let (test, prop_filters) = match (containers.next(), containers.next()) {
            (None, _) => {
                // Some clients omit the filter entirely; treat it as "match everything".
                log::debug!("addressbook query without a filter element, matching all cards");
                (FilterTest::AnyOf, Vec::new())
            }
            (Some(filter), None) => {
                let test = parse_test(filter)?;
                let prop_filters = filter
                    .children_named(PROP_FILTER)
                    .map(|element| self.parse_prop_filter(element))
                    .collect::<Result<Vec<_>>>()?;
                (test, prop_filters)
            }
            (Some(_), Some(_)) => return Err(QueryError::MultipleFilters),
        };

        Ok(FilterSpec {
            prop_filters,
            test,
            limit,
            requested_properties,
            address_data,
        })
    }

    fn parse_prop_filter(&self, element: &Element) -> Result<PropFilter> {
        let name = required_attribute(element, PROP_FILTER, ATTR_NAME)?;
        let test = parse_test(element)?;

        let param_filters = element
            .children_named(PARAM_FILTER)
            .map(|child| self.parse_param_filter(child))
            .collect::<Result<Vec<_>>>()?;
        let text_matches = element
            .children_named(TEXT_MATCH)
            .map(|child| self.parse_text_match(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(PropFilter {
            name,
            test,
            is_not_defined: element.has_child(IS_NOT_DEFINED),
            param_filters,
            text_matches,
        })
    }

    fn parse_param_filter(&self, element: &Element) -> Result<ParamFilter> {
        let name = required_attribute(element, PARAM_FILTER, ATTR_NAME)?;
        // Only the first text-match of a param-filter is honoured.
        let text_match = element
            .first_child(TEXT_MATCH)
            .map(|child| self.parse_text_match(child))
            .transpose()?;

        Ok(ParamFilter {
            name,
            is_not_defined: element.has_child(IS_NOT_DEFINED),
            text_match,
        })
    }

    fn parse_text_match(&self, element: &Element) -> Result<TextMatch> {
        let match_type = element
            .attribute(ATTR_MATCH_TYPE)
            .map(MatchType::parse)
            .transpose()?
            .unwrap_or_default();
        let collation = element
            .attribute(ATTR_COLLATION)
            .map(Collation::new)
            .unwrap_or_else(|| self.default_collation.clone());
        if collation.kind() == CollationKind::Unrecognized {
            log::debug!(
                "unrecognized collation {:?}, comparing with unicode casemap",
                collation.as_str()
            );
        }

        Ok(TextMatch {
            value: element.text.clone(),
            match_type,
            collation,
            negate: element.attribute(ATTR_NEGATE_CONDITION) == Some("yes"),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_test(element: &Element) -> Result<FilterTest> {
    element
        .attribute(ATTR_TEST)
        .map(FilterTest::parse)
        .transpose()
        .map(Option::unwrap_or_default)
}

fn required_attribute(
    element: &Element,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<String> {
    element
        .attribute(attribute)
        .map(str::to_string)
        .ok_or(QueryError::MissingAttribute {
            element: element_name,
            attribute,
        })
}

/// Reads `limit/nresults`; a bare number inside `limit` is accepted too.
fn parse_limit(root: &Element) -> Option<usize> {
    let limit = root.first_child(LIMIT)?;
    let raw = limit
        .first_child(NRESULTS)
        .map(|nresults| nresults.text.as_str())
        .unwrap_or(limit.text.as_str())
        .trim();
    match raw.parse::<usize>() {
        Ok(0) => None,
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("ignoring non-numeric result limit {raw:?}");
            None
        }
    }
}

fn parse_requested_properties(root: &Element) -> (BTreeSet<String>, BTreeSet<String>) {
    let Some(prop) = root.first_child(PROP) else {
        return (BTreeSet::new(), BTreeSet::new());
    };

    let requested = prop
        .children
        .iter()
        .map(|child| child.name.clone())
        .collect::<BTreeSet<_>>();
    let address_data = prop
        .first_child(ADDRESS_DATA)
        .map(|address_data| {
            address_data
                .children_named(PROP)
                .filter_map(|child| child.attribute(ATTR_NAME))
                .map(str::to_ascii_uppercase)
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    (requested, address_data)
}
