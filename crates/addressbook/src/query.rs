//! Addressbook query filters: parsing, text comparison and evaluation.
//!
//! This module provides:
//! - The element tree the transport layer hands in
//! - Filter types (prop-filter, param-filter, text-match)
//! - Query parsing with defaulting and validation
//! - Collation-aware text matching
//! - Short-circuit evaluation against a single card

mod element;
mod evaluate;
mod filter;
mod parser;
mod text_match;

// Re-export public types
pub use element::Element;
pub use evaluate::{
    evaluate_filter_spec, evaluate_param_filters, evaluate_prop_filter, evaluate_text_matches,
};
pub use filter::{
    Collation, CollationKind, FilterSpec, FilterTest, MatchType, ParamFilter, PropFilter,
    TextMatch, ASCII_CASEMAP_COLLATION, DEFAULT_COLLATION, OCTET_COLLATION,
};
pub use parser::QueryParser;
pub use text_match::text_matches;
