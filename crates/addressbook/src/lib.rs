//! Address book query filtering.
//!
//! This crate implements the filter side of an addressbook query:
//! - Parsing the request element tree into a validated filter spec
//! - Collation-aware text matching (unicode/ascii casemap, octet)
//! - Evaluating prop-filters, param-filters and text-matches against cards
//! - Running a query over a collection with result limits
//!
//! Transport, storage and vCard parsing live elsewhere; cards are read
//! through the [`ContactRecord`] trait.

pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod search;

// Re-export main types
pub use config::QueryConfig;
pub use error::{QueryError, Result};
pub use query::{evaluate_filter_spec, Element, FilterSpec, QueryParser};
pub use record::{Card, CardProperty, ContactRecord, PropertyInstance};
pub use search::{Candidate, QueryExecutor, QueryOutcome};
