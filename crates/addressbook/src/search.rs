//! Query execution over address book collections.

mod executor;

pub use executor::{Candidate, QueryExecutor, QueryOutcome};
