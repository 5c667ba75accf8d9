use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("only one filter element is allowed")]
    MultipleFilters,

    #[error("invalid test value: {0} (expected anyof or allof)")]
    InvalidTest(String),

    #[error("unknown match-type: {0}")]
    InvalidMatchType(String),

    #[error("{element} element requires a {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// Returns true for errors caused by malformed client input.
    ///
    /// The transport layer answers these with a single "bad request" status.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::MultipleFilters
                | Self::InvalidTest(_)
                | Self::InvalidMatchType(_)
                | Self::MissingAttribute { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
