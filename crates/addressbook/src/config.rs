//! Server-side query configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::query::DEFAULT_COLLATION;

/// Settings applied on top of what the client asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Hard cap on matches per query, applied even when the client sends no limit.
    pub max_results: Option<usize>,
    /// Collation used for text-match elements without a `collation` attribute.
    pub default_collation: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: None,
            default_collation: DEFAULT_COLLATION.to_string(),
        }
    }
}

impl QueryConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QueryError::ConfigNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Combines the client limit with `max_results`, keeping the smaller one.
    pub fn effective_limit(&self, requested: Option<usize>) -> Option<usize> {
        match (requested, self.max_results) {
            (Some(requested), Some(cap)) => Some(requested.min(cap)),
            (requested, cap) => requested.or(cap),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_results == Some(0) {
            return Err(QueryError::Config(
                "max_results must be greater than zero".to_string(),
            ));
        }
        if self.default_collation.trim().is_empty() {
            return Err(QueryError::Config(
                "default_collation must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_object_uses_defaults() {
        let config = QueryConfig::from_json_str("{}").expect("config");
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn rejects_zero_cap() {
        let err = QueryConfig::from_json_str(r#"{"max_results":0}"#).unwrap_err();
        assert!(matches!(err, QueryError::Config(_)));
        assert!(!err.is_bad_request());
    }

    #[test]
    fn rejects_blank_collation() {
        assert!(QueryConfig::from_json_str(r#"{"default_collation":"  "}"#).is_err());
    }

    #[test]
    fn effective_limit_takes_minimum() {
        let config = QueryConfig {
            max_results: Some(50),
            ..QueryConfig::default()
        };
        assert_eq!(config.effective_limit(None), Some(50));
        assert_eq!(config.effective_limit(Some(10)), Some(10));
        assert_eq!(config.effective_limit(Some(100)), Some(50));
        assert_eq!(QueryConfig::default().effective_limit(None), None);
        assert_eq!(QueryConfig::default().effective_limit(Some(3)), Some(3));
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_results": 20, "default_collation": "i;ascii-casemap"}"#)
            .unwrap();
        file.flush().unwrap();

        let config = QueryConfig::load(file.path()).expect("load");
        assert_eq!(config.max_results, Some(20));
        assert_eq!(config.default_collation, "i;ascii-casemap");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = QueryConfig::load(Path::new("/nonexistent/addressbook.json")).unwrap_err();
        assert!(matches!(err, QueryError::ConfigNotFound(_)));
    }
}
