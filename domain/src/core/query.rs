//! Query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The extraction question posed to every sample (Value Object)
///
/// Always non-blank. Construction goes through [`Query::try_new`] so a blank
/// query is rejected as a configuration error before any generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a new query, rejecting blank content
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::config("query cannot be empty"));
        }
        Ok(Self { content })
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Query {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Query::try_new(s)
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Query::try_new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::try_new("What are the top delivery risks?").unwrap();
        assert_eq!(q.content(), "What are the top delivery risks?");
    }

    #[test]
    fn test_query_try_from_str() {
        let q: Query = "Estimate the migration effort".try_into().unwrap();
        assert_eq!(q.to_string(), "Estimate the migration effort");
    }

    #[test]
    fn test_blank_query_rejected() {
        assert!(Query::try_new("").is_err());
        assert!(Query::try_new("   \n").unwrap_err().is_configuration());
    }
}
