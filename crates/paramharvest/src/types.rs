//! Core types for paramharvest

use crate::error::FetchError;
use crate::normalize::{NormalizeStats, DEFAULT_PLACEHOLDER};
use serde::{Deserialize, Serialize};

/// Characters that would break out of the `url=` parameter of the archive query
const FORBIDDEN_DOMAIN_CHARS: &[char] = &['&', '#', '?'];

/// Request to harvest URLs for a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveQuery {
    /// Domain to look up (required)
    pub domain: String,

    /// Placeholder for query values (optional, default "FUZZ")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Upstream proxy URL for both http and https (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl ArchiveQuery {
    /// Create a new query for the given domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Set the placeholder token
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Route the archive request through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Placeholder to use; empty or missing falls back to "FUZZ"
    pub fn effective_placeholder(&self) -> &str {
        match self.placeholder.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => DEFAULT_PLACEHOLDER,
        }
    }

    /// Proxy to use, ignoring blank values
    pub fn effective_proxy(&self) -> Option<&str> {
        self.proxy
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Trimmed domain, checked for use in the archive query
    pub fn validated_domain(&self) -> Result<&str, FetchError> {
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err(FetchError::MissingDomain);
        }
        if domain
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_DOMAIN_CHARS.contains(&c))
        {
            return Err(FetchError::InvalidDomain(domain.to_string()));
        }
        Ok(domain)
    }
}

/// Result of a harvest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResponse {
    /// Domain that was queried
    pub domain: String,

    /// Placeholder written into query values
    pub placeholder: String,

    /// Deduplicated URLs, in no particular order
    pub urls: Vec<String>,

    /// Normalization counters
    pub stats: NormalizeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = ArchiveQuery::new("example.com")
            .placeholder("INJECT")
            .proxy("http://127.0.0.1:8080");

        assert_eq!(query.domain, "example.com");
        assert_eq!(query.effective_placeholder(), "INJECT");
        assert_eq!(query.effective_proxy(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_query_defaults() {
        let query = ArchiveQuery::new("example.com");
        assert_eq!(query.effective_placeholder(), "FUZZ");
        assert_eq!(query.effective_proxy(), None);

        let query = ArchiveQuery::new("example.com").placeholder("").proxy("  ");
        assert_eq!(query.effective_placeholder(), "FUZZ");
        assert_eq!(query.effective_proxy(), None);
    }

    #[test]
    fn test_validated_domain() {
        assert_eq!(
            ArchiveQuery::new(" example.com ").validated_domain().unwrap(),
            "example.com"
        );
        assert_eq!(
            ArchiveQuery::new("sub.example.com/app")
                .validated_domain()
                .unwrap(),
            "sub.example.com/app"
        );
        assert!(matches!(
            ArchiveQuery::new("").validated_domain(),
            Err(FetchError::MissingDomain)
        ));
        assert!(matches!(
            ArchiveQuery::new("   ").validated_domain(),
            Err(FetchError::MissingDomain)
        ));
        assert!(matches!(
            ArchiveQuery::new("exa mple.com").validated_domain(),
            Err(FetchError::InvalidDomain(_))
        ));
        assert!(matches!(
            ArchiveQuery::new("example.com&limit=1").validated_domain(),
            Err(FetchError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_query_deserialization() {
        let query: ArchiveQuery = serde_json::from_str(r#"{"domain":"example.com"}"#).unwrap();
        assert_eq!(query, ArchiveQuery::new("example.com"));

        let json = serde_json::to_string(&query).unwrap();
        assert!(!json.contains("placeholder"));
        assert!(!json.contains("proxy"));
    }

    #[test]
    fn test_response_serialization() {
        let resp = HarvestResponse {
            domain: "example.com".to_string(),
            placeholder: "FUZZ".to_string(),
            urls: vec!["http://example.com/?a=FUZZ".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"domain\":\"example.com\""));
        assert!(json.contains("\"urls\":[\"http://example.com/?a=FUZZ\"]"));
        assert!(json.contains("\"kept\":0"));
    }
}
