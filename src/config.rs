//! Client configuration
//!
//! Holds the knobs for the aggregating API client: where the upstream API
//! lives, how long a single request may take and how long responses stay
//! fresh in the cache.

use std::time::Duration;

/// Root of the public Groupie Tracker API
pub const DEFAULT_BASE_URL: &str = "https://groupietrackers.herokuapp.com/api";

/// Default timeout for a single upstream request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time-to-live for cached responses (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration for [`GroupieClient`](crate::data::GroupieClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without a trailing slash (e.g. `https://host/api`)
    pub base_url: String,
    /// Timeout applied to every upstream request
    pub timeout: Duration,
    /// How long a cached response is served without hitting the network
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl ClientConfig {
    /// Returns a copy of this config pointed at a different API root
    ///
    /// Trailing slashes are stripped so endpoint URLs are built consistently.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://groupietrackers.herokuapp.com/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://localhost:8080/api///");
        assert_eq!(config.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_builder_methods_override_defaults() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(2))
            .with_cache_ttl(Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }
}
