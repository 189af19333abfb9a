//! Client configuration loaded from environment variables.

use serde::Deserialize;

/// Configuration for the CourseHub client.
///
/// Environment variables are prefixed with `COURSEHUB_`:
/// - `COURSEHUB_API_URL`: Backend base URL (default: "http://localhost:8000")
/// - `COURSEHUB_PAGE_SIZE`: Default catalog page size (default: 12)
/// - `COURSEHUB_SEARCH_BATCH_LIMIT`: Working-set cap for search-mode fetches (default: 50)
/// - `COURSEHUB_TIMEOUT_SECS`: HTTP request timeout in seconds (default: 30)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Default catalog page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How many courses a search fetch requests at once. Search results are
    /// paginated locally, so this caps the working set.
    #[serde(default = "default_search_batch_limit")]
    pub search_batch_limit: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_page_size() -> usize {
    12
}

fn default_search_batch_limit() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `COURSEHUB_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("COURSEHUB_").from_env::<ClientConfig>()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            search_batch_limit: default_search_batch_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_batch_limit, 50);
    }
}
