use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// AniList GraphQL endpoint
    #[serde(default = "default_anilist_api_url")]
    pub anilist_api_url: String,

    /// Entries requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on pages walked for one user before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Most usernames accepted in one comparison
    #[serde(default = "default_max_users")]
    pub max_users: usize,

    /// Ceiling on concurrent outbound requests, shared by every comparison
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Transient failures tolerated per list fetch before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Timeout for a single HTTP request to the catalog
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for fetching one user's whole list
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for a whole comparison
    #[serde(default = "default_comparison_timeout_secs")]
    pub comparison_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_anilist_api_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_max_pages() -> u32 {
    200
}

fn default_max_users() -> usize {
    10
}

fn default_max_concurrent_requests() -> usize {
    4
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_comparison_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            anilist_api_url: default_anilist_api_url(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            max_users: default_max_users(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            comparison_timeout_secs: default_comparison_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn comparison_timeout(&self) -> Duration {
        Duration::from_secs(self.comparison_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.anilist_api_url, "https://graphql.anilist.co");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("PORT".to_string(), "3000".to_string()),
            ("MAX_CONCURRENT_REQUESTS".to_string(), "2".to_string()),
            ("FETCH_TIMEOUT_SECS".to_string(), "5".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_concurrent_requests, 2);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    }
}
