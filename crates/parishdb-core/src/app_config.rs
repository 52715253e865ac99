use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub places_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub places_request_timeout_secs: u64,
    pub places_user_agent: String,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,
    /// Delay between place-detail fetches, to stay inside API quotas.
    pub places_detail_delay_ms: u64,
    /// Delay between search result pages. A freshly issued page token needs
    /// a warm-up period before the API will accept it.
    pub places_page_delay_ms: u64,
    /// Maximum result pages fetched per query string.
    pub places_max_pages: usize,
    /// Bounded worker pool for detail fetches within one page.
    pub engine_max_concurrent_details: usize,
}

impl AppConfig {
    #[must_use]
    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.places_detail_delay_ms)
    }

    #[must_use]
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.places_page_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "places_request_timeout_secs",
                &self.places_request_timeout_secs,
            )
            .field("places_user_agent", &self.places_user_agent)
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .field("places_detail_delay_ms", &self.places_detail_delay_ms)
            .field("places_page_delay_ms", &self.places_page_delay_ms)
            .field("places_max_pages", &self.places_max_pages)
            .field(
                "engine_max_concurrent_details",
                &self.engine_max_concurrent_details,
            )
            .finish()
    }
}
