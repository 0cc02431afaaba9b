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
pub struct ExplorerConfig {
    pub api_base_url: String,
    pub env: Environment,
    pub log_level: String,
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub cluster_max_zoom: u8,
    pub cluster_radius_px: f64,
    pub location_timeout_secs: u64,
}

impl ExplorerConfig {
    /// Base URL with any `user:pass@` segment masked.
    #[must_use]
    pub fn redacted_base_url(&self) -> String {
        let Some((scheme, rest)) = self.api_base_url.split_once("://") else {
            return self.api_base_url.clone();
        };
        let host_end = rest.find('/').unwrap_or(rest.len());
        match rest[..host_end].rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://[redacted]@{host}{}", &rest[host_end..]),
            None => self.api_base_url.clone(),
        }
    }
}

impl std::fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("api_base_url", &self.redacted_base_url())
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("page_size", &self.page_size)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("cluster_max_zoom", &self.cluster_max_zoom)
            .field("cluster_radius_px", &self.cluster_radius_px)
            .field("location_timeout_secs", &self.location_timeout_secs)
            .finish()
    }
}
