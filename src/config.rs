use std::time::Duration;

use crate::query::DEFAULT_LIMIT;

const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration: where the backend lives and how requests behave.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl ClientConfig {
    /// Create a configuration pointing at the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_LIMIT,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default page size used for list requests.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Read the base URL from `RECORDS_API_BASE_URL` with a localhost fallback.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("RECORDS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
