//! Client configuration.

use std::env;

use crate::error::ApiError;
use crate::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Header carrying the admin token, when one is configured.
pub const ADMIN_TOKEN_HEADER: &str = "kong-admin-token";

/// Connection settings shared by every resource service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Admin API root, without a trailing slash.
    pub base_url: String,
    /// Page size used when listing a whole collection.
    pub page_size: usize,
    /// Headers added to every request.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ApiError> {
        if page_size == 0 {
            return Err(ApiError::Config("page size must be positive".to_string()));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Reads `ADMIN_API_URL`, `ADMIN_API_PAGE_SIZE` and `ADMIN_API_TOKEN`.
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = match lookup("ADMIN_API_URL") {
            Some(url) => Self::new(&url),
            None => Self::default(),
        };
        if let Some(raw) = lookup("ADMIN_API_PAGE_SIZE") {
            let size = raw
                .parse::<usize>()
                .map_err(|e| ApiError::Config(format!("ADMIN_API_PAGE_SIZE={raw}: {e}")))?;
            config = config.with_page_size(size)?;
        }
        if let Some(token) = lookup("ADMIN_API_TOKEN") {
            config = config.with_header(ADMIN_TOKEN_HEADER, &token);
        }
        Ok(config)
    }
}
