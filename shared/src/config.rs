use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::{
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_MS, MAX_PAGE_SIZE, MAX_REQUEST_TIMEOUT_MS,
    MAX_SEARCH_DEBOUNCE_MS, SEARCH_DEBOUNCE_MS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),
    #[error("base URL '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("page size {0} is out of range 1..={MAX_PAGE_SIZE}")]
    PageSize(u32),
    #[error("search debounce {0}ms exceeds {MAX_SEARCH_DEBOUNCE_MS}ms")]
    Debounce(u64),
    #[error("request timeout {0}ms is out of range 1..={MAX_REQUEST_TIMEOUT_MS}")]
    Timeout(u64),
}

/// Settings handed over by the shell at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: Url,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Opaque bearer token issued by the auth service.
    #[serde(default)]
    pub auth_token: Option<SecretString>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    SEARCH_DEBOUNCE_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let config = Self {
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            auth_token: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(SecretString::new(token.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = self.base_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: format!("unsupported scheme '{scheme}'"),
            });
        }
        if self.base_url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "missing host".to_string(),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::PageSize(self.page_size));
        }
        if self.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(ConfigError::Debounce(self.search_debounce_ms));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_MS).contains(&self.request_timeout_ms) {
            return Err(ConfigError::Timeout(self.request_timeout_ms));
        }
        Ok(())
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
