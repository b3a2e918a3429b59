use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::errors::CoreError;

/// Application identity.
pub struct AppInfo;

impl AppInfo {
    pub const NAME: &'static str = "Expenses Management System";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
}

/// Base URL of the hosted expenses API.
pub const DEFAULT_API_BASE_URL: &str = "https://test-2-enc8.onrender.com";

/// Request timeout applied to every API call.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE_URL: &str = "EXPENSES_API_BASE_URL";

/// Environment variable overriding the request timeout, in milliseconds.
pub const ENV_API_TIMEOUT_MS: &str = "EXPENSES_API_TIMEOUT_MS";

/// Connection settings for the REST client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Headers sent with every request. Sorted for deterministic logging.
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            headers,
        }
    }
}

impl ApiConfig {
    /// Defaults with a different base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `EXPENSES_API_BASE_URL` / `EXPENSES_API_TIMEOUT_MS`.
    /// Unset variables keep the default; malformed values are an error.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_BASE_URL) {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Config(format!(
                    "{ENV_API_BASE_URL} must be an http(s) URL, got '{url}'"
                )));
            }
            config.base_url = url.to_string();
        }

        if let Some(raw) = lookup(ENV_API_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!(
                    "{ENV_API_TIMEOUT_MS} must be a whole number of milliseconds, got '{raw}'"
                ))
            })?;
            if millis == 0 {
                return Err(CoreError::Config(format!(
                    "{ENV_API_TIMEOUT_MS} must be greater than 0"
                )));
            }
            config.timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Behavior switches for `ExpenseTracker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    /// Re-fetch the whole collection after every successful mutation.
    pub refetch_after_mutation: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            refetch_after_mutation: true,
        }
    }
}
