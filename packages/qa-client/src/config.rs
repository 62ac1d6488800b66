use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

const DEFAULT_TOKEN_FILE: &str = ".qa-tokens.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LABEL_CACHE_CAPACITY: u64 = 256;

/// Settings shared by the API client, the token store and the label cache.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the accreditation API, without a trailing slash
    pub api_url: String,
    /// Where the token pair is persisted between runs
    pub token_file: PathBuf,
    pub request_timeout: Duration,
    /// Maximum number of breadcrumb labels kept in memory
    pub label_cache_capacity: u64,
}

impl ClientConfig {
    /// Build a config for the given base URL with default settings.
    pub fn new(api_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            label_cache_capacity: DEFAULT_LABEL_CACHE_CAPACITY,
        })
    }

    /// Build a config from `QA_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = must_var("QA_API_URL")?;
        let mut config = Self::new(&api_url)?;

        if let Ok(path) = env::var("QA_TOKEN_FILE") {
            config.token_file = PathBuf::from(path);
        }
        if let Some(secs) = positive_var("QA_HTTP_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = positive_var("QA_LABEL_CACHE_CAPACITY")? {
            config.label_cache_capacity = capacity;
        }
        Ok(config)
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_label_cache_capacity(mut self, capacity: u64) -> Self {
        self.label_cache_capacity = capacity;
        self
    }

    /// Absolute URL for an API path such as `/standards/`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_url)
        } else {
            format!("{}/{path}", self.api_url)
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::config(format!(
            "API URL must start with http:// or https://, but got: '{raw}'"
        )));
    }
    Ok(trimmed.to_string())
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, ClientError> {
    env::var(name).map_err(|_| {
        ClientError::config(format!("Required environment variable '{name}' is not set"))
    })
}

fn positive_var(name: &str) -> Result<Option<u64>, ClientError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ClientError::config(format!(
            "'{name}' must be a positive integer, but got: '{raw}'"
        ))),
    }
}
