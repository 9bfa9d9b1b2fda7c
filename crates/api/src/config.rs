use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiConfigError {
    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported API url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Where the survey API lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiConfigError> {
        let mut url = Url::parse(base_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiConfigError::UnsupportedScheme(url.scheme().to_owned()));
        }
        // `Url::join` replaces the last segment unless the base ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `SURVEY_API_URL` and `SURVEY_API_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` when a variable is set but invalid.
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let base_url = env::var("SURVEY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let config = Self::new(&base_url)?;
        match env::var("SURVEY_API_TIMEOUT_SECS") {
            Ok(raw) => config.with_timeout_secs(&raw),
            Err(_) => Ok(config),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// Returns `ApiConfigError::InvalidTimeout` for non-numeric or zero values.
    pub fn with_timeout_secs(self, raw: &str) -> Result<Self, ApiConfigError> {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(self.with_timeout(Duration::from_secs(secs))),
            _ => Err(ApiConfigError::InvalidTimeout(raw.to_owned())),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a relative endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}
