use std::time::Duration;

use url::Url;

use super::error::ClientError;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "FNE_BASE_URL";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "FNE_TIMEOUT_SECS";

/// Connection settings for [`FneClient`](super::FneClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Settings for the API rooted at `base_url` (e.g. `https://fne.example.ci/api/v1`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL must be http(s), got '{base_url}'"
            )));
        }
        Ok(Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("fne/", env!("CARGO_PKG_VERSION")).to_string(),
        })
    }

    /// Read `FNE_BASE_URL` and, if set, `FNE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| ClientError::Config(format!("{BASE_URL_ENV} is not set")))?;
        let mut config = Self::new(&base_url)?;
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ClientError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds"))
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn agent(&self) -> &str {
        &self.user_agent
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("cannot extend base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
