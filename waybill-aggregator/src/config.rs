//! Connection settings for the aggregator client.

use std::time::Duration;

use reqwest::Url;
use waybill_core::ports::TrackingError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "waybill/0.1";

#[derive(Debug, Clone)]
/// Explicit aggregator settings injected at construction.
pub struct AggregatorConfig {
    /// API root, e.g. `https://aggregator.example/public/v1`.
    pub base_url: String,
    /// Bearer token; requests fail with a configuration error while absent.
    pub api_key: Option<String>,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl AggregatorConfig {
    /// Settings with the default timeout and user agent.
    #[must_use]
    pub fn new<U: Into<String>>(base_url: U, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Endpoint below the base URL; each segment is percent-encoded on its own.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackingError> {
        let mut url = Url::parse(self.base_url.trim()).map_err(|err| {
            TrackingError::Configuration(format!(
                "invalid aggregator base URL {}: {err}",
                self.base_url
            ))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                TrackingError::Configuration(format!(
                    "aggregator base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}
