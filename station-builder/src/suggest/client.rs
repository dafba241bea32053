//! Station suggestion HTTP client.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::Station;

use super::SuggestionSource;
use super::convert::parse_suggestions;
use super::error::SuggestError;

/// Default URL of the suggestion endpoint.
const DEFAULT_BASE_URL: &str = "https://reiseauskunft.bahn.de/bin/ajax-getstop.exe/dn";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("station-builder/", env!("CARGO_PKG_VERSION"));

/// Randomized delay before each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    /// A delay drawn uniformly from `[min, max]`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw the next delay.
    pub fn draw(&self) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(1500))
    }
}

/// Configuration for the suggestion client.
#[derive(Debug, Clone)]
pub struct SuggestClientConfig {
    /// Base URL for the endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent header
    pub user_agent: String,
    /// Politeness delay before every request
    pub pacing: Pacing,
}

impl SuggestClientConfig {
    /// Create a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pacing: Pacing::default(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the politeness delay.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for SuggestClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the "suggest stations by prefix or ID" endpoint.
#[derive(Debug, Clone)]
pub struct SuggestClient {
    http: reqwest::Client,
    base_url: String,
    pacing: Pacing,
}

impl SuggestClient {
    /// Create a new suggestion client.
    pub fn new(config: SuggestClientConfig) -> Result<Self, SuggestError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            pacing: config.pacing,
        })
    }

    /// Query the endpoint once, without pacing, surfacing every failure.
    pub async fn fetch(&self, query: &str) -> Result<Vec<Station>, SuggestError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("REQ0JourneyStopsS0A", "1"),
                ("REQ0JourneyStopsF", "excludeMetaStations"),
                ("REQ0JourneyStopsS0G", query),
                ("js", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        parse_suggestions(&body, query)
    }
}

impl SuggestionSource for SuggestClient {
    async fn suggest(&self, query: &str) -> Vec<Station> {
        let delay = self.pacing.draw();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.fetch(query).await {
            Ok(stations) => {
                debug!(query, found = stations.len(), "suggestions");
                stations
            }
            Err(e) => {
                warn!(query, error = %e, "suggestion request failed, treating as empty");
                Vec::new()
            }
        }
    }
}
