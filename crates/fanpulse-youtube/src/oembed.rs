//! HTTP client for the YouTube oEmbed endpoint.
//!
//! oEmbed needs no API key and answers with the public title, channel name
//! and thumbnail of a video. Deleted and private videos answer 401/404.
//!
//! Lookups that still fail after every retry feed a consecutive-failure
//! circuit breaker. While it is open, [`MetadataSource::fetch`] answers `None`
//! without touching the network, so an outage costs one timeout per cool-down
//! instead of one per event.

use std::time::Duration;

use async_trait::async_trait;
use failsafe::backoff::Exponential;
use failsafe::failure_policy::ConsecutiveFailures;
use failsafe::CircuitBreaker;
use fanpulse_core::{AppConfig, MetadataSource, VideoMetadata};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::OEmbedError;
use crate::retry::{classify, retry_with_backoff, FailureClass};
use crate::video_id::build_watch_url;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com/oembed";

/// Upper bound for the open window after repeated failed trial calls.
const MAX_BREAKER_OPEN: Duration = Duration::from_secs(300);

type Breaker = failsafe::StateMachine<ConsecutiveFailures<Exponential>, ()>;

#[derive(Debug, Clone)]
pub struct OEmbedConfig {
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout_ms: u64,
    /// Additional attempts after the first on retryable failures.
    pub max_retries: u32,
    /// Base of the exponential back-off.
    pub retry_delay_ms: u64,
    /// Exhausted lookups in a row that open the circuit.
    pub breaker_threshold: u32,
    /// First open window; doubles while trial calls keep failing. At least 1 s.
    pub breaker_open_ms: u64,
}

impl Default for OEmbedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: 5_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            breaker_threshold: 5,
            breaker_open_ms: 30_000,
        }
    }
}

impl OEmbedConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.oembed_base_url.clone(),
            timeout_ms: config.oembed_timeout_ms,
            max_retries: config.oembed_max_retries,
            retry_delay_ms: config.oembed_retry_delay_ms,
            breaker_threshold: config.oembed_breaker_threshold,
            breaker_open_ms: config.oembed_breaker_open_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    #[serde(default)]
    author_name: String,
    thumbnail_url: Option<String>,
    #[serde(default)]
    provider_name: String,
}

impl From<OEmbedResponse> for VideoMetadata {
    fn from(resp: OEmbedResponse) -> Self {
        Self {
            title: resp.title,
            author_name: resp.author_name,
            thumbnail_url: resp.thumbnail_url,
            provider_name: resp.provider_name,
        }
    }
}

/// Client for the oEmbed endpoint.
///
/// Point `base_url` at a mock server in tests.
pub struct OEmbedClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_delay_ms: u64,
    breaker: Breaker,
}

fn build_breaker(threshold: u32, open_ms: u64) -> Breaker {
    let open = Duration::from_millis(open_ms).max(Duration::from_secs(1));
    let backoff = failsafe::backoff::exponential(open, open.max(MAX_BREAKER_OPEN));
    let policy = failsafe::failure_policy::consecutive_failures(threshold.max(1), backoff);
    failsafe::Config::new().failure_policy(policy).build()
}

impl OEmbedClient {
    /// # Errors
    ///
    /// Returns [`OEmbedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OEmbedError::InvalidBaseUrl`] if
    /// `config.base_url` does not parse.
    pub fn new(config: &OEmbedConfig) -> Result<Self, OEmbedError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent("fanpulse/0.1 (stream-sync)")
            .build()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| OEmbedError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            breaker: build_breaker(config.breaker_threshold, config.breaker_open_ms),
        })
    }

    /// Fetches metadata for one video, retrying transient failures.
    ///
    /// Bypasses the circuit breaker; [`MetadataSource::fetch`] is the guarded
    /// entry point.
    ///
    /// # Errors
    ///
    /// - [`OEmbedError::Status`] for a non-2xx answer (terminal for 4xx other
    ///   than 429, otherwise after retries are exhausted).
    /// - [`OEmbedError::Http`] on network failure after retries.
    /// - [`OEmbedError::Deserialize`] if the body is still not an oEmbed
    ///   document after retries.
    pub async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, OEmbedError> {
        retry_with_backoff(self.max_retries, self.retry_delay_ms, || {
            self.fetch_once(video_id)
        })
        .await
    }

    async fn fetch_once(&self, video_id: &str) -> Result<VideoMetadata, OEmbedError> {
        let watch_url = build_watch_url(video_id);
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OEmbedError::Status {
                status: status.as_u16(),
                video_id: video_id.to_owned(),
            });
        }

        let body = response.text().await?;
        let parsed: OEmbedResponse =
            serde_json::from_str(&body).map_err(|source| OEmbedError::Deserialize {
                video_id: video_id.to_owned(),
                source,
            })?;

        Ok(parsed.into())
    }
}

#[async_trait]
impl MetadataSource for OEmbedClient {
    async fn fetch(&self, video_id: &str) -> Option<VideoMetadata> {
        if !self.breaker.is_call_permitted() {
            tracing::debug!(video_id, "oEmbed circuit open, skipping lookup");
            return None;
        }
        match self.fetch_metadata(video_id).await {
            Ok(metadata) => {
                self.breaker.on_success();
                Some(metadata)
            }
            Err(e) => {
                match classify(&e) {
                    // The service answered; the video is just gone.
                    FailureClass::Terminal => {
                        self.breaker.on_success();
                        tracing::info!(video_id, error = %e, "oEmbed has no metadata for video");
                    }
                    FailureClass::Retryable => {
                        self.breaker.on_error();
                        tracing::warn!(video_id, error = %e, "oEmbed lookup failed after retries");
                    }
                }
                None
            }
        }
    }
}
