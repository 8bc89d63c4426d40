//! AniList GraphQL client with rate limiting and retry logic.

use super::query::{MediaPageVariables, MEDIA_PAGE_QUERY};
use super::rate_limiter::RateLimiter;
use super::types::*;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::config::ApiConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Longest error body kept in messages
const MAX_ERROR_BODY: usize = 300;

/// AniList GraphQL client
pub struct AniListClient {
    /// HTTP client
    client: Client,
    /// GraphQL endpoint
    base_url: String,
    /// Rate limiter
    rate_limiter: RateLimiter,
    /// Maximum retries after the first attempt
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay_ms: u64,
    /// Cap for a single retry delay
    max_retry_delay_ms: u64,
}

impl AniListClient {
    /// Create a new AniList client
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            rate_limiter: RateLimiter::from_config(&config.rate_limit),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            max_retry_delay_ms: config.max_retry_delay_ms,
        })
    }

    /// Fetch one page of media
    pub async fn fetch_media_page(&mut self, variables: &MediaPageVariables) -> Result<MediaPage> {
        debug!(page = variables.page, per_page = variables.per_page, "Fetching media page");
        let data: PageData = self.post(MEDIA_PAGE_QUERY, variables).await?;
        Ok(data.page)
    }

    /// POST a GraphQL query, retrying rate limits and network failures
    async fn post<V, T>(&mut self, query: &str, variables: &V) -> Result<T>
    where
        V: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest { query, variables };
        let mut attempt = 0;

        loop {
            // Apply rate limiting before each request
            self.rate_limiter.acquire().await;

            debug!(url = %self.base_url, attempt = attempt + 1, "Making API request");

            let error = match self.send_once(&body).await {
                Ok(data) => return Ok(data),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.max_retries {
                warn!(
                    error = %error,
                    attempts = attempt + 1,
                    "Giving up after retries"
                );
                return Err(error);
            }

            let retry_after = match &error {
                Error::RateLimited { retry_after } => *retry_after,
                _ => None,
            };
            let delay = backoff_delay(self.retry_delay_ms, self.max_retry_delay_ms, attempt, retry_after);
            warn!(
                error = %error,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Request failed, retrying after delay"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once<V, T>(&self, body: &GraphQlRequest<'_, V>) -> Result<T>
    where
        V: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.base_url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after: parse_retry_after(response.headers()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        if status.is_server_error() {
            return Err(Error::Network(format!(
                "HTTP {}: {}",
                status,
                snippet(&bytes)
            )));
        }

        if status == StatusCode::BAD_REQUEST {
            let message = serde_json::from_slice::<GraphQlResponse<serde_json::Value>>(&bytes)
                .ok()
                .and_then(|r| r.errors)
                .filter(|errors| !errors.is_empty())
                .map(|errors| GraphQlError::join(&errors))
                .unwrap_or_else(|| snippet(&bytes));
            return Err(Error::InvalidFilter(message));
        }

        if !status.is_success() {
            return Err(Error::MalformedResponse(format!(
                "unexpected HTTP {}: {}",
                status,
                snippet(&bytes)
            )));
        }

        let envelope: GraphQlResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let message = GraphQlError::join(&errors);
            return Err(match errors.iter().find_map(|e| e.status) {
                Some(429) => Error::RateLimited { retry_after: None },
                Some(400) => Error::InvalidFilter(message),
                _ => Error::MalformedResponse(format!("GraphQL errors: {}", message)),
            });
        }

        envelope
            .data
            .ok_or_else(|| Error::MalformedResponse("response contained no data".to_string()))
    }

    /// Requests made in the last minute
    pub fn rate_limit_stats(&mut self) -> usize {
        self.rate_limiter.current_minute_count()
    }
}

/// Delay before retry number `attempt + 1`.
///
/// `retry_delay_ms * 2^attempt`, or the server's `Retry-After` when given,
/// never more than `max_ms`.
pub fn backoff_delay(base_ms: u64, max_ms: u64, attempt: u32, retry_after: Option<Duration>) -> Duration {
    let max = Duration::from_millis(max_ms);
    if let Some(hint) = retry_after {
        return hint.min(max);
    }
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(max)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| retry_after_delay(s, Utc::now()))
}

/// `Retry-After` as delta-seconds or an HTTP date; past dates mean no wait
fn retry_after_delay(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
