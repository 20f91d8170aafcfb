//! API client for the RepeaterBook export endpoints.
//!
//! North American countries are served by `export.php`; every other country
//! goes through `exportROW.php`. One HTTP request is made per country, or per
//! state for the US when states are selected.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{ExportQuery, ExportResponse, Repeater};

use super::{ApiError, RepeaterSource};

// ============================================================================
// Constants
// ============================================================================

/// Export endpoint for the United States, Canada and Mexico.
const NORTH_AMERICA_URL: &str = "https://www.repeaterbook.com/api/export.php";

/// Export endpoint for the rest of the world.
const REST_OF_WORLD_URL: &str = "https://www.repeaterbook.com/api/exportROW.php";

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// A single export request: endpoint plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub url: &'static str,
    pub params: Vec<(&'static str, String)>,
}

/// RepeaterBook client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    token: Option<String>,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            token: config.api_token.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidResponse("API token is not a valid header value".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Requests needed to cover an export query.
    pub fn export_requests(query: &ExportQuery) -> Vec<ExportRequest> {
        let mut requests = Vec::new();
        for country in &query.countries {
            if country.is_united_states() && !query.state_ids.is_empty() {
                requests.extend(query.state_ids.iter().map(|state_id| ExportRequest {
                    url: NORTH_AMERICA_URL,
                    params: vec![
                        ("country", country.name.clone()),
                        ("state_id", state_id.clone()),
                    ],
                }));
            } else {
                let url = if country.is_north_america() {
                    NORTH_AMERICA_URL
                } else {
                    REST_OF_WORLD_URL
                };
                requests.push(ExportRequest {
                    url,
                    params: vec![("country", country.name.clone())],
                });
            }
        }
        requests
    }

    fn map_send_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::NetworkError(error)
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_export(&self, request: &ExportRequest) -> Result<ExportResponse, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(request.url)
                .headers(self.auth_headers()?)
                .query(&request.params)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await.map_err(|e| self.map_send_error(e))?;
                    return serde_json::from_str(&text).map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse export response: {}", e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = request.url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl RepeaterSource for ApiClient {
    async fn download(&self, query: &ExportQuery) -> Result<Vec<Repeater>, ApiError> {
        let mut repeaters = Vec::new();
        for request in Self::export_requests(query) {
            let response = self.get_export(&request).await?;
            if let Some(message) = response.error_message() {
                return Err(ApiError::InvalidResponse(message));
            }
            let batch = response.into_repeaters();
            debug!(url = request.url, params = ?request.params, count = batch.len(), "Downloaded repeaters");
            repeaters.extend(batch);
        }
        Ok(repeaters)
    }
}
