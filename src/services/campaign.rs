//! Campaign server client: download tracking and result persistence.
//!
//! Two endpoints, both `POST` under `/campaign/{slug}/`:
//!
//! - `download/` has no body; its response is irrelevant to the caller.
//!   It is still sent as `application/json`, like the save request.
//! - `save/` takes `{"image": "<png data URL>"}` and answers
//!   `{"status": "success", "redirect_url": "..."}` on success.
//!
//! Both carry the CSRF token from the page's cookie in `X-CSRFToken`.
//! Pure helpers (`slug_from_path`, `cookie_value`, `csrf_token`, `parse_save_response`)
//! are kept separate from the HTTP client for testability.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ApiConfig;

pub const CSRF_HEADER: &str = "X-CSRFToken";
const SAVE_STATUS_SUCCESS: &str = "success";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by campaign server operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never got a response (connect, timeout, transport).
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The server returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The server answered but did not accept the result.
    #[error("save rejected by server: status '{status}'")]
    Rejected { status: String },
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// API TRAIT
// =============================================================================

/// Campaign server operations. Enables mocking in tests.
#[async_trait::async_trait]
pub trait CampaignApi: Send + Sync {
    /// Record that the composed image was downloaded.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-2xx status.
    async fn track_download(&self, slug: &str) -> Result<(), ApiError>;

    /// Persist the composed image and return the URL to navigate to.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, an
    /// unparsable body, or a non-success `status` field.
    async fn save_result(&self, slug: &str, image_data_url: &str) -> Result<String, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpCampaignApi {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpCampaignApi {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the client cannot be built.
    pub fn new(config: &ApiConfig, csrf_token: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), csrf_token })
    }

    fn endpoint(&self, slug: &str, action: &str) -> String {
        format!("{}/campaign/{slug}/{action}/", self.base_url)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(url);
        match &self.csrf_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl CampaignApi for HttpCampaignApi {
    async fn track_download(&self, slug: &str) -> Result<(), ApiError> {
        let url = self.endpoint(slug, "download");
        let response = self
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::ApiRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiResponse { status: status.as_u16(), body });
        }
        debug!(%slug, "download tracked");
        Ok(())
    }

    async fn save_result(&self, slug: &str, image_data_url: &str) -> Result<String, ApiError> {
        let url = self.endpoint(slug, "save");
        let body = SaveRequest { image: image_data_url };

        let response = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::ApiRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::ApiRequest(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::ApiResponse { status: status.as_u16(), body: text });
        }

        let redirect_url = parse_save_response(&text)?;
        info!(%slug, %redirect_url, "result saved");
        Ok(redirect_url)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct SaveRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct SaveResponse {
    status: String,
    #[serde(default)]
    redirect_url: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract the redirect URL from a save response body.
///
/// # Errors
///
/// Returns [`ApiError::ApiParse`] for malformed JSON or a success without a
/// redirect URL, and [`ApiError::Rejected`] for any other status.
pub fn parse_save_response(body: &str) -> Result<String, ApiError> {
    let response: SaveResponse = serde_json::from_str(body).map_err(|e| ApiError::ApiParse(e.to_string()))?;
    if response.status != SAVE_STATUS_SUCCESS {
        return Err(ApiError::Rejected { status: response.status });
    }
    response
        .redirect_url
        .ok_or_else(|| ApiError::ApiParse("success response without redirect_url".into()))
}

/// Campaign slug: the second segment of a page path such as
/// `/campaign/{slug}/`. The first segment is not checked.
#[must_use]
pub fn slug_from_path(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').nth(2).filter(|slug| !slug.is_empty())
}

/// Value of cookie `name` in a `Cookie` header, percent-decoded.
///
/// Entries that fail to parse (no `=`, invalid UTF-8 after decoding) are
/// skipped.
#[must_use]
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    cookie::Cookie::split_parse_encoded(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}

/// CSRF token for requests, read from the page's `Cookie` header using the
/// configured cookie name.
#[must_use]
pub fn csrf_token(config: &ApiConfig, cookie_header: Option<&str>) -> Option<String> {
    let token = cookie_header.and_then(|header| cookie_value(header, &config.csrf_cookie));
    if token.is_none() {
        warn!(cookie = %config.csrf_cookie, "no CSRF token; the server will likely reject the request");
    }
    token
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
