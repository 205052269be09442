//! Typed HTTP pipeline.
//!
//! One shared [`ApiClient`] executes every request in the crate and
//! normalizes failures into the [`ApiError`] taxonomy. Classification
//! order, first match wins: transport failure, malformed response,
//! non-2xx status (raw body kept), empty body, decode failure (raw body
//! kept). Retries are a caller policy; this layer never retries.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper around a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.client.delete(url)
    }

    /// Execute a prepared request and decode the JSON body into `T`.
    ///
    /// Yields exactly one terminal result per call.
    pub async fn fetch_object<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.read_success_body(request).await?;
        if body.is_empty() {
            tracing::warn!("empty body where data was required");
            return Err(ApiError::EmptyBody);
        }
        serde_json::from_slice(&body).map_err(|e| {
            let raw = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(error = %e, body = %raw, "response body failed to decode");
            ApiError::Decoding { message: e.to_string(), body: raw }
        })
    }

    /// Execute a prepared request, checking only for a 2xx status.
    ///
    /// Used by endpoints whose response body carries nothing the client
    /// needs (like/unlike).
    pub async fn send_no_body(&self, request: RequestBuilder) -> ApiResult<()> {
        self.read_success_body(request).await.map(|_| ())
    }

    async fn read_success_body(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();

        // The body is read before the status check so a non-2xx result
        // carries the server's diagnostics.
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to read response body");
                ApiError::InvalidResponse(e.to_string())
            })?
            .to_vec();

        if !status.is_success() {
            let raw = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(status = status.as_u16(), body = %raw, "HTTP error response");
            return Err(ApiError::HttpStatus { status: status.as_u16(), body: raw });
        }
        Ok(body)
    }
}

fn classify_send_error(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        tracing::warn!(error = %error, "request construction failed");
        return ApiError::InvalidRequest(error.to_string());
    }
    if error.is_connect() || error.is_timeout() || error.is_request() {
        tracing::warn!(error = %error, "transport failure");
        return ApiError::Transport(error.to_string());
    }
    tracing::warn!(error = %error, "malformed response");
    ApiError::InvalidResponse(error.to_string())
}
