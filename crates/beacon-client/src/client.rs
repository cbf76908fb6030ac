//! HTTP transport for the Beacon matching service.
//!
//! Wraps `reqwest` with Beacon-specific URL handling and status checks. The
//! pipelines in this crate build request bodies; this module only sends them
//! and hands back the raw response text or bytes.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::AppConfig;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::Serialize;

use crate::error::ClientError;
use crate::multipart::MultipartBody;

const DEFAULT_USER_AGENT: &str = "beacon/0.1 (lost-and-found)";

/// Source of raw image bytes for result rows.
///
/// [`BeaconClient`] is the production implementation; tests substitute fakes
/// that control completion order.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetches the bytes behind an already-resolved absolute URL.
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, ClientError>;
}

/// Client for the Beacon REST API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct BeaconClient {
    client: Client,
    base_url: Url,
}

impl BeaconClient {
    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidUrl`] if the base URL
    /// does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Self::from_parts(client, &config.api_base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Self::from_parts(client, base_url)
    }

    fn from_parts(client: Client, base_url: &str) -> Result<Self, ClientError> {
        // Exactly one trailing slash so `Url::join` appends below the base
        // path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: "base URL must use http or https".to_owned(),
            });
        }
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for an API endpoint such as `upload` or `match`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        join_relative(&self.base_url, path)
    }

    /// POSTs an encoded multipart body and returns the 2xx response text.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    pub async fn post_multipart(
        &self,
        url: Url,
        body: MultipartBody,
    ) -> Result<String, ClientError> {
        let content_type = body.content_type();
        let request = self
            .client
            .post(url.clone())
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ACCEPT, "application/json")
            .body(body.into_bytes());
        self.send_for_text(&url, request).await
    }

    /// POSTs `payload` as JSON and returns the 2xx response text.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or if `payload` fails to serialize.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status.
    pub async fn post_json<T>(&self, url: Url, payload: &T) -> Result<String, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let request = self
            .client
            .post(url.clone())
            .header(header::ACCEPT, "application/json")
            .json(payload);
        self.send_for_text(&url, request).await
    }

    /// GETs raw bytes (image downloads).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx status, including 404.
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        tracing::debug!(url = %url, len = bytes.len(), "fetched bytes");
        Ok(bytes.to_vec())
    }

    async fn send_for_text(&self, url: &Url, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "non-success response");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ImageSource for BeaconClient {
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(url).await
    }
}

/// Resolves a server-supplied image reference.
///
/// Absolute `http`/`https` URLs pass through unchanged. Anything else is a
/// path relative to `base`; a leading `/` is treated as relative to the base
/// path, not the host root, so `https://h/api` + `/uploads/a.jpg` yields
/// `https://h/api/uploads/a.jpg`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidUrl`] for empty input, non-http absolute
/// URLs, or paths that cannot be joined.
pub fn resolve_image_url(base: &Url, raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ClientError::InvalidUrl {
            url: raw.to_owned(),
            reason: "empty image URL".to_owned(),
        });
    }

    if let Ok(absolute) = Url::parse(raw) {
        return match absolute.scheme() {
            "http" | "https" => Ok(absolute),
            other => Err(ClientError::InvalidUrl {
                url: raw.to_owned(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        };
    }

    join_relative(base, raw)
}

fn join_relative(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ClientError::InvalidUrl {
            url: path.to_owned(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
