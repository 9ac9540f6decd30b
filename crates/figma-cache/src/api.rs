// crates/figma-cache/src/api.rs
// ============================================================================
// Module: Design API Client
// Description: Bounded HTTP client for the design tool's REST API.
// Purpose: Fetch file versions, node metadata, image URLs, and image bytes.
// Dependencies: crate::events, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`DesignApi`] is the seam between the cache pipeline and the network.
//! [`FigmaClient`] implements it over blocking `reqwest` with a request
//! timeout, response size limits, and one retry for transient failures
//! (transport errors, HTTP 429, HTTP 5xx). API calls never follow redirects;
//! image downloads follow a bounded number of them because rendered images
//! are served from a redirecting CDN.
//!
//! The access token is sent in the `X-Figma-Token` header and is never
//! included in errors or events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::events::CacheEvent;
use crate::events::CacheEvents;
use crate::events::NoopEvents;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.figma.com";

/// Header carrying the personal access token.
pub const TOKEN_HEADER: &str = "X-Figma-Token";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default pause before the retry, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Default cap on JSON response bodies.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Default cap on downloaded images.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 64 * 1024 * 1024;

/// Redirects followed when downloading images.
const MAX_IMAGE_REDIRECTS: usize = 5;

/// Attempts per request, including the first one.
const MAX_ATTEMPTS: u32 = 2;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by the design API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The client or a request URL could not be built.
    #[error("api client error: {0}")]
    Client(String),
    /// The request failed before a response arrived.
    #[error("request to {path} failed: {message}")]
    Http {
        /// Request path.
        path: String,
        /// Transport failure description.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("request to {path} returned status {status}")]
    Status {
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
    },
    /// The response body was not the expected JSON.
    #[error("invalid json from {path}: {message}")]
    Json {
        /// Request path.
        path: String,
        /// Decode failure description.
        message: String,
    },
    /// The response body exceeded the configured size limit.
    #[error("response from {path} exceeds {limit} bytes")]
    TooLarge {
        /// Request path.
        path: String,
        /// Byte limit.
        limit: usize,
    },
}

impl ApiError {
    /// Returns true when retrying the request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http {
                ..
            } => true,
            Self::Status {
                status, ..
            } => *status == 429 || *status >= 500,
            Self::Client(_)
            | Self::Json {
                ..
            }
            | Self::TooLarge {
                ..
            } => false,
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Version information returned by the file probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileVersion {
    /// Current file version.
    #[serde(default)]
    pub version: Option<String>,
    /// Last modification timestamp.
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Rendered image lookup response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageUrls {
    /// Render error reported by the API.
    #[serde(default)]
    pub err: Option<String>,
    /// Image URL per node id; `None` when the node could not be rendered.
    #[serde(default)]
    pub images: BTreeMap<String, Option<String>>,
}

impl ImageUrls {
    /// Returns the image URL rendered for `node_id`.
    #[must_use]
    pub fn url_for(&self, node_id: &str) -> Option<&str> {
        self.images.get(node_id).and_then(Option::as_deref)
    }
}

// ============================================================================
// SECTION: API Trait
// ============================================================================

/// Remote operations the cache pipeline depends on.
pub trait DesignApi: Send + Sync {
    /// Fetches the file version with a shallow file request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn file_version(&self, file_key: &str) -> Result<FileVersion, ApiError>;

    /// Fetches the node metadata response verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn node_metadata(&self, file_key: &str, node_id: &str) -> Result<Value, ApiError>;

    /// Requests a 2x PNG render of the node.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn image_urls(&self, file_key: &str, node_id: &str) -> Result<ImageUrls, ApiError>;

    /// Downloads rendered image bytes, following redirects.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the download fails.
    fn download_image(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for [`FigmaClient`].
///
/// # Invariants
/// - `timeout_ms` applies to the full request lifecycle.
/// - `max_response_bytes` and `max_image_bytes` are hard upper bounds.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API base URL without a trailing path.
    pub base_url: String,
    /// Personal access token.
    pub token: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Pause before the retry, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Maximum JSON response size in bytes.
    pub max_response_bytes: usize,
    /// Maximum image size in bytes.
    pub max_image_bytes: usize,
    /// User agent for outbound requests.
    pub user_agent: String,
}

impl ApiConfig {
    /// Creates a configuration with defaults and the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            user_agent: concat!("figma-cache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking design API client.
///
/// # Invariants
/// - Every request is attempted at most twice.
/// - API requests never follow redirects.
pub struct FigmaClient {
    /// Client configuration.
    config: ApiConfig,
    /// Parsed API base URL.
    base: Url,
    /// Client for API requests.
    api: Client,
    /// Client for image downloads.
    images: Client,
    /// Observer for retry events.
    events: Arc<dyn CacheEvents>,
}

impl FigmaClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] when the base URL is invalid or the HTTP
    /// clients cannot be created.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| ApiError::Client(format!("invalid api base url: {err}")))?;
        let timeout = Duration::from_millis(config.timeout_ms);
        let api = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;
        let images = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(MAX_IMAGE_REDIRECTS))
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;
        Ok(Self {
            config,
            base,
            api,
            images,
            events: Arc::new(NoopEvents),
        })
    }

    /// Routes retry events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn CacheEvents>) -> Self {
        self.events = events;
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the absolute URL for an API path and query.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Issues an authenticated GET and decodes the JSON body.
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = self.endpoint(path, query);
        self.with_retry(path, || {
            let mut response = self
                .api
                .get(url.clone())
                .header(TOKEN_HEADER, &self.config.token)
                .send()
                .map_err(|err| ApiError::Http {
                    path: path.to_string(),
                    message: describe_transport(&err),
                })?;
            check_status(path, &response)?;
            let body = read_response_limited(&mut response, path, self.config.max_response_bytes)?;
            serde_json::from_slice(&body).map_err(|err| ApiError::Json {
                path: path.to_string(),
                message: err.to_string(),
            })
        })
    }

    /// Runs `request` and retries it once on a transient failure.
    fn with_retry<T>(
        &self,
        path: &str,
        request: impl Fn() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut attempt = 1;
        loop {
            match request() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                    attempt += 1;
                    self.events.emit(&CacheEvent::Retry {
                        path: path.to_string(),
                        attempt,
                        reason: err.to_string(),
                    });
                    thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl DesignApi for FigmaClient {
    fn file_version(&self, file_key: &str) -> Result<FileVersion, ApiError> {
        let path = format!("/v1/files/{file_key}");
        let value = self.get_json(&path, &[("depth", "1")])?;
        serde_json::from_value(value).map_err(|err| ApiError::Json {
            path,
            message: err.to_string(),
        })
    }

    fn node_metadata(&self, file_key: &str, node_id: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/v1/files/{file_key}/nodes"), &[("ids", node_id)])
    }

    fn image_urls(&self, file_key: &str, node_id: &str) -> Result<ImageUrls, ApiError> {
        let path = format!("/v1/images/{file_key}");
        let value =
            self.get_json(&path, &[("ids", node_id), ("format", "png"), ("scale", "2")])?;
        serde_json::from_value(value).map_err(|err| ApiError::Json {
            path,
            message: err.to_string(),
        })
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let target = Url::parse(url)
            .map_err(|err| ApiError::Client(format!("invalid image url: {err}")))?;
        match target.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiError::Client(format!("unsupported image url scheme: {scheme}")));
            }
        }
        let path = target.path().to_string();
        self.with_retry(&path, || {
            let mut response = self.images.get(target.clone()).send().map_err(|err| {
                ApiError::Http {
                    path: path.clone(),
                    message: describe_transport(&err),
                }
            })?;
            check_status(&path, &response)?;
            read_response_limited(&mut response, &path, self.config.max_image_bytes)
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps non-success statuses to [`ApiError::Status`].
fn check_status(path: &str, response: &Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        path: path.to_string(),
        status: status.as_u16(),
    })
}

/// Describes a transport error without echoing request headers.
fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_redirect() {
        "too many redirects".to_string()
    } else {
        err.to_string()
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    path: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, ApiError> {
    let too_large = || ApiError::TooLarge {
        path: path.to_string(),
        limit: max_bytes,
    };
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| ApiError::Client("response size limit exceeds u64".to_string()))?;
    let expected_len = response.content_length();
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(too_large());
    }
    let mut body = Vec::new();
    response.take(max_bytes_u64.saturating_add(1)).read_to_end(&mut body).map_err(|err| {
        ApiError::Http {
            path: path.to_string(),
            message: format!("failed to read response: {err}"),
        }
    })?;
    if body.len() > max_bytes {
        return Err(too_large());
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| ApiError::Client("invalid response length".to_string()))?;
        if body.len() < expected {
            return Err(ApiError::Http {
                path: path.to_string(),
                message: "response truncated".to_string(),
            });
        }
    }
    Ok(body)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
