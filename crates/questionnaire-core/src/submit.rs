// crates/questionnaire-core/src/submit.rs
// ============================================================================
// Module: Questionnaire Submitters
// Description: Pluggable submission backends for completed questionnaires.
// Purpose: Decouple the store's submit lifecycle from the transport.
// Dependencies: async-trait, reqwest, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The store hands completed answers to a [`Submitter`]. Two backends ship
//! with the crate: [`SimulatedSubmitter`] waits a fixed delay and succeeds,
//! and [`HttpSubmitter`] posts the answers as JSON to a lead-intake endpoint.
//! Submitters must not retry on their own; failures surface once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use thiserror::Error;

use crate::data::QuestionnaireData;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by questionnaire submitters.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request could not be delivered.
    #[error("submission transport failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("submission rejected with status {status}")]
    Rejected {
        /// HTTP status code returned by the endpoint.
        status: u16,
    },
    /// The answers could not be encoded.
    #[error("submission encoding failed: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Submitter Trait
// ============================================================================

/// Delivers completed questionnaire answers.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submits the answers.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when delivery fails.
    async fn submit(&self, data: &QuestionnaireData) -> Result<(), SubmitError>;
}

// ============================================================================
// SECTION: Simulated Submitter
// ============================================================================

/// Default simulated round-trip delay.
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(1_000);

/// Submitter that waits a fixed delay and then succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedSubmitter {
    /// Delay before reporting success.
    delay: Duration,
}

impl SimulatedSubmitter {
    /// Creates a simulated submitter with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
        }
    }

    /// Returns the configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(&self, _data: &QuestionnaireData) -> Result<(), SubmitError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

// ============================================================================
// SECTION: HTTP Submitter
// ============================================================================

/// Default request timeout for HTTP submissions.
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Submitter that posts answers as JSON to an HTTP endpoint.
///
/// # Invariants
/// - Only 2xx responses count as success.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    /// HTTP client used for submissions.
    client: Client,
    /// Endpoint receiving the answers.
    endpoint: Url,
}

impl HttpSubmitter {
    /// Creates an HTTP submitter for `endpoint` with a default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] when the endpoint is invalid or the
    /// HTTP client cannot be created.
    pub fn new(endpoint: &str) -> Result<Self, SubmitError> {
        Self::with_timeout(endpoint, DEFAULT_SUBMIT_TIMEOUT)
    }

    /// Creates an HTTP submitter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] when the endpoint is invalid or the
    /// HTTP client cannot be created.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| SubmitError::Transport(format!("invalid endpoint: {err}")))?;
        match endpoint.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(SubmitError::Transport(format!("unsupported scheme: {scheme}")));
            }
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, data: &QuestionnaireData) -> Result<(), SubmitError> {
        let body =
            serde_json::to_vec(data).map_err(|err| SubmitError::Serialization(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
