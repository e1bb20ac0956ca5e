//! Backend Verification Service client
//!
//! Thin HTTP client for the external service that owns signing,
//! persistence, and conflict resolution. This layer only forwards the
//! batch and passes the reported outcome through.

use gvs_common::records::GraduateRecord;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Timeout for backend verification service requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport failure: the backend is unreachable or rejected the batch.
///
/// Fatal to the one import attempt; the caller retries the whole action
/// manually. No partial commit is visible at this layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network failure or undecodable response
    #[error("Backend verification service unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered non-2xx; message is the backend's, verbatim
    #[error("{0}")]
    Rejected(String),
}

/// Import request payload for `POST /university/sign_graduate`
#[derive(Debug, Clone, Serialize)]
pub struct ImportRequest {
    /// Full unpartitioned batch; validation does not block transmission
    pub graduates: Vec<GraduateRecord>,
    pub institution_name: String,
    pub year: String,
    pub moe_signature_key: String,
    pub university_private_key: String,
}

/// Success response. Deployed backends report either an accepted-record
/// count or the signed records themselves.
#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    signed_graduates: Option<Vec<serde_json::Value>>,
}

/// Failure response body; `error` is surfaced to the user verbatim
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the Backend Verification Service
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Submit a batch for signing and persistence.
    ///
    /// Exactly one request per call: no retry, no cache. Returns the count
    /// of records the backend reports as accepted.
    pub async fn sign_graduates(&self, request: &ImportRequest) -> Result<u64, TransportError> {
        let url = format!(
            "{}/university/sign_graduate",
            self.base_url.trim_end_matches('/')
        );

        debug!(
            url = %url,
            graduates = request.graduates.len(),
            institution = %request.institution_name,
            "Submitting batch to backend verification service"
        );

        let response = self.http_client.post(&url).json(request).send().await?;
        let status = response.status();

        if status.is_success() {
            let body: SignResponse = response.json().await?;
            let count = match (body.count, body.signed_graduates) {
                (Some(count), _) => count,
                (None, Some(signed)) => signed.len() as u64,
                (None, None) => {
                    warn!("Backend reported success without a count; assuming zero accepted");
                    0
                }
            };
            Ok(count)
        } else {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    format!("Backend verification service returned {}", status)
                });
            Err(TransportError::Rejected(message))
        }
    }
}
