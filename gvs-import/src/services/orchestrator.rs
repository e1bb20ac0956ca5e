//! Import orchestrator
//!
//! Assembles the final signing request from a session's batch and the
//! user-supplied keys, and performs exactly one backend call per confirm
//! action. Signing, persistence, and conflict resolution belong to the
//! Backend Verification Service; this component is glue at that boundary.

use gvs_common::records::GraduateRecord;
use tracing::{error, info};

use crate::services::backend_client::{BackendClient, ImportRequest, TransportError};

/// Session-supplied signing material for one confirm action
#[derive(Debug, Clone)]
pub struct SigningKeys {
    /// MOE-issued signature key for the institution/year pair
    pub moe_signature_key: String,
    /// Institution-held private key (PEM)
    pub university_private_key: String,
}

/// Snapshot of a session's batch at confirm time.
///
/// Carries the full unpartitioned record list: invalid records are
/// transmitted too, and the backend or a human reviewer makes the final
/// accept/reject call.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub graduates: Vec<GraduateRecord>,
    pub institution_name: String,
    pub year: String,
}

/// Orchestrates one import submission against the backend client
pub struct ImportOrchestrator<'a> {
    client: &'a BackendClient,
}

impl<'a> ImportOrchestrator<'a> {
    pub fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Submit the batch.
    ///
    /// One network call, no retry. On failure the entire batch is
    /// not-imported; the caller surfaces the backend's message and the
    /// user retries the whole action manually.
    pub async fn execute(
        &self,
        batch: ImportBatch,
        keys: SigningKeys,
    ) -> Result<u64, TransportError> {
        let record_count = batch.graduates.len();

        let request = ImportRequest {
            graduates: batch.graduates,
            institution_name: batch.institution_name,
            year: batch.year,
            moe_signature_key: keys.moe_signature_key,
            university_private_key: keys.university_private_key,
        };

        match self.client.sign_graduates(&request).await {
            Ok(count) => {
                info!(
                    institution = %request.institution_name,
                    year = %request.year,
                    submitted = record_count,
                    accepted = count,
                    "Import batch accepted by backend verification service"
                );
                Ok(count)
            }
            Err(e) => {
                error!(
                    institution = %request.institution_name,
                    year = %request.year,
                    submitted = record_count,
                    error = %e,
                    "Import submission failed"
                );
                Err(e)
            }
        }
    }
}
