//! Record validation API
//!
//! POST /records/validate - batch-validate records supplied as JSON, for
//! clients that hold records outside a spreadsheet upload. Accepts both
//! historical record shapes; everything is normalized before validation.

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::validators::{BatchValidation, RecordValidator};
use crate::AppState;
use gvs_common::records::{GraduateRecord, RecordShape};

/// POST /records/validate request
#[derive(Debug, Deserialize)]
pub struct ValidateRecordsRequest {
    /// Records in either the simple or the detailed shape
    pub records: Vec<RecordShape>,
}

/// POST /records/validate response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRecordsResponse {
    pub total: usize,
    #[serde(flatten)]
    pub batch: BatchValidation,
}

/// POST /records/validate
///
/// Never fails for malformed record content: every record comes back with
/// a result, and data problems are expressed as errors/warnings.
pub async fn validate_records(
    Json(request): Json<ValidateRecordsRequest>,
) -> Json<ValidateRecordsResponse> {
    let records: Vec<GraduateRecord> = request
        .records
        .into_iter()
        .map(RecordShape::normalize)
        .collect();

    let validator = RecordValidator::new();
    let batch = validator.validate_records(&records);

    tracing::debug!(
        total = records.len(),
        valid = batch.valid_records.len(),
        invalid = batch.invalid_records.len(),
        "Validated record batch"
    );

    Json(ValidateRecordsResponse {
        total: records.len(),
        batch,
    })
}

/// Build record validation routes
pub fn record_routes() -> Router<AppState> {
    Router::new().route("/records/validate", post(validate_records))
}
