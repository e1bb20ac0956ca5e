//! Import flow API handlers
//!
//! POST /import/upload, GET /import/session/{id},
//! POST /import/session/{id}/confirm, DELETE /import/session/{id}

use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{ImportSession, SessionState},
    parser,
    services::{ImportBatch, ImportOrchestrator, SigningKeys},
    validators::RecordValidator,
    AppState,
};
use gvs_common::records::GraduateRecord;

/// One preview grid row: the record plus its diagnostics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    /// Row index assigned at parse time (position in the file)
    pub row_index: usize,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub record: GraduateRecord,
}

/// Batch counts for the preview header
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub warnings: usize,
}

/// POST /import/upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub institution_name: String,
    pub year: String,
    pub summary: ImportSummary,
    pub preview: Vec<PreviewRow>,
}

/// GET /import/session/{id} response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub institution_name: String,
    pub year: String,
    pub summary: ImportSummary,
    pub preview: Vec<PreviewRow>,
    pub accepted_count: Option<u64>,
    pub error: Option<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// POST /import/session/{id}/confirm request
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub moe_signature_key: String,
    pub university_private_key: String,
}

/// POST /import/session/{id}/confirm response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    /// Count of records the backend reports as accepted
    pub count: u64,
}

/// DELETE /import/session/{id} response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub session_id: Uuid,
    pub discarded: bool,
}

fn summary_of(session: &ImportSession) -> ImportSummary {
    match &session.validation {
        Some(batch) => ImportSummary {
            total: session.records.len(),
            valid: batch.valid_records.len(),
            invalid: batch.invalid_records.len(),
            warnings: batch.warning_records.len(),
        },
        None => ImportSummary {
            total: session.records.len(),
            valid: 0,
            invalid: 0,
            warnings: 0,
        },
    }
}

/// Build the preview grid: every record renders, whatever its quality
fn preview_of(session: &ImportSession) -> Vec<PreviewRow> {
    let Some(batch) = &session.validation else {
        return Vec::new();
    };

    session
        .records
        .iter()
        .zip(batch.validation_results.iter())
        .enumerate()
        .map(|(row_index, (record, result))| PreviewRow {
            row_index,
            is_valid: result.is_valid,
            errors: result.errors.clone(),
            warnings: result.warnings.clone(),
            record: record.clone(),
        })
        .collect()
}

/// POST /import/upload
///
/// Multipart upload: `file` (workbook bytes), `institution_name`, `year`,
/// optional `convention` override. Parses and validates in one step and
/// returns the full preview. Each upload creates a fresh session; the
/// client abandons or deletes the prior one.
pub async fn upload_spreadsheet(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<Vec<u8>> = None;
    let mut institution_name: Option<String> = None;
    let mut year: Option<String> = None;
    let mut convention = state.config.column_convention;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable file field: {}", e)))?;
                file = Some(bytes.to_vec());
            }
            Some("institution_name") => {
                institution_name = Some(read_text_field(field).await?);
            }
            Some("year") => {
                year = Some(read_text_field(field).await?);
            }
            Some("convention") => {
                convention = read_text_field(field)
                    .await?
                    .parse()
                    .map_err(|e: gvs_common::Error| ApiError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Please select an Excel file".to_string()))?;
    let institution_name = institution_name
        .ok_or_else(|| ApiError::BadRequest("Please provide an institution name".to_string()))?;
    let year = year.ok_or_else(|| ApiError::BadRequest("Please select a year".to_string()))?;

    let mut session = ImportSession::new(institution_name, year);

    // Stage 1: decode the workbook into records
    session.records =
        parser::parse_spreadsheet(file, convention, state.config.default_country.clone()).await?;
    session.transition_to(SessionState::Parsed);

    // Stage 2: classify every record for the preview
    let validator = RecordValidator::new();
    session.validation = Some(validator.validate_records(&session.records));
    session.transition_to(SessionState::Validated);

    let response = UploadResponse {
        session_id: session.session_id,
        state: session.state,
        institution_name: session.institution_name.clone(),
        year: session.year.clone(),
        summary: summary_of(&session),
        preview: preview_of(&session),
    };

    tracing::info!(
        session_id = %session.session_id,
        institution = %session.institution_name,
        year = %session.year,
        records = response.summary.total,
        valid = response.summary.valid,
        invalid = response.summary.invalid,
        "Spreadsheet parsed and validated"
    );

    state
        .sessions
        .write()
        .await
        .insert(session.session_id, session);

    Ok(Json(response))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Unreadable form field: {}", e)))
}

/// GET /import/session/{session_id}
///
/// Current state and full preview for one import session.
pub async fn get_import_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Import session not found: {}", session_id)))?;

    Ok(Json(SessionResponse {
        session_id: session.session_id,
        state: session.state,
        institution_name: session.institution_name.clone(),
        year: session.year.clone(),
        summary: summary_of(session),
        preview: preview_of(session),
        accepted_count: session.accepted_count,
        error: session.error.clone(),
        started_at: session.started_at,
        ended_at: session.ended_at,
    }))
}

/// POST /import/session/{session_id}/confirm
///
/// Hands the session's full batch to the backend verification service.
/// Exactly one call per confirm action; the SUBMITTING state doubles as
/// the busy flag that blocks re-submission until the call settles.
pub async fn confirm_import(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<Json<ConfirmResponse>> {
    // Mark the session busy while the lock is held, then release it for
    // the duration of the network call.
    let batch = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or_else(|| {
            ApiError::NotFound(format!("Import session not found: {}", session_id))
        })?;

        if session.is_submitting() {
            return Err(ApiError::Conflict(
                "Import submission already in progress".to_string(),
            ));
        }
        if session.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "Import session already in terminal state: {:?}",
                session.state
            )));
        }

        session.transition_to(SessionState::Submitting);

        ImportBatch {
            graduates: session.records.clone(),
            institution_name: session.institution_name.clone(),
            year: session.year.clone(),
        }
    };

    let keys = SigningKeys {
        moe_signature_key: request.moe_signature_key,
        university_private_key: request.university_private_key,
    };

    let orchestrator = ImportOrchestrator::new(&state.backend);
    let result = orchestrator.execute(batch, keys).await;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id);

    match result {
        Ok(count) => {
            if let Some(session) = session {
                session.accepted_count = Some(count);
                session.transition_to(SessionState::Completed);
            }
            Ok(Json(ConfirmResponse {
                session_id,
                state: SessionState::Completed,
                count,
            }))
        }
        Err(e) => {
            if let Some(session) = session {
                session.error = Some(e.to_string());
                session.transition_to(SessionState::Failed);
            }
            *state.last_error.write().await = Some(e.to_string());
            Err(ApiError::Transport(e))
        }
    }
}

/// DELETE /import/session/{session_id}
///
/// Explicit reset: discard the session and its parsed records.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<ResetResponse>> {
    let removed = state.sessions.write().await.remove(&session_id);

    match removed {
        Some(session) => {
            tracing::info!(
                session_id = %session.session_id,
                records = session.records.len(),
                "Import session discarded"
            );
            Ok(Json(ResetResponse {
                session_id,
                discarded: true,
            }))
        }
        None => Err(ApiError::NotFound(format!(
            "Import session not found: {}",
            session_id
        ))),
    }
}

/// Build import flow routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/upload", post(upload_spreadsheet))
        .route(
            "/import/session/:session_id",
            get(get_import_session).delete(reset_session),
        )
        .route("/import/session/:session_id/confirm", post(confirm_import))
}
