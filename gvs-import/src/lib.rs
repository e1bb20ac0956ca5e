//! gvs-import library interface
//!
//! Exposes the import pipeline (parser, validators, orchestrator) and the
//! HTTP surface for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;
pub mod validators;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use gvs_common::config::GvsConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::models::ImportSession;
use crate::services::BackendClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<GvsConfig>,
    /// Client for the Backend Verification Service
    pub backend: Arc<BackendClient>,
    /// Active import sessions, one per uploaded spreadsheet
    pub sessions: Arc<RwLock<HashMap<Uuid, ImportSession>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: GvsConfig) -> Self {
        let backend = Arc::new(BackendClient::new(config.backend_url.clone()));

        Self {
            config: Arc::new(config),
            backend,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::record_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
