//! Service-layer components: the backend verification client and the
//! import orchestrator that drives it.

pub mod backend_client;
pub mod orchestrator;

pub use backend_client::{BackendClient, ImportRequest, TransportError};
pub use orchestrator::{ImportBatch, ImportOrchestrator, SigningKeys};
