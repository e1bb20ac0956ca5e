//! HTTP API handlers

pub mod health;
pub mod import;
pub mod records;

pub use health::health_routes;
pub use import::import_routes;
pub use records::record_routes;
