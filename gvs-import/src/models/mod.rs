//! Data models for the import service

pub mod import_session;

pub use import_session::{ImportSession, SessionState};
