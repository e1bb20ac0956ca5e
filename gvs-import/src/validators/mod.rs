//! Record validation layer

pub mod record_validator;

pub use record_validator::{BatchValidation, RecordValidator, ValidationResult};
