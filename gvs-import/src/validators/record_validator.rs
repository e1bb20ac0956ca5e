//! Graduate record validation
//!
//! Classifies each record as valid, valid-with-warnings, or invalid.
//! Validation is a pure function of the record's field values: it never
//! mutates the record and never fails — malformed data comes back as
//! populated errors and warnings so the preview can always render every
//! row.

use chrono::{Datelike, Utc};
use gvs_common::records::GraduateRecord;
use serde::{Deserialize, Serialize};

/// Plausible CGPA range (closed interval)
const CGPA_MIN: f64 = 0.0;
const CGPA_MAX: f64 = 4.0;

/// Graduation years before this are flagged as unusual
const EARLIEST_PLAUSIBLE_YEAR: i32 = 2000;

/// Diagnostic outcome for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// False if any required-field error fired
    pub is_valid: bool,
    /// Required-field errors, in rule order
    pub errors: Vec<String>,
    /// Advisory range warnings; never block import
    pub warnings: Vec<String>,
}

/// Batch validation outcome.
///
/// The partitions preserve input order. `validation_results` holds exactly
/// one entry per input record, keyed by the row index assigned at parse
/// time (the record's position in the input), so results stay attached to
/// their rows even when records are cloned or serialized between stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidation {
    /// Records fit for import, warned ones included
    pub valid_records: Vec<GraduateRecord>,
    /// Records with at least one required-field error
    pub invalid_records: Vec<GraduateRecord>,
    /// Subset of the valid records carrying at least one warning
    pub warning_records: Vec<GraduateRecord>,
    /// One result per input record, index-aligned with the input
    pub validation_results: Vec<ValidationResult>,
}

/// Record validator.
///
/// Carries the current calendar year so classification stays a pure,
/// repeatable function of the record under test.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    current_year: i32,
}

impl RecordValidator {
    /// Validator anchored to the current calendar year
    pub fn new() -> Self {
        Self {
            current_year: Utc::now().year(),
        }
    }

    /// Validator anchored to a fixed year
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Classify one record.
    ///
    /// All required-field checks run; applicable errors are collected, not
    /// short-circuited. Range checks only ever add warnings.
    pub fn validate_record(&self, record: &GraduateRecord) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if record.student_national_id.is_empty() {
            errors.push("Student National ID is required".to_string());
        }

        if record.student_full_name.is_empty() {
            errors.push("Student Full Name is required".to_string());
        }

        if record.institution_name.is_empty() {
            errors.push("Institution Name is required".to_string());
        }

        if record.year_of_graduation == 0 {
            errors.push("Year of Graduation is required".to_string());
        }

        if record.cgpa < CGPA_MIN || record.cgpa > CGPA_MAX {
            warnings.push("CGPA should be between 0 and 4.0".to_string());
        }

        if record.year_of_graduation < EARLIEST_PLAUSIBLE_YEAR
            || record.year_of_graduation > self.current_year
        {
            warnings.push("Year of Graduation seems unusual".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Classify a batch, partitioning records by outcome in input order
    pub fn validate_records(&self, records: &[GraduateRecord]) -> BatchValidation {
        let mut valid_records = Vec::new();
        let mut invalid_records = Vec::new();
        let mut warning_records = Vec::new();
        let mut validation_results = Vec::with_capacity(records.len());

        for record in records {
            let result = self.validate_record(record);

            if !result.is_valid {
                invalid_records.push(record.clone());
            } else {
                if !result.warnings.is_empty() {
                    warning_records.push(record.clone());
                }
                valid_records.push(record.clone());
            }

            validation_results.push(result);
        }

        BatchValidation {
            valid_records,
            invalid_records,
            warning_records,
            validation_results,
        }
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}
