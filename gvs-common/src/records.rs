//! Canonical graduate record model
//!
//! One `GraduateRecord` per spreadsheet row. The typed fields cover the
//! columns every deployment ships; unanticipated columns are preserved in
//! the flattened `extra` map so they survive the round trip to the preview
//! and the import payload.
//!
//! Records are immutable once parsed: validation and preview only read
//! them, and the import payload serializes them as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One graduate, as imported from a spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraduateRecord {
    pub student_national_id: String,
    pub student_full_name: String,
    pub year_of_graduation: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub obtained_certificate: String,
    pub institution_name: String,
    pub institution_country: String,
    pub is_accredited: bool,
    pub cgpa: f64,
    pub qualification: String,
    pub study_program: String,
    /// Columns with no typed counterpart, keyed by their header text
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GraduateRecord {
    fn default() -> Self {
        Self {
            student_national_id: String::new(),
            student_full_name: String::new(),
            year_of_graduation: 0,
            end_date: None,
            obtained_certificate: String::new(),
            institution_name: String::new(),
            institution_country: String::new(),
            is_accredited: false,
            cgpa: 0.0,
            qualification: String::new(),
            study_program: String::new(),
            extra: Map::new(),
        }
    }
}

/// Legacy record shape carried by early deployments: a bare name and degree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimpleRecord {
    pub name: String,
    #[serde(default)]
    pub degree: String,
}

/// One of the two historical record shapes accepted on the wire.
///
/// Clients predating the detailed schema still send `{name, degree}`.
/// Everything downstream of `normalize` works on the canonical
/// `GraduateRecord` only; no business logic branches on field presence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordShape {
    Simple(SimpleRecord),
    Detailed(GraduateRecord),
}

impl RecordShape {
    /// Map either input shape to one canonical record.
    ///
    /// Detailed records that carry the legacy `name`/`degree` keys in their
    /// open map get those values promoted into the typed fields when the
    /// typed fields are blank; the open map keeps the originals so the
    /// record round-trips unchanged.
    pub fn normalize(self) -> GraduateRecord {
        match self {
            RecordShape::Simple(simple) => GraduateRecord {
                student_full_name: simple.name,
                qualification: simple.degree,
                ..GraduateRecord::default()
            },
            RecordShape::Detailed(mut record) => {
                if record.student_full_name.is_empty() {
                    if let Some(Value::String(name)) = record.extra.get("name") {
                        record.student_full_name = name.clone();
                    }
                }
                if record.qualification.is_empty() {
                    if let Some(Value::String(degree)) = record.extra.get("degree") {
                        record.qualification = degree.clone();
                    }
                }
                record
            }
        }
    }
}
