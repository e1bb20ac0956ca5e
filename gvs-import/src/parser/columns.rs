//! Spreadsheet column mapping
//!
//! Resolves the header row of an uploaded workbook against one of the two
//! supported naming conventions. Headers outside the active convention's
//! mapping are kept as extra columns so their values reach the preview.

use calamine::Data;
use gvs_common::config::ColumnConvention;

/// A typed field a spreadsheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    StudentNationalId,
    StudentFullName,
    YearOfGraduation,
    EndDate,
    ObtainedCertificate,
    InstitutionName,
    InstitutionCountry,
    IsAccredited,
    Cgpa,
    Qualification,
    StudyProgram,
}

/// Resolve a header cell to a typed field under the given convention.
///
/// The machine-key convention carries the graduation year in a
/// `graduation_date` column and has no accreditation column at all; the
/// field then takes its coercion default on every record.
fn field_for(convention: ColumnConvention, header: &str) -> Option<Field> {
    match convention {
        ColumnConvention::HumanReadable => match header {
            "Student National ID" => Some(Field::StudentNationalId),
            "Student Full Name" => Some(Field::StudentFullName),
            "Year of Graduation" => Some(Field::YearOfGraduation),
            "End Date" => Some(Field::EndDate),
            "Obtained Certificate" => Some(Field::ObtainedCertificate),
            "Institution Name" => Some(Field::InstitutionName),
            "Institution Country" => Some(Field::InstitutionCountry),
            "Is Accredited" => Some(Field::IsAccredited),
            "CGPA" => Some(Field::Cgpa),
            "Qualification" => Some(Field::Qualification),
            "Study Program" => Some(Field::StudyProgram),
            _ => None,
        },
        ColumnConvention::MachineKeys => match header {
            "student_national_id" => Some(Field::StudentNationalId),
            "student_full_name" => Some(Field::StudentFullName),
            "graduation_date" => Some(Field::YearOfGraduation),
            "end_date" => Some(Field::EndDate),
            "obtained_certificate" => Some(Field::ObtainedCertificate),
            "institution_name" => Some(Field::InstitutionName),
            "institution_country" => Some(Field::InstitutionCountry),
            "cgpa" => Some(Field::Cgpa),
            "qualification" => Some(Field::Qualification),
            "study_program" => Some(Field::StudyProgram),
            _ => None,
        },
    }
}

/// Column indices resolved from a workbook's header row.
///
/// Every typed field is optional: a missing column is legal and yields the
/// field's coercion default on every record, never an error.
#[derive(Debug, Default)]
pub struct ColumnMap {
    pub student_national_id: Option<usize>,
    pub student_full_name: Option<usize>,
    pub year_of_graduation: Option<usize>,
    pub end_date: Option<usize>,
    pub obtained_certificate: Option<usize>,
    pub institution_name: Option<usize>,
    pub institution_country: Option<usize>,
    pub is_accredited: Option<usize>,
    pub cgpa: Option<usize>,
    pub qualification: Option<usize>,
    pub study_program: Option<usize>,
    /// Header text and index of columns with no typed counterpart
    pub extras: Vec<(usize, String)>,
}

impl ColumnMap {
    /// Build the map from the first row of the sheet
    pub fn from_header_row(convention: ColumnConvention, header: &[Data]) -> Self {
        let mut map = ColumnMap::default();

        for (index, cell) in header.iter().enumerate() {
            let text = match cell {
                Data::String(s) => s.trim().to_string(),
                Data::Empty => continue,
                other => other.to_string(),
            };

            match field_for(convention, &text) {
                Some(Field::StudentNationalId) => map.student_national_id = Some(index),
                Some(Field::StudentFullName) => map.student_full_name = Some(index),
                Some(Field::YearOfGraduation) => map.year_of_graduation = Some(index),
                Some(Field::EndDate) => map.end_date = Some(index),
                Some(Field::ObtainedCertificate) => map.obtained_certificate = Some(index),
                Some(Field::InstitutionName) => map.institution_name = Some(index),
                Some(Field::InstitutionCountry) => map.institution_country = Some(index),
                Some(Field::IsAccredited) => map.is_accredited = Some(index),
                Some(Field::Cgpa) => map.cgpa = Some(index),
                Some(Field::Qualification) => map.qualification = Some(index),
                Some(Field::StudyProgram) => map.study_program = Some(index),
                None => map.extras.push((index, text)),
            }
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<Data> {
        cells.iter().map(|c| Data::String(c.to_string())).collect()
    }

    #[test]
    fn human_readable_headers_resolve() {
        let row = header(&["Student National ID", "Student Full Name", "CGPA"]);
        let map = ColumnMap::from_header_row(ColumnConvention::HumanReadable, &row);
        assert_eq!(map.student_national_id, Some(0));
        assert_eq!(map.student_full_name, Some(1));
        assert_eq!(map.cgpa, Some(2));
        assert_eq!(map.institution_name, None);
        assert!(map.extras.is_empty());
    }

    #[test]
    fn machine_keys_resolve_graduation_date_as_year() {
        let row = header(&["student_national_id", "graduation_date"]);
        let map = ColumnMap::from_header_row(ColumnConvention::MachineKeys, &row);
        assert_eq!(map.year_of_graduation, Some(1));
    }

    #[test]
    fn conventions_do_not_mix() {
        // Machine keys under the human-readable convention are unrecognized
        let row = header(&["student_national_id", "cgpa"]);
        let map = ColumnMap::from_header_row(ColumnConvention::HumanReadable, &row);
        assert_eq!(map.student_national_id, None);
        assert_eq!(map.extras.len(), 2);
    }

    #[test]
    fn unrecognized_headers_become_extras() {
        let row = header(&["Student National ID", "Scholarship"]);
        let map = ColumnMap::from_header_row(ColumnConvention::HumanReadable, &row);
        assert_eq!(map.extras, vec![(1, "Scholarship".to_string())]);
    }
}
