//! Spreadsheet parser
//!
//! Converts uploaded workbook bytes into an ordered list of graduate
//! records. Decoding failures are the only fatal outcome; row-level data
//! problems always flow through as low-quality records for the validator
//! to flag.

pub mod columns;

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{Datelike, NaiveDate};
use gvs_common::config::ColumnConvention;
use gvs_common::records::GraduateRecord;
use serde_json::Value;
use thiserror::Error;

use columns::ColumnMap;

/// Textual affirmative token accepted for the accreditation column
const ACCREDITED_TOKEN: &str = "Yes";

/// Fatal parse failure: the bytes are not a decodable workbook.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Corrupt binary or unsupported container
    #[error("Unreadable spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    /// The blocking decode task died
    #[error("Spreadsheet decode task failed: {0}")]
    Task(String),
}

/// Parse an uploaded workbook into graduate records.
///
/// The synchronous decode runs on the blocking pool; everything else about
/// the parse is pure, so the same bytes always produce the same records.
///
/// # Arguments
/// * `bytes` - Raw workbook bytes as uploaded
/// * `convention` - Column naming convention for this deployment
/// * `default_country` - Substituted when the country cell is blank
pub async fn parse_spreadsheet(
    bytes: Vec<u8>,
    convention: ColumnConvention,
    default_country: String,
) -> Result<Vec<GraduateRecord>, ParseError> {
    tokio::task::spawn_blocking(move || parse_workbook(&bytes, convention, &default_country))
        .await
        .map_err(|e| ParseError::Task(e.to_string()))?
}

/// Decode workbook bytes into records, in file order.
///
/// Only the first sheet is consulted. A header-only or empty sheet yields
/// an empty list, not an error; missing columns default per field.
pub fn parse_workbook(
    bytes: &[u8],
    convention: ColumnConvention,
    default_country: &str,
) -> Result<Vec<GraduateRecord>, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        // A workbook without sheets has no data rows to offer
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    let map = ColumnMap::from_header_row(convention, header);

    Ok(rows
        .map(|row| record_from_row(&map, row, default_country))
        .collect())
}

/// Build one record from one data row, defaulting every absent field
fn record_from_row(map: &ColumnMap, row: &[Data], default_country: &str) -> GraduateRecord {
    let cell = |index: Option<usize>| index.and_then(|i| row.get(i));

    let mut record = GraduateRecord {
        student_national_id: cell(map.student_national_id)
            .map(cell_to_string)
            .unwrap_or_default(),
        student_full_name: cell(map.student_full_name)
            .map(cell_to_string)
            .unwrap_or_default(),
        year_of_graduation: cell(map.year_of_graduation).map(cell_to_year).unwrap_or(0),
        end_date: cell(map.end_date)
            .map(cell_to_string)
            .filter(|s| !s.is_empty()),
        obtained_certificate: cell(map.obtained_certificate)
            .map(cell_to_string)
            .unwrap_or_default(),
        institution_name: cell(map.institution_name)
            .map(cell_to_string)
            .unwrap_or_default(),
        institution_country: cell(map.institution_country)
            .map(cell_to_string)
            .unwrap_or_default(),
        is_accredited: cell(map.is_accredited).map(cell_to_accredited).unwrap_or(false),
        cgpa: cell(map.cgpa).map(cell_to_f64).unwrap_or(0.0),
        qualification: cell(map.qualification).map(cell_to_string).unwrap_or_default(),
        study_program: cell(map.study_program).map(cell_to_string).unwrap_or_default(),
        extra: Default::default(),
    };

    if record.institution_country.is_empty() {
        record.institution_country = default_country.to_string();
    }

    for (index, header) in &map.extras {
        if let Some(value) = row.get(*index).and_then(cell_to_json) {
            record.extra.insert(header.clone(), value);
        }
    }

    record
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Identifier columns frequently arrive as numeric cells
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Coerce a year cell. Date cells and `YYYY-MM-DD` strings yield their
/// calendar year; unparsable values coerce to 0 for validation to flag.
fn cell_to_year(cell: &Data) -> i32 {
    match cell {
        Data::Int(i) => *i as i32,
        Data::Float(f) => *f as i32,
        Data::DateTime(_) => cell.as_datetime().map(|dt| dt.date().year()).unwrap_or(0),
        Data::String(s) | Data::DateTimeIso(s) => parse_year_text(s),
        _ => 0,
    }
}

fn parse_year_text(text: &str) -> i32 {
    let trimmed = text.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return year;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.year())
        .unwrap_or(0)
}

fn cell_to_f64(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// True only for a literal boolean true or the affirmative token
fn cell_to_accredited(cell: &Data) -> bool {
    match cell {
        Data::Bool(b) => *b,
        Data::String(s) => s.trim() == ACCREDITED_TOKEN,
        _ => false,
    }
}

/// Preserve an extra column's value for display; blank cells are dropped
fn cell_to_json(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(Value::from(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(cell_to_string(other))),
    }
}
