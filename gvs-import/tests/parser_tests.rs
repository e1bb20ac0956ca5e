//! Spreadsheet parser integration tests
//!
//! Fixtures are real xlsx workbooks generated in memory, so the parser is
//! exercised against the same container format deployments upload.

use gvs_common::config::ColumnConvention;
use gvs_import::parser::{parse_spreadsheet, parse_workbook};
use rust_xlsxwriter::Workbook;

/// A cell value for fixture rows
enum Cell {
    Text(&'static str),
    Number(f64),
    Boolean(bool),
    Blank,
}

/// Build an xlsx workbook with one sheet: a header row plus data rows
fn workbook_bytes(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (row_idx, col_idx) = ((r + 1) as u32, c as u16);
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_idx, col_idx, *text).unwrap();
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_idx, col_idx, *n).unwrap();
                }
                Cell::Boolean(b) => {
                    worksheet.write_boolean(row_idx, col_idx, *b).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

const HUMAN_HEADERS: &[&str] = &[
    "Student National ID",
    "Student Full Name",
    "Year of Graduation",
    "End Date",
    "Obtained Certificate",
    "Institution Name",
    "Institution Country",
    "Is Accredited",
    "CGPA",
    "Qualification",
    "Study Program",
];

fn full_row(id: &'static str, name: &'static str) -> Vec<Cell> {
    vec![
        Cell::Text(id),
        Cell::Text(name),
        Cell::Number(2024.0),
        Cell::Text("2024-06-15"),
        Cell::Text("Bachelor of Science in Computer Science"),
        Cell::Text("University of Technology"),
        Cell::Text("Ethiopia"),
        Cell::Text("Yes"),
        Cell::Number(3.8),
        Cell::Text("Bachelor's Degree"),
        Cell::Text("Computer Science"),
    ]
}

#[tokio::test]
async fn parses_one_record_per_data_row_in_file_order() {
    let bytes = workbook_bytes(
        HUMAN_HEADERS,
        &[
            full_row("1234567890", "John Doe"),
            full_row("2345678901", "Jane Smith"),
            full_row("3456789012", "Ahmed Al-Mansour"),
        ],
    );

    let records = parse_spreadsheet(bytes, ColumnConvention::HumanReadable, "Ethiopia".to_string())
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].student_full_name, "John Doe");
    assert_eq!(records[1].student_full_name, "Jane Smith");
    assert_eq!(records[2].student_full_name, "Ahmed Al-Mansour");

    let first = &records[0];
    assert_eq!(first.student_national_id, "1234567890");
    assert_eq!(first.year_of_graduation, 2024);
    assert_eq!(first.end_date.as_deref(), Some("2024-06-15"));
    assert_eq!(first.institution_name, "University of Technology");
    assert!(first.is_accredited);
    assert_eq!(first.cgpa, 3.8);
    assert_eq!(first.study_program, "Computer Science");
}

#[test]
fn same_bytes_parse_to_same_records() {
    let bytes = workbook_bytes(HUMAN_HEADERS, &[full_row("1234567890", "John Doe")]);

    let first = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    let second = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    assert_eq!(first, second);
}

#[test]
fn machine_key_headers_parse_with_graduation_date() {
    let bytes = workbook_bytes(
        &[
            "student_national_id",
            "student_full_name",
            "graduation_date",
            "institution_name",
            "cgpa",
        ],
        &[vec![
            Cell::Text("123"),
            Cell::Text("Jane Doe"),
            Cell::Text("2023-07-01"),
            Cell::Text("X University"),
            Cell::Number(3.2),
        ]],
    );

    let records = parse_workbook(&bytes, ColumnConvention::MachineKeys, "Ethiopia").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].year_of_graduation, 2023);
    // No accreditation column exists in this convention
    assert!(!records[0].is_accredited);
}

#[test]
fn missing_columns_default_instead_of_erroring() {
    let bytes = workbook_bytes(
        &["Student Full Name"],
        &[vec![Cell::Text("Jane Doe")], vec![Cell::Text("John Doe")]],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    assert_eq!(records.len(), 2);

    for record in &records {
        assert_eq!(record.student_national_id, "");
        assert_eq!(record.year_of_graduation, 0);
        assert_eq!(record.cgpa, 0.0);
        assert!(!record.is_accredited);
        assert_eq!(record.end_date, None);
        assert_eq!(record.institution_country, "Ethiopia", "blank country takes the default");
    }
}

#[test]
fn blank_country_cell_takes_configured_default() {
    let bytes = workbook_bytes(
        &["Student Full Name", "Institution Country"],
        &[
            vec![Cell::Text("Jane Doe"), Cell::Blank],
            vec![Cell::Text("John Doe"), Cell::Text("Kenya")],
        ],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    assert_eq!(records[0].institution_country, "Ethiopia");
    assert_eq!(records[1].institution_country, "Kenya");
}

#[test]
fn accreditation_accepts_boolean_and_affirmative_token() {
    let bytes = workbook_bytes(
        &["Student Full Name", "Is Accredited"],
        &[
            vec![Cell::Text("A"), Cell::Boolean(true)],
            vec![Cell::Text("B"), Cell::Text("Yes")],
            vec![Cell::Text("C"), Cell::Text("No")],
            vec![Cell::Text("D"), Cell::Boolean(false)],
            vec![Cell::Text("E"), Cell::Blank],
        ],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    let flags: Vec<bool> = records.iter().map(|r| r.is_accredited).collect();
    assert_eq!(flags, vec![true, true, false, false, false]);
}

#[test]
fn unparsable_numeric_cells_coerce_to_zero() {
    let bytes = workbook_bytes(
        &["Student Full Name", "Year of Graduation", "CGPA"],
        &[vec![
            Cell::Text("Jane Doe"),
            Cell::Text("unknown"),
            Cell::Text("n/a"),
        ]],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    assert_eq!(records[0].year_of_graduation, 0);
    assert_eq!(records[0].cgpa, 0.0);
}

#[test]
fn unanticipated_columns_are_preserved() {
    let bytes = workbook_bytes(
        &["Student Full Name", "Scholarship", "Honors"],
        &[vec![
            Cell::Text("Jane Doe"),
            Cell::Text("Full"),
            Cell::Boolean(true),
        ]],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    let record = &records[0];
    assert_eq!(
        record.extra.get("Scholarship"),
        Some(&serde_json::Value::String("Full".to_string()))
    );
    assert_eq!(record.extra.get("Honors"), Some(&serde_json::Value::Bool(true)));
}

#[tokio::test]
async fn header_only_workbook_parses_to_empty_sequence() {
    let bytes = workbook_bytes(HUMAN_HEADERS, &[]);

    let records = parse_spreadsheet(bytes, ColumnConvention::HumanReadable, "Ethiopia".to_string())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn undecodable_bytes_fail_with_parse_error() {
    let garbage = b"this is not a spreadsheet".to_vec();

    let result =
        parse_spreadsheet(garbage, ColumnConvention::HumanReadable, "Ethiopia".to_string()).await;
    assert!(result.is_err());
}

#[test]
fn numeric_id_cells_render_as_integer_text() {
    let bytes = workbook_bytes(
        &["Student National ID", "Student Full Name"],
        &[vec![Cell::Number(1234567890.0), Cell::Text("Jane Doe")]],
    );

    let records = parse_workbook(&bytes, ColumnConvention::HumanReadable, "Ethiopia").unwrap();
    assert_eq!(records[0].student_national_id, "1234567890");
}
