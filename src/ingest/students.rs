//! Bulk student sheet parsing
//!
//! CSV and XLSX inputs go through the same row builder, so both formats
//! produce identical records. Rows that cannot be mapped are collected as
//! errors; one bad row never fails the upload.

use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx};
use thiserror::Error;

use super::headers::{field_for_header, StudentField};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(String),

    #[error("Sheet has no rows")]
    EmptySheet,

    #[error("No recognizable columns found; need at least a roll number, name and branch")]
    UnmappedHeaders,
}

/// One student parsed from a sheet row
#[derive(Debug, Clone, PartialEq)]
pub struct StudentImportRow {
    pub roll_no: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub branch: String,
    pub batch_year: i32,
    pub cgpa: f64,
    pub backlogs: i32,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
}

/// A row that could not be mapped, with its 1-indexed sheet row number
#[derive(Debug, Clone, serde::Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Parsed sheet: clean records plus per-row errors
#[derive(Debug, Default)]
pub struct ParsedSheet {
    pub rows: Vec<StudentImportRow>,
    pub errors: Vec<RowError>,
}

/// Parse a CSV upload
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedSheet, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        records.push(record.iter().map(|c| c.to_string()).collect());
    }

    build_rows(&headers, records)
}

/// Parse the first worksheet of an XLSX upload
pub fn parse_xlsx(bytes: &[u8]) -> Result<ParsedSheet, IngestError> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| IngestError::Xlsx(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptySheet)?
        .map_err(|e| IngestError::Xlsx(e.to_string()))?;

    let mut iter = range.rows();
    let headers: Vec<String> = iter
        .next()
        .ok_or(IngestError::EmptySheet)?
        .iter()
        .map(cell_to_string)
        .collect();

    let records: Vec<Vec<String>> = iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    build_rows(&headers, records)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            // Integral floats (years, roll numbers) should not print as "2026.0"
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn build_rows(headers: &[String], records: Vec<Vec<String>>) -> Result<ParsedSheet, IngestError> {
    let columns: Vec<Option<StudentField>> =
        headers.iter().map(|h| field_for_header(h)).collect();

    let has = |field: StudentField| columns.contains(&Some(field));
    let has_name = has(StudentField::FullName) || has(StudentField::FirstName);
    if !has(StudentField::RollNo) || !has_name || !has(StudentField::Branch) {
        return Err(IngestError::UnmappedHeaders);
    }

    let mut sheet = ParsedSheet::default();

    for (idx, record) in records.into_iter().enumerate() {
        // Header occupies row 1
        let row_no = idx + 2;

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        match build_row(&columns, &record) {
            Ok(row) => sheet.rows.push(row),
            Err(message) => sheet.errors.push(RowError {
                row: row_no,
                message,
            }),
        }
    }

    Ok(sheet)
}

fn build_row(columns: &[Option<StudentField>], record: &[String]) -> Result<StudentImportRow, String> {
    let mut roll_no = None;
    let mut full_name = None;
    let mut first_name = None;
    let mut last_name = None;
    let mut email = None;
    let mut phone = None;
    let mut branch = None;
    let mut batch_year = None;
    let mut cgpa = None;
    let mut backlogs = None;
    let mut skills = Vec::new();
    let mut resume_url = None;

    for (field, cell) in columns.iter().zip(record.iter()) {
        let value = cell.trim();
        if value.is_empty() {
            continue;
        }
        match field {
            Some(StudentField::RollNo) => roll_no = Some(value.to_string()),
            Some(StudentField::FullName) => full_name = Some(value.to_string()),
            Some(StudentField::FirstName) => first_name = Some(value.to_string()),
            Some(StudentField::LastName) => last_name = Some(value.to_string()),
            Some(StudentField::Email) => email = Some(value.to_string()),
            Some(StudentField::Phone) => phone = Some(value.to_string()),
            Some(StudentField::Branch) => branch = Some(value.to_string()),
            Some(StudentField::BatchYear) => {
                batch_year =
                    Some(value.parse::<i32>().map_err(|_| {
                        format!("Invalid batch year '{}'", value)
                    })?)
            }
            Some(StudentField::Cgpa) => {
                cgpa = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid CGPA '{}'", value))?,
                )
            }
            Some(StudentField::Backlogs) => {
                backlogs = Some(
                    value
                        .parse::<i32>()
                        .map_err(|_| format!("Invalid backlog count '{}'", value))?,
                )
            }
            Some(StudentField::Skills) => {
                skills = value
                    .split([',', ';'])
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }
            Some(StudentField::ResumeUrl) => resume_url = Some(value.to_string()),
            None => {}
        }
    }

    let roll_no = roll_no.ok_or_else(|| "Missing roll number".to_string())?;
    let branch = branch.ok_or_else(|| "Missing branch".to_string())?;

    // Prefer explicit first/last columns; otherwise split a full-name cell
    let (first_name, last_name) = match (first_name, full_name) {
        (Some(first), _) => (first, last_name),
        (None, Some(full)) => match full.split_once(' ') {
            Some((first, rest)) => (first.to_string(), Some(rest.trim().to_string())),
            None => (full, last_name),
        },
        (None, None) => return Err("Missing student name".to_string()),
    };

    let batch_year = batch_year.ok_or_else(|| "Missing batch year".to_string())?;

    let cgpa = cgpa.unwrap_or(0.0);
    if !(0.0..=10.0).contains(&cgpa) {
        return Err(format!("CGPA {} out of range", cgpa));
    }

    Ok(StudentImportRow {
        roll_no,
        first_name,
        last_name,
        email,
        phone,
        branch,
        batch_year,
        cgpa,
        backlogs: backlogs.unwrap_or(0),
        skills,
        resume_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Roll No.,Student Name,Dept,Year of Passing,Aggregate CGPA,No. of Backlogs,E-Mail,Skills
21CS001,Priya Sharma,CSE,2026,8.4,0,priya@example.com,\"Rust, SQL\"
21EC014,Ravi Kumar,ECE,2026,7.1,1,ravi@example.com,
21ME020,Asha,MECH,2026,9.0,0,,Python;CAD
";

    #[test]
    fn parses_loose_headers() {
        let sheet = parse_csv(SHEET.as_bytes()).unwrap();
        assert!(sheet.errors.is_empty());
        assert_eq!(sheet.rows.len(), 3);

        let priya = &sheet.rows[0];
        assert_eq!(priya.roll_no, "21CS001");
        assert_eq!(priya.first_name, "Priya");
        assert_eq!(priya.last_name.as_deref(), Some("Sharma"));
        assert_eq!(priya.branch, "CSE");
        assert_eq!(priya.batch_year, 2026);
        assert_eq!(priya.cgpa, 8.4);
        assert_eq!(priya.skills, vec!["Rust", "SQL"]);

        // Single-word name stays in first_name
        assert_eq!(sheet.rows[2].first_name, "Asha");
        assert_eq!(sheet.rows[2].last_name, None);
        assert_eq!(sheet.rows[2].skills, vec!["Python", "CAD"]);
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let input = "\
Roll No,Name,Branch,Batch
21CS001,Priya Sharma,CSE,2026
,Missing Roll,CSE,2026
21CS003,Bad Year,CSE,soon
21CS004,Asha Patel,CSE,2026
";
        let sheet = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.errors.len(), 2);
        assert_eq!(sheet.errors[0].row, 3);
        assert!(sheet.errors[0].message.contains("roll number"));
        assert_eq!(sheet.errors[1].row, 4);
        assert!(sheet.errors[1].message.contains("batch year"));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let input = "Roll No,Name,Branch,Batch\n21CS001,Priya,CSE,2026\n,,,\n";
        let sheet = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.errors.is_empty());
    }

    #[test]
    fn rejects_sheet_without_key_columns() {
        let input = "Foo,Bar\n1,2\n";
        assert!(matches!(
            parse_csv(input.as_bytes()),
            Err(IngestError::UnmappedHeaders)
        ));
    }

    #[test]
    fn cgpa_out_of_range_is_row_error() {
        let input = "Roll No,Name,Branch,Batch,CGPA\n21CS001,Priya,CSE,2026,42\n";
        let sheet = parse_csv(input.as_bytes()).unwrap();
        assert!(sheet.rows.is_empty());
        assert!(sheet.errors[0].message.contains("out of range"));
    }
}
