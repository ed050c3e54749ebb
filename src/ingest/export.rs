//! Report generation (CSV / XLSX)

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::domain::students::StudentResponse;

const STUDENT_COLUMNS: [&str; 11] = [
    "roll_no",
    "first_name",
    "last_name",
    "email",
    "phone",
    "branch",
    "batch_year",
    "cgpa",
    "backlogs",
    "skills",
    "placed",
];

/// Render student records as a CSV report
pub fn students_csv(students: &[StudentResponse]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(STUDENT_COLUMNS)?;
    for s in students {
        writer.write_record([
            s.roll_no.as_str(),
            s.first_name.as_str(),
            s.last_name.as_deref().unwrap_or(""),
            s.email.as_deref().unwrap_or(""),
            s.phone.as_deref().unwrap_or(""),
            s.branch.as_str(),
            &s.batch_year.to_string(),
            &s.cgpa.to_string(),
            &s.backlogs.to_string(),
            &s.skills.join(", "),
            if s.placed { "yes" } else { "no" },
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// Render student records as an XLSX report
pub fn students_xlsx(students: &[StudentResponse]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in STUDENT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (idx, s) in students.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, &s.roll_no)?;
        worksheet.write_string(row, 1, &s.first_name)?;
        worksheet.write_string(row, 2, s.last_name.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 3, s.email.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 4, s.phone.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 5, &s.branch)?;
        worksheet.write_number(row, 6, s.batch_year as f64)?;
        worksheet.write_number(row, 7, s.cgpa)?;
        worksheet.write_number(row, 8, s.backlogs as f64)?;
        worksheet.write_string(row, 9, &s.skills.join(", "))?;
        worksheet.write_string(row, 10, if s.placed { "yes" } else { "no" })?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn student(roll_no: &str, cgpa: f64) -> StudentResponse {
        StudentResponse {
            id: Uuid::new_v4(),
            college_id: Uuid::new_v4(),
            agency_id: None,
            roll_no: roll_no.to_string(),
            first_name: "Priya".to_string(),
            last_name: Some("Sharma".to_string()),
            email: Some("priya@example.com".to_string()),
            phone: None,
            branch: "CSE".to_string(),
            batch_year: 2026,
            cgpa,
            backlogs: 0,
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            resume_url: None,
            placed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn csv_report_contains_header_and_rows() {
        let bytes = students_csv(&[student("21CS001", 8.4), student("21CS002", 7.2)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().split(',').next(), Some("roll_no"));
        assert!(text.contains("21CS001"));
        assert!(text.contains("21CS002"));
        assert!(text.contains("Rust, SQL"));
    }

    #[test]
    fn csv_report_round_trips_through_import() {
        let bytes = students_csv(&[student("21CS001", 8.4)]).unwrap();
        let sheet = crate::ingest::parse_csv(bytes.as_slice()).unwrap();

        assert!(sheet.errors.is_empty());
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].roll_no, "21CS001");
        assert_eq!(sheet.rows[0].branch, "CSE");
        assert_eq!(sheet.rows[0].cgpa, 8.4);
    }

    #[test]
    fn xlsx_report_is_nonempty_zip() {
        let bytes = students_xlsx(&[student("21CS001", 8.4)]).unwrap();
        // XLSX is a zip container; check the magic bytes
        assert_eq!(&bytes[..2], b"PK");
    }
}
