//! Header-to-field mapping for bulk student sheets
//!
//! Uploaded sheets come from many colleges and no two use the same column
//! names. Headers are normalized (whitespace collapsed, punctuation
//! stripped, lowercased) and looked up against the alias table below.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Student schema fields a sheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    RollNo,
    FullName,
    FirstName,
    LastName,
    Email,
    Phone,
    Branch,
    BatchYear,
    Cgpa,
    Backlogs,
    Skills,
    ResumeUrl,
}

static HEADER_MAP: OnceLock<HashMap<String, StudentField>> = OnceLock::new();

/// Normalize a header cell for lookup
pub fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let mapped: String = cleaned
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Resolve a raw header cell to a schema field, if recognized
pub fn field_for_header(header: &str) -> Option<StudentField> {
    header_map().get(&normalize_header(header)).copied()
}

fn header_map() -> &'static HashMap<String, StudentField> {
    HEADER_MAP.get_or_init(|| {
        const ALIASES: &[(&str, StudentField)] = &[
            // Roll number
            ("roll no", StudentField::RollNo),
            ("roll number", StudentField::RollNo),
            ("roll", StudentField::RollNo),
            ("registration no", StudentField::RollNo),
            ("registration number", StudentField::RollNo),
            ("reg no", StudentField::RollNo),
            ("enrollment no", StudentField::RollNo),
            ("enrolment no", StudentField::RollNo),
            ("usn", StudentField::RollNo),
            ("student id", StudentField::RollNo),
            // Names
            ("name", StudentField::FullName),
            ("student name", StudentField::FullName),
            ("full name", StudentField::FullName),
            ("name of student", StudentField::FullName),
            ("first name", StudentField::FirstName),
            ("last name", StudentField::LastName),
            ("surname", StudentField::LastName),
            // Contact
            ("email", StudentField::Email),
            ("e mail", StudentField::Email),
            ("email id", StudentField::Email),
            ("e mail id", StudentField::Email),
            ("email address", StudentField::Email),
            ("mail id", StudentField::Email),
            ("phone", StudentField::Phone),
            ("phone no", StudentField::Phone),
            ("phone number", StudentField::Phone),
            ("mobile", StudentField::Phone),
            ("mobile no", StudentField::Phone),
            ("contact no", StudentField::Phone),
            // Academics
            ("branch", StudentField::Branch),
            ("department", StudentField::Branch),
            ("dept", StudentField::Branch),
            ("stream", StudentField::Branch),
            ("course", StudentField::Branch),
            ("batch", StudentField::BatchYear),
            ("batch year", StudentField::BatchYear),
            ("passing year", StudentField::BatchYear),
            ("year of passing", StudentField::BatchYear),
            ("graduation year", StudentField::BatchYear),
            ("yop", StudentField::BatchYear),
            ("cgpa", StudentField::Cgpa),
            ("gpa", StudentField::Cgpa),
            ("cpi", StudentField::Cgpa),
            ("aggregate", StudentField::Cgpa),
            ("aggregate cgpa", StudentField::Cgpa),
            ("backlogs", StudentField::Backlogs),
            ("no of backlogs", StudentField::Backlogs),
            ("active backlogs", StudentField::Backlogs),
            ("arrears", StudentField::Backlogs),
            // Extras
            ("skills", StudentField::Skills),
            ("skill set", StudentField::Skills),
            ("key skills", StudentField::Skills),
            ("resume", StudentField::ResumeUrl),
            ("resume url", StudentField::ResumeUrl),
            ("resume link", StudentField::ResumeUrl),
            ("cv link", StudentField::ResumeUrl),
        ];

        let mut map = HashMap::with_capacity(ALIASES.len());
        for (alias, field) in ALIASES {
            map.insert(normalize_header(alias), *field);
        }
        map
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize_header("  Roll   No.  "), "roll no");
        assert_eq!(normalize_header("E-Mail ID"), "e mail id");
        assert_eq!(normalize_header("\u{feff}CGPA"), "cgpa");
    }

    #[test]
    fn common_variants_resolve() {
        assert_eq!(field_for_header("Roll No."), Some(StudentField::RollNo));
        assert_eq!(field_for_header("REG NO"), Some(StudentField::RollNo));
        assert_eq!(field_for_header("Student Name"), Some(StudentField::FullName));
        assert_eq!(field_for_header("Dept."), Some(StudentField::Branch));
        assert_eq!(field_for_header("Year of Passing"), Some(StudentField::BatchYear));
        assert_eq!(field_for_header("Aggregate CGPA"), Some(StudentField::Cgpa));
        assert_eq!(field_for_header("No. of Backlogs"), Some(StudentField::Backlogs));
    }

    #[test]
    fn unknown_headers_are_ignored() {
        assert_eq!(field_for_header("Favourite Colour"), None);
    }
}
