//! Spreadsheet import/export
//!
//! Bulk student uploads arrive as loosely-structured CSV or XLSX sheets.
//! The parsers map whatever headers the sheet carries onto the student
//! schema, report bad rows instead of failing the upload, and hand clean
//! records to the route layer. Export produces CSV and XLSX reports.

pub mod export;
pub mod headers;
pub mod students;

pub use students::{parse_csv, parse_xlsx, ParsedSheet, RowError, StudentImportRow};
