//! Student record types
//!
//! Students are records owned by a college (optionally linked to a recruitment
//! agency), not login actors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Student record response
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub college_id: Uuid,
    pub agency_id: Option<Uuid>,
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
    pub placed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create student record
///
/// `college_id` is required when an agency registers a student it sourced;
/// college callers always create within their own college.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentInput {
    pub college_id: Option<Uuid>,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub branch: String,
    pub batch_year: i32,
    pub cgpa: f64,
    #[serde(default)]
    pub backlogs: i32,
    #[serde(default)]
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
}

/// Update student record (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudentInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub batch_year: Option<i32>,
    pub cgpa: Option<f64>,
    pub backlogs: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub placed: Option<bool>,
}

/// Student filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StudentQuery {
    pub branch: Option<String>,
    pub batch_year: Option<i32>,
    pub min_cgpa: Option<f64>,
    pub placed: Option<bool>,
    pub search: Option<String>,
}
