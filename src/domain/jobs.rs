//! Job posting types
//!
//! A job is a company's placement drive: a posting with eligibility rules
//! that students must satisfy before an application is accepted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job posting status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Closed,
}

impl JobStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Open => write!(f, "open"),
            JobStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Eligibility rules attached to a job posting.
///
/// An empty `branches` list means every branch qualifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRules {
    pub min_cgpa: Decimal,
    pub max_backlogs: i32,
    pub branches: Vec<String>,
    pub batch_year: i32,
}

impl EligibilityRules {
    /// Whether a student with the given academics qualifies for this job
    pub fn allows(&self, cgpa: Decimal, backlogs: i32, branch: &str, batch_year: i32) -> bool {
        if batch_year != self.batch_year {
            return false;
        }
        if cgpa < self.min_cgpa {
            return false;
        }
        if backlogs > self.max_backlogs {
            return false;
        }
        if self.branches.is_empty() {
            return true;
        }
        self.branches
            .iter()
            .any(|b| b.eq_ignore_ascii_case(branch))
    }
}

/// Job posting response
#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub title: String,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc: f64,
    pub openings: i32,
    pub min_cgpa: f64,
    pub max_backlogs: i32,
    pub branches: Vec<String>,
    pub batch_year: i32,
    pub status: String,
    pub application_deadline: Option<DateTime<Utc>>,
    pub applications_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create job posting
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobInput {
    pub title: String,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc: f64,
    #[serde(default = "default_openings")]
    pub openings: i32,
    #[serde(default)]
    pub min_cgpa: f64,
    #[serde(default = "default_max_backlogs")]
    pub max_backlogs: i32,
    #[serde(default)]
    pub branches: Vec<String>,
    pub batch_year: i32,
    pub application_deadline: Option<DateTime<Utc>>,
}

fn default_openings() -> i32 {
    1
}

fn default_max_backlogs() -> i32 {
    i32::MAX
}

/// Update job posting (owner only, partial)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateJobInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc: Option<f64>,
    pub openings: Option<i32>,
    pub min_cgpa: Option<f64>,
    pub max_backlogs: Option<i32>,
    pub branches: Option<Vec<String>>,
    pub batch_year: Option<i32>,
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Job filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JobQuery {
    pub status: Option<String>,
    pub company_id: Option<Uuid>,
    pub location: Option<String>,
    pub min_ctc: Option<f64>,
    pub batch_year: Option<i32>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn rules() -> EligibilityRules {
        EligibilityRules {
            min_cgpa: Decimal::new(70, 1), // 7.0
            max_backlogs: 1,
            branches: vec!["CSE".to_string(), "ECE".to_string()],
            batch_year: 2026,
        }
    }

    #[test]
    fn qualifying_student_passes() {
        assert!(rules().allows(Decimal::new(82, 1), 0, "cse", 2026));
    }

    #[test]
    fn cgpa_below_cutoff_fails() {
        assert!(!rules().allows(Decimal::new(69, 1), 0, "CSE", 2026));
    }

    #[test]
    fn boundary_cgpa_passes() {
        assert!(rules().allows(Decimal::new(70, 1), 0, "CSE", 2026));
    }

    #[test]
    fn too_many_backlogs_fails() {
        assert!(!rules().allows(Decimal::new(90, 1), 2, "CSE", 2026));
    }

    #[test]
    fn wrong_branch_fails() {
        assert!(!rules().allows(Decimal::new(90, 1), 0, "MECH", 2026));
    }

    #[test]
    fn wrong_batch_fails() {
        assert!(!rules().allows(Decimal::new(90, 1), 0, "CSE", 2025));
    }

    #[test]
    fn empty_branches_allows_all() {
        let mut rules = rules();
        rules.branches.clear();
        assert!(rules.allows(Decimal::new(75, 1), 0, "CIVIL", 2026));
    }
}
