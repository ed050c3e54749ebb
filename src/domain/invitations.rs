//! Invitation types
//!
//! An invitation is a company-initiated recruitment offer to a student who
//! has not applied to the job. At most one invitation exists per
//! (student, job, company) triple.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invitation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "pending"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Declined => write!(f, "declined"),
            InvitationStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Invitation response
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_roll_no: String,
    pub college_id: Uuid,
    pub message: Option<String>,
    pub status: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Create invitation (company only)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationInput {
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub message: Option<String>,
}

/// Respond to an invitation (student side)
#[derive(Debug, Clone, Deserialize)]
pub struct RespondInvitationInput {
    pub accept: bool,
}

/// Invitation filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InvitationQuery {
    pub job_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub status: Option<String>,
}
