//! Application lifecycle types
//!
//! An application tracks one student through one job's pipeline. Status moves
//! only along the transition table below; `hired`, `rejected` and `withdrawn`
//! are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    Offered,
    OfferAccepted,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(Self::Applied),
            "under_review" => Some(Self::UnderReview),
            "shortlisted" => Some(Self::Shortlisted),
            "interview_scheduled" => Some(Self::InterviewScheduled),
            "interviewed" => Some(Self::Interviewed),
            "offered" => Some(Self::Offered),
            "offer_accepted" => Some(Self::OfferAccepted),
            "hired" => Some(Self::Hired),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Hired | Self::Rejected | Self::Withdrawn)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Applied => write!(f, "applied"),
            ApplicationStatus::UnderReview => write!(f, "under_review"),
            ApplicationStatus::Shortlisted => write!(f, "shortlisted"),
            ApplicationStatus::InterviewScheduled => write!(f, "interview_scheduled"),
            ApplicationStatus::Interviewed => write!(f, "interviewed"),
            ApplicationStatus::Offered => write!(f, "offered"),
            ApplicationStatus::OfferAccepted => write!(f, "offer_accepted"),
            ApplicationStatus::Hired => write!(f, "hired"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
            ApplicationStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// Which side of the pipeline is requesting a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    /// The company that owns the job
    Company,
    /// The student side (their college or agency acting for them)
    Candidate,
}

/// Status transition table for the application lifecycle.
///
/// The company moves candidates forward through its pipeline and can reject
/// at any pre-terminal stage. The candidate side can accept an offer or
/// withdraw at any pre-terminal stage.
pub fn allowed_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
    actor: TransitionActor,
) -> bool {
    use ApplicationStatus::*;
    use TransitionActor::*;

    match (from, to, actor) {
        (Applied, UnderReview, Company) => true,
        (Applied, Shortlisted, Company) => true,
        (UnderReview, Shortlisted, Company) => true,
        (Shortlisted, InterviewScheduled, Company) => true,
        (InterviewScheduled, Interviewed, Company) => true,
        (Interviewed, Offered, Company) => true,
        (Offered, OfferAccepted, Candidate) => true,
        (OfferAccepted, Hired, Company) => true,
        (from, Rejected, Company) => !from.is_terminal(),
        (from, Withdrawn, Candidate) => !from.is_terminal() && from != OfferAccepted,
        _ => false,
    }
}

/// Application response
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_roll_no: String,
    pub college_id: Uuid,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submit an application for a student
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyInput {
    pub student_id: Uuid,
}

/// Company-side status transition
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateInput {
    pub status: String,
    pub note: Option<String>,
}

/// Application filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApplicationQuery {
    pub job_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::TransitionActor::*;
    use super::*;

    #[test]
    fn pipeline_moves_forward() {
        assert!(allowed_transition(Applied, UnderReview, Company));
        assert!(allowed_transition(Applied, Shortlisted, Company));
        assert!(allowed_transition(UnderReview, Shortlisted, Company));
        assert!(allowed_transition(Shortlisted, InterviewScheduled, Company));
        assert!(allowed_transition(InterviewScheduled, Interviewed, Company));
        assert!(allowed_transition(Interviewed, Offered, Company));
        assert!(allowed_transition(OfferAccepted, Hired, Company));
    }

    #[test]
    fn no_skipping_stages() {
        assert!(!allowed_transition(Applied, Interviewed, Company));
        assert!(!allowed_transition(Shortlisted, Offered, Company));
        assert!(!allowed_transition(Applied, Hired, Company));
    }

    #[test]
    fn offer_acceptance_is_candidate_side() {
        assert!(allowed_transition(Offered, OfferAccepted, Candidate));
        assert!(!allowed_transition(Offered, OfferAccepted, Company));
    }

    #[test]
    fn company_cannot_withdraw_candidate_cannot_reject() {
        assert!(!allowed_transition(Applied, Withdrawn, Company));
        assert!(!allowed_transition(Applied, Rejected, Candidate));
    }

    #[test]
    fn rejection_from_any_live_stage() {
        for from in [
            Applied,
            UnderReview,
            Shortlisted,
            InterviewScheduled,
            Interviewed,
            Offered,
            OfferAccepted,
        ] {
            assert!(allowed_transition(from, Rejected, Company), "{from}");
        }
    }

    #[test]
    fn withdrawal_stops_at_accepted_offer() {
        assert!(allowed_transition(Offered, Withdrawn, Candidate));
        assert!(!allowed_transition(OfferAccepted, Withdrawn, Candidate));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Hired, Rejected, Withdrawn] {
            for to in [
                Applied,
                UnderReview,
                Shortlisted,
                InterviewScheduled,
                Interviewed,
                Offered,
                OfferAccepted,
                Hired,
                Rejected,
                Withdrawn,
            ] {
                assert!(!allowed_transition(from, to, Company), "{from} -> {to}");
                assert!(!allowed_transition(from, to, Candidate), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn status_string_round_trip() {
        for status in [
            Applied,
            UnderReview,
            Shortlisted,
            InterviewScheduled,
            Interviewed,
            Offered,
            OfferAccepted,
            Hired,
            Rejected,
            Withdrawn,
        ] {
            assert_eq!(ApplicationStatus::parse(&status.to_string()), Some(status));
        }
    }
}
