//! Admin domain types
//!
//! Dashboard statistics, account approval queue and the activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform-wide dashboard statistics
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub colleges: i64,
    pub companies: i64,
    pub agencies: i64,
    pub students: i64,
    pub placed_students: i64,
    pub jobs: i64,
    pub open_jobs: i64,
    pub applications: i64,
    pub pending_accounts: i64,
}

/// Account summary for the approval queue
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub status: String,
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AccountQuery {
    pub status: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
}

/// Reject an account with a reason shown to the applicant
#[derive(Debug, Clone, Deserialize)]
pub struct RejectAccountInput {
    pub reason: String,
}

/// Activity feed entry
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}
