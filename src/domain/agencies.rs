//! Recruitment agency profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Agency profile response
#[derive(Debug, Clone, Serialize)]
pub struct AgencyResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Update agency profile (owner only, partial)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAgencyInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub about: Option<String>,
}
