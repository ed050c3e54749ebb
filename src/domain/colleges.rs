//! College profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// College profile response
#[derive(Debug, Clone, Serialize)]
pub struct CollegeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
    pub placement_officer: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Update college profile (owner only, partial)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCollegeInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
    pub placement_officer: Option<String>,
}

/// College filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollegeQuery {
    pub city: Option<String>,
    pub search: Option<String>,
}
