//! Company profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Company profile response
#[derive(Debug, Clone, Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub verified: bool,
    pub open_jobs: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Update company profile (owner only, partial)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompanyInput {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
}

/// Company filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompanyQuery {
    pub industry: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
}
