//! Job posting routes
//!
//! Companies create and manage placement drives; colleges and agencies
//! browse them and check which of their students qualify.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::jobs::{
    CreateJobInput, EligibilityRules, JobQuery, JobResponse, JobStatus, UpdateJobInput,
};
use crate::domain::students::StudentQuery;
use crate::domain::users::UserRole;
use crate::error::ApiError;
use crate::routes::{company_id_for_user, decimal_to_f64};
use crate::services::activity;

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    company_id: Uuid,
    company_name: String,
    title: String,
    description: Option<String>,
    job_type: Option<String>,
    location: Option<String>,
    ctc: sqlx::types::Decimal,
    openings: i32,
    min_cgpa: sqlx::types::Decimal,
    max_backlogs: i32,
    branches: serde_json::Value,
    batch_year: i32,
    status: String,
    application_deadline: Option<DateTime<Utc>>,
    applications_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobResponse {
    fn from(r: JobRow) -> Self {
        let branches: Vec<String> = serde_json::from_value(r.branches).unwrap_or_default();
        Self {
            id: r.id,
            company_id: r.company_id,
            company_name: r.company_name,
            title: r.title,
            description: r.description,
            job_type: r.job_type,
            location: r.location,
            ctc: decimal_to_f64(r.ctc),
            openings: r.openings,
            min_cgpa: decimal_to_f64(r.min_cgpa),
            max_backlogs: r.max_backlogs,
            branches,
            batch_year: r.batch_year,
            status: r.status,
            application_deadline: r.application_deadline,
            applications_count: r.applications_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const JOB_SELECT: &str = r#"
    SELECT j.id, j.company_id, c.name AS company_name, j.title, j.description,
           j.job_type, j.location, j.ctc, j.openings, j.min_cgpa, j.max_backlogs,
           j.branches, j.batch_year, j.status, j.application_deadline,
           (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS applications_count,
           j.created_at, j.updated_at
    FROM jobs j
    JOIN companies c ON j.company_id = c.id
"#;

// ============================================================================
// CRUD
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct JobQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: JobQuery,
}

/// GET /jobs
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobQueryParams>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM jobs j
        JOIN companies c ON j.company_id = c.id
        WHERE ($1::text IS NULL OR j.status = $1)
        AND ($2::uuid IS NULL OR j.company_id = $2)
        AND ($3::text IS NULL OR j.location ILIKE '%' || $3 || '%')
        AND ($4::numeric IS NULL OR j.ctc >= $4)
        AND ($5::int IS NULL OR j.batch_year = $5)
        AND ($6::text IS NULL OR j.title ILIKE '%' || $6 || '%' OR c.name ILIKE '%' || $6 || '%')
        "#,
    )
    .bind(&query.filter.status)
    .bind(query.filter.company_id)
    .bind(&query.filter.location)
    .bind(query.filter.min_ctc)
    .bind(query.filter.batch_year)
    .bind(&query.filter.search)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, JobRow>(&format!(
        r#"{JOB_SELECT}
        WHERE ($1::text IS NULL OR j.status = $1)
        AND ($2::uuid IS NULL OR j.company_id = $2)
        AND ($3::text IS NULL OR j.location ILIKE '%' || $3 || '%')
        AND ($4::numeric IS NULL OR j.ctc >= $4)
        AND ($5::int IS NULL OR j.batch_year = $5)
        AND ($6::text IS NULL OR j.title ILIKE '%' || $6 || '%' OR c.name ILIKE '%' || $6 || '%')
        ORDER BY j.created_at DESC
        LIMIT $7 OFFSET $8
        "#
    ))
    .bind(&query.filter.status)
    .bind(query.filter.company_id)
    .bind(&query.filter.location)
    .bind(query.filter.min_ctc)
    .bind(query.filter.batch_year)
    .bind(&query.filter.search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<JobResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// POST /jobs (company only)
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(input): Json<CreateJobInput>,
) -> Result<impl IntoResponse, ApiError> {
    if auth.role != UserRole::Company {
        return Err(ApiError::forbidden("Only companies can post jobs"));
    }
    let company_id = company_id_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;

    if input.title.trim().is_empty() {
        return Err(ApiError::bad_request("Job title is required"));
    }
    if input.ctc < 0.0 {
        return Err(ApiError::bad_request("CTC cannot be negative"));
    }
    if input.openings < 1 {
        return Err(ApiError::bad_request("At least one opening is required"));
    }
    if !(0.0..=10.0).contains(&input.min_cgpa) {
        return Err(ApiError::bad_request("Minimum CGPA must be between 0 and 10"));
    }

    let id = Uuid::new_v4();
    let branches = serde_json::to_value(&input.branches).unwrap_or(serde_json::json!([]));

    sqlx::query(
        r#"
        INSERT INTO jobs (
            id, company_id, title, description, job_type, location, ctc, openings,
            min_cgpa, max_backlogs, branches, batch_year, status, application_deadline
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'open', $13)
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&input.job_type)
    .bind(&input.location)
    .bind(input.ctc)
    .bind(input.openings)
    .bind(input.min_cgpa)
    .bind(input.max_backlogs)
    .bind(&branches)
    .bind(input.batch_year)
    .bind(input.application_deadline)
    .execute(&state.db)
    .await?;

    activity::record(
        &state.db,
        Some(auth.user_id),
        "job_posted",
        "job",
        Some(id),
        Some(input.title.trim()),
    )
    .await;

    Ok(Created(serde_json::json!({ "id": id, "success": true })))
}

/// GET /jobs/:id
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} WHERE j.id = $1"))
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(Json(DataResponse::new(JobResponse::from(row))))
}

/// PUT /jobs/:id (owner only, open jobs only)
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateJobInput>,
) -> Result<impl IntoResponse, ApiError> {
    let company_id = company_id_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;

    if let Some(cgpa) = input.min_cgpa {
        if !(0.0..=10.0).contains(&cgpa) {
            return Err(ApiError::bad_request("Minimum CGPA must be between 0 and 10"));
        }
    }

    let branches = input
        .branches
        .map(|b| serde_json::to_value(b).unwrap_or(serde_json::json!([])));

    let result = sqlx::query(
        r#"
        UPDATE jobs SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            job_type = COALESCE($3, job_type),
            location = COALESCE($4, location),
            ctc = COALESCE($5, ctc),
            openings = COALESCE($6, openings),
            min_cgpa = COALESCE($7, min_cgpa),
            max_backlogs = COALESCE($8, max_backlogs),
            branches = COALESCE($9, branches),
            batch_year = COALESCE($10, batch_year),
            application_deadline = COALESCE($11, application_deadline),
            updated_at = NOW()
        WHERE id = $12 AND company_id = $13 AND status = 'open'
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.job_type)
    .bind(&input.location)
    .bind(input.ctc)
    .bind(input.openings)
    .bind(input.min_cgpa)
    .bind(input.max_backlogs)
    .bind(branches)
    .bind(input.batch_year)
    .bind(input.application_deadline)
    .bind(job_id)
    .bind(company_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Job not found or already closed"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /jobs/:id/close (owner only)
///
/// Closing a job also expires its pending invitations.
pub async fn close_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let company_id = company_id_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;

    let result = sqlx::query(
        "UPDATE jobs SET status = 'closed', updated_at = NOW() WHERE id = $1 AND company_id = $2 AND status = 'open'",
    )
    .bind(job_id)
    .bind(company_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Job not found or already closed"));
    }

    sqlx::query(
        "UPDATE invitations SET status = 'expired', responded_at = NOW() WHERE job_id = $1 AND status = 'pending'",
    )
    .bind(job_id)
    .execute(&state.db)
    .await?;

    activity::record(
        &state.db,
        Some(auth.user_id),
        "job_closed",
        "job",
        Some(job_id),
        None,
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "status": JobStatus::Closed.to_string() })))
}

// ============================================================================
// Eligibility
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct EligibilityRow {
    min_cgpa: sqlx::types::Decimal,
    max_backlogs: i32,
    branches: serde_json::Value,
    batch_year: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: Uuid,
    roll_no: String,
    first_name: String,
    last_name: Option<String>,
    branch: String,
    batch_year: i32,
    cgpa: sqlx::types::Decimal,
    backlogs: i32,
    placed: bool,
}

/// GET /jobs/:id/eligible-students
///
/// List the caller's students that satisfy the job's eligibility rules.
pub async fn list_eligible_students(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    Query(filter): Query<StudentQuery>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.role.manages_students() {
        return Err(ApiError::forbidden(
            "Only colleges and agencies can check eligibility",
        ));
    }

    let (college_id, agency_id) = match auth.role {
        UserRole::College => {
            let id = crate::routes::college_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No college profile for this account"))?;
            (Some(id), None)
        }
        _ => {
            let id = crate::routes::agency_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No agency profile for this account"))?;
            (None, Some(id))
        }
    };

    let job = sqlx::query_as::<_, EligibilityRow>(
        "SELECT min_cgpa, max_backlogs, branches, batch_year FROM jobs WHERE id = $1",
    )
    .bind(job_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let rules = EligibilityRules {
        min_cgpa: job.min_cgpa,
        max_backlogs: job.max_backlogs,
        branches: serde_json::from_value(job.branches).unwrap_or_default(),
        batch_year: job.batch_year,
    };

    let candidates = sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT id, roll_no, first_name, last_name, branch, batch_year, cgpa, backlogs, placed
        FROM students
        WHERE ($1::uuid IS NULL OR college_id = $1)
        AND ($2::uuid IS NULL OR agency_id = $2)
        AND ($3::text IS NULL OR branch ILIKE $3)
        AND placed = false
        ORDER BY roll_no
        "#,
    )
    .bind(college_id)
    .bind(agency_id)
    .bind(&filter.branch)
    .fetch_all(&state.db)
    .await?;

    let eligible: Vec<serde_json::Value> = candidates
        .into_iter()
        .filter(|c| rules.allows(c.cgpa, c.backlogs, &c.branch, c.batch_year))
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "roll_no": c.roll_no,
                "name": match &c.last_name {
                    Some(last) => format!("{} {}", c.first_name, last),
                    None => c.first_name.clone(),
                },
                "branch": c.branch,
                "batch_year": c.batch_year,
                "cgpa": decimal_to_f64(c.cgpa),
                "backlogs": c.backlogs,
                "placed": c.placed,
            })
        })
        .collect();

    Ok(Json(DataResponse::new(eligible)))
}

/// Fetch a job's eligibility rules plus lifecycle fields for application checks
pub(crate) async fn job_for_application(
    db: &sqlx::PgPool,
    job_id: Uuid,
) -> Result<Option<(EligibilityRules, JobStatus, Option<DateTime<Utc>>, Uuid, String)>, ApiError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        min_cgpa: sqlx::types::Decimal,
        max_backlogs: i32,
        branches: serde_json::Value,
        batch_year: i32,
        status: String,
        application_deadline: Option<DateTime<Utc>>,
        company_id: Uuid,
        title: String,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT min_cgpa, max_backlogs, branches, batch_year, status,
               application_deadline, company_id, title
        FROM jobs WHERE id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|r| {
        let rules = EligibilityRules {
            min_cgpa: r.min_cgpa,
            max_backlogs: r.max_backlogs,
            branches: serde_json::from_value(r.branches).unwrap_or_default(),
            batch_year: r.batch_year,
        };
        let status = JobStatus::parse(&r.status).unwrap_or(JobStatus::Closed);
        (rules, status, r.application_deadline, r.company_id, r.title)
    }))
}
