//! Application routes
//!
//! One student, one job, one row. Companies move applications through their
//! pipeline; the student side (college or agency) submits, accepts offers
//! and withdraws. Every transition is validated against the lifecycle table
//! in `domain::applications`.

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
use crate::domain::applications::{
    allowed_transition, ApplicationQuery, ApplicationResponse, ApplicationStatus, ApplyInput,
    StatusUpdateInput, TransitionActor,
};
use crate::domain::users::UserRole;
use crate::error::ApiError;
use crate::routes::jobs::job_for_application;
use crate::routes::{
    agency_id_for_user, college_id_for_user, company_id_for_user, is_unique_violation,
};
use crate::services::{activity, email, notifications, platform};

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    job_title: String,
    company_id: Uuid,
    company_name: String,
    student_id: Uuid,
    student_name: String,
    student_roll_no: String,
    college_id: Uuid,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicationResponse {
    fn from(r: ApplicationRow) -> Self {
        Self {
            id: r.id,
            job_id: r.job_id,
            job_title: r.job_title,
            company_id: r.company_id,
            company_name: r.company_name,
            student_id: r.student_id,
            student_name: r.student_name,
            student_roll_no: r.student_roll_no,
            college_id: r.college_id,
            status: r.status,
            note: r.note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.job_id, j.title AS job_title, j.company_id, co.name AS company_name,
           a.student_id, TRIM(s.first_name || ' ' || COALESCE(s.last_name, '')) AS student_name,
           s.roll_no AS student_roll_no, s.college_id,
           a.status, a.note, a.created_at, a.updated_at
    FROM applications a
    JOIN jobs j ON a.job_id = j.id
    JOIN companies co ON j.company_id = co.id
    JOIN students s ON a.student_id = s.id
"#;

/// Parties interested in one application's fate
#[derive(Debug, sqlx::FromRow)]
struct ApplicationParties {
    company_user_id: Uuid,
    college_user_id: Uuid,
    college_user_email: String,
    agency_user_id: Option<Uuid>,
    student_email: Option<String>,
    student_college_id: Uuid,
    student_agency_id: Option<Uuid>,
}

async fn load_parties(
    db: &sqlx::PgPool,
    application_id: Uuid,
) -> Result<Option<ApplicationParties>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationParties>(
        r#"
        SELECT co.user_id AS company_user_id,
               cl.user_id AS college_user_id,
               cu.email AS college_user_email,
               ag.user_id AS agency_user_id,
               s.email AS student_email,
               s.college_id AS student_college_id,
               s.agency_id AS student_agency_id
        FROM applications a
        JOIN jobs j ON a.job_id = j.id
        JOIN companies co ON j.company_id = co.id
        JOIN students s ON a.student_id = s.id
        JOIN colleges cl ON s.college_id = cl.id
        JOIN users cu ON cl.user_id = cu.id
        LEFT JOIN agencies ag ON s.agency_id = ag.id
        WHERE a.id = $1
        "#,
    )
    .bind(application_id)
    .fetch_optional(db)
    .await
}

// ============================================================================
// Submit
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ApplicantRow {
    college_id: Uuid,
    agency_id: Option<Uuid>,
    first_name: String,
    last_name: Option<String>,
    branch: String,
    batch_year: i32,
    cgpa: sqlx::types::Decimal,
    backlogs: i32,
    placed: bool,
}

/// POST /jobs/:job_id/applications
///
/// Submit a student's application for a job. The student must be in the
/// caller's roster and satisfy the job's eligibility rules.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<ApplyInput>,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.role.manages_students() {
        return Err(ApiError::forbidden(
            "Only colleges and agencies submit applications",
        ));
    }

    let settings = platform::load(&state.db).await;
    if !settings.applications_open {
        return Err(ApiError::forbidden("Applications are currently closed"));
    }

    let student = sqlx::query_as::<_, ApplicantRow>(
        r#"
        SELECT college_id, agency_id, first_name, last_name, branch, batch_year,
               cgpa, backlogs, placed
        FROM students WHERE id = $1
        "#,
    )
    .bind(input.student_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Student not found"))?;

    // The caller must manage this student
    let manages = match auth.role {
        UserRole::College => {
            college_id_for_user(&state.db, auth.user_id).await? == Some(student.college_id)
        }
        UserRole::Agency => {
            let agency_id = agency_id_for_user(&state.db, auth.user_id).await?;
            agency_id.is_some() && agency_id == student.agency_id
        }
        _ => false,
    };
    if !manages {
        return Err(ApiError::forbidden("This student is not in your roster"));
    }

    if student.placed {
        return Err(ApiError::conflict("This student is already placed"));
    }

    let (rules, status, deadline, _company_id, job_title) =
        job_for_application(&state.db, job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if status != crate::domain::jobs::JobStatus::Open {
        return Err(ApiError::bad_request("This job is no longer accepting applications"));
    }
    if let Some(deadline) = deadline {
        if deadline < Utc::now() {
            return Err(ApiError::bad_request("The application deadline has passed"));
        }
    }
    if !rules.allows(
        student.cgpa,
        student.backlogs,
        &student.branch,
        student.batch_year,
    ) {
        return Err(ApiError::bad_request(
            "This student does not meet the job's eligibility criteria",
        ));
    }

    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO applications (id, job_id, student_id, status)
        VALUES ($1, $2, $3, 'applied')
        "#,
    )
    .bind(id)
    .bind(job_id)
    .bind(input.student_id)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(ApiError::conflict("This student has already applied to this job"));
        }
        return Err(e.into());
    }

    let student_name = match &student.last_name {
        Some(last) => format!("{} {}", student.first_name, last),
        None => student.first_name.clone(),
    };

    if let Some(parties) = load_parties(&state.db, id).await? {
        notifications::notify_application_received(
            &state.db,
            parties.company_user_id,
            id,
            &job_title,
            &student_name,
        )
        .await
        .ok();
    }

    activity::record(
        &state.db,
        Some(auth.user_id),
        "application_submitted",
        "application",
        Some(id),
        Some(&format!("{} -> {}", student_name, job_title)),
    )
    .await;

    Ok(Created(serde_json::json!({ "id": id, "status": "applied", "success": true })))
}

// ============================================================================
// List / Get
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApplicationQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: ApplicationQuery,
}

/// GET /applications
///
/// Role-scoped listing: companies see applications to their jobs, colleges
/// and agencies see their students' applications, the super admin sees all.
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ApplicationQueryParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (company_id, college_id, agency_id) = scope_ids(&state, &auth).await?;
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM applications a
        JOIN jobs j ON a.job_id = j.id
        JOIN students s ON a.student_id = s.id
        WHERE ($1::uuid IS NULL OR j.company_id = $1)
        AND ($2::uuid IS NULL OR s.college_id = $2)
        AND ($3::uuid IS NULL OR s.agency_id = $3)
        AND ($4::uuid IS NULL OR a.job_id = $4)
        AND ($5::uuid IS NULL OR a.student_id = $5)
        AND ($6::text IS NULL OR a.status = $6)
        "#,
    )
    .bind(company_id)
    .bind(college_id)
    .bind(agency_id)
    .bind(query.filter.job_id)
    .bind(query.filter.student_id)
    .bind(&query.filter.status)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
        r#"{APPLICATION_SELECT}
        WHERE ($1::uuid IS NULL OR j.company_id = $1)
        AND ($2::uuid IS NULL OR s.college_id = $2)
        AND ($3::uuid IS NULL OR s.agency_id = $3)
        AND ($4::uuid IS NULL OR a.job_id = $4)
        AND ($5::uuid IS NULL OR a.student_id = $5)
        AND ($6::text IS NULL OR a.status = $6)
        ORDER BY a.updated_at DESC
        LIMIT $7 OFFSET $8
        "#
    ))
    .bind(company_id)
    .bind(college_id)
    .bind(agency_id)
    .bind(query.filter.job_id)
    .bind(query.filter.student_id)
    .bind(&query.filter.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<ApplicationResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// Scope binds for the caller's role; super admin scopes to nothing
async fn scope_ids(
    state: &AppState,
    auth: &RequireAuth,
) -> Result<(Option<Uuid>, Option<Uuid>, Option<Uuid>), ApiError> {
    match auth.role {
        UserRole::SuperAdmin => Ok((None, None, None)),
        UserRole::Company => {
            let id = company_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;
            Ok((Some(id), None, None))
        }
        UserRole::College => {
            let id = college_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No college profile for this account"))?;
            Ok((None, Some(id), None))
        }
        UserRole::Agency => {
            let id = agency_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No agency profile for this account"))?;
            Ok((None, None, Some(id)))
        }
    }
}

/// GET /applications/:id
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, ApplicationRow>(&format!(
        "{APPLICATION_SELECT} WHERE a.id = $1"
    ))
    .bind(application_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Application not found"))?;

    // Access check against the caller's scope
    let (company_id, college_id, agency_id) = scope_ids(&state, &auth).await?;
    let parties = load_parties(&state.db, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let allowed = match auth.role {
        UserRole::SuperAdmin => true,
        UserRole::Company => company_id == Some(row.company_id),
        UserRole::College => college_id == Some(parties.student_college_id),
        UserRole::Agency => agency_id.is_some() && agency_id == parties.student_agency_id,
    };
    if !allowed {
        return Err(ApiError::forbidden("You don't have access to this application"));
    }

    Ok(Json(DataResponse::new(ApplicationResponse::from(row))))
}

// ============================================================================
// Transitions
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TransitionRow {
    status: String,
    company_id: Uuid,
    student_id: Uuid,
    student_college_id: Uuid,
    student_agency_id: Option<Uuid>,
    job_title: String,
    company_name: String,
    student_name: String,
}

async fn load_for_transition(
    db: &sqlx::PgPool,
    application_id: Uuid,
) -> Result<Option<TransitionRow>, sqlx::Error> {
    sqlx::query_as::<_, TransitionRow>(
        r#"
        SELECT a.status, j.company_id, a.student_id,
               s.college_id AS student_college_id, s.agency_id AS student_agency_id,
               j.title AS job_title, co.name AS company_name,
               TRIM(s.first_name || ' ' || COALESCE(s.last_name, '')) AS student_name
        FROM applications a
        JOIN jobs j ON a.job_id = j.id
        JOIN companies co ON j.company_id = co.id
        JOIN students s ON a.student_id = s.id
        WHERE a.id = $1
        "#,
    )
    .bind(application_id)
    .fetch_optional(db)
    .await
}

/// POST /applications/:id/status
///
/// Move an application along the lifecycle. The actor (company vs student
/// side) is derived from the caller's role, and the move is validated
/// against the transition table.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<StatusUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    let row = load_for_transition(&state.db, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let current = ApplicationStatus::parse(&row.status)
        .ok_or_else(|| ApiError::internal(format!("Unknown status '{}' on application", row.status)))?;
    let target = ApplicationStatus::parse(&input.status)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown status '{}'", input.status)))?;

    // Derive the actor from the caller's relationship to the application
    let actor = match auth.role {
        UserRole::Company => {
            let company_id = company_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;
            if company_id != row.company_id {
                return Err(ApiError::forbidden("You don't have access to this application"));
            }
            TransitionActor::Company
        }
        UserRole::College => {
            let college_id = college_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No college profile for this account"))?;
            if college_id != row.student_college_id {
                return Err(ApiError::forbidden("You don't have access to this application"));
            }
            TransitionActor::Candidate
        }
        UserRole::Agency => {
            let agency_id = agency_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No agency profile for this account"))?;
            if Some(agency_id) != row.student_agency_id {
                return Err(ApiError::forbidden("You don't have access to this application"));
            }
            TransitionActor::Candidate
        }
        UserRole::SuperAdmin => {
            return Err(ApiError::forbidden(
                "Administrators do not move applications",
            ));
        }
    };

    if !allowed_transition(current, target, actor) {
        return Err(ApiError::bad_request(format!(
            "Cannot transition from '{}' to '{}'",
            current, target
        )));
    }

    sqlx::query(
        "UPDATE applications SET status = $1, note = COALESCE($2, note), updated_at = NOW() WHERE id = $3",
    )
    .bind(target.to_string())
    .bind(&input.note)
    .bind(application_id)
    .execute(&state.db)
    .await?;

    // Hired students come off the market
    if target == ApplicationStatus::Hired {
        sqlx::query("UPDATE students SET placed = true, updated_at = NOW() WHERE id = $1")
            .bind(row.student_id)
            .execute(&state.db)
            .await?;
    }

    notify_transition(&state, application_id, &row, target, actor).await;

    activity::record(
        &state.db,
        Some(auth.user_id),
        "application_status_changed",
        "application",
        Some(application_id),
        Some(&format!("{} -> {}", current, target)),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "status": target.to_string() })))
}

/// POST /applications/:id/withdraw
///
/// Student-side exit from the pipeline.
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.role.manages_students() {
        return Err(ApiError::forbidden("Only the student side can withdraw"));
    }

    let row = load_for_transition(&state.db, application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let manages = match auth.role {
        UserRole::College => {
            college_id_for_user(&state.db, auth.user_id).await? == Some(row.student_college_id)
        }
        _ => {
            let agency_id = agency_id_for_user(&state.db, auth.user_id).await?;
            agency_id.is_some() && agency_id == row.student_agency_id
        }
    };
    if !manages {
        return Err(ApiError::forbidden("You don't have access to this application"));
    }

    let current = ApplicationStatus::parse(&row.status)
        .ok_or_else(|| ApiError::internal(format!("Unknown status '{}' on application", row.status)))?;

    if !allowed_transition(current, ApplicationStatus::Withdrawn, TransitionActor::Candidate) {
        return Err(ApiError::bad_request(format!(
            "Cannot withdraw an application in status '{}'",
            current
        )));
    }

    sqlx::query("UPDATE applications SET status = 'withdrawn', updated_at = NOW() WHERE id = $1")
        .bind(application_id)
        .execute(&state.db)
        .await?;

    if let Some(parties) = load_parties(&state.db, application_id).await? {
        notifications::notify_application_withdrawn(
            &state.db,
            parties.company_user_id,
            application_id,
            &row.student_name,
            &row.job_title,
        )
        .await
        .ok();
    }

    activity::record(
        &state.db,
        Some(auth.user_id),
        "application_withdrawn",
        "application",
        Some(application_id),
        Some(&row.student_name),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "status": "withdrawn" })))
}

/// In-app and email fan-out after a status change
async fn notify_transition(
    state: &AppState,
    application_id: Uuid,
    row: &TransitionRow,
    target: ApplicationStatus,
    actor: TransitionActor,
) {
    let parties = match load_parties(&state.db, application_id).await {
        Ok(Some(parties)) => parties,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load notification recipients");
            return;
        }
    };

    let status_str = target.to_string();

    match actor {
        // Company moved the application: tell the student side
        TransitionActor::Company => {
            notifications::notify_application_status(
                &state.db,
                parties.college_user_id,
                application_id,
                &row.student_name,
                &row.job_title,
                &status_str,
            )
            .await
            .ok();

            if let Some(agency_user_id) = parties.agency_user_id {
                notifications::notify_application_status(
                    &state.db,
                    agency_user_id,
                    application_id,
                    &row.student_name,
                    &row.job_title,
                    &status_str,
                )
                .await
                .ok();
            }
        }
        // Student side accepted the offer: tell the company
        TransitionActor::Candidate => {
            notifications::notify_application_status(
                &state.db,
                parties.company_user_id,
                application_id,
                &row.student_name,
                &row.job_title,
                &status_str,
            )
            .await
            .ok();
        }
    }

    let settings = platform::load(&state.db).await;
    if settings.email_enabled {
        let (subject, body) = email::application_status_changed(
            &state.settings.service_name,
            &row.student_name,
            &row.job_title,
            &row.company_name,
            &status_str,
        );
        let recipient = parties
            .student_email
            .as_deref()
            .unwrap_or(&parties.college_user_email);
        state.mailer.send(recipient, &subject, body);
    }
}
