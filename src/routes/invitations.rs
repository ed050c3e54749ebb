//! Invitation routes
//!
//! Companies reach out to students who have not applied. One invitation per
//! (student, job, company) triple; accepting creates an application.

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
use crate::domain::invitations::{
    CreateInvitationInput, InvitationQuery, InvitationResponse, InvitationStatus,
    RespondInvitationInput,
};
use crate::domain::users::UserRole;
use crate::error::ApiError;
use crate::routes::{
    agency_id_for_user, college_id_for_user, company_id_for_user, is_unique_violation,
};
use crate::services::{activity, email, notifications, platform};

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InvitationRow {
    id: Uuid,
    job_id: Uuid,
    job_title: String,
    company_id: Uuid,
    company_name: String,
    student_id: Uuid,
    student_name: String,
    student_roll_no: String,
    college_id: Uuid,
    message: Option<String>,
    status: String,
    responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<InvitationRow> for InvitationResponse {
    fn from(r: InvitationRow) -> Self {
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
            message: r.message,
            status: r.status,
            responded_at: r.responded_at,
            created_at: r.created_at,
        }
    }
}

const INVITATION_SELECT: &str = r#"
    SELECT i.id, i.job_id, j.title AS job_title, i.company_id, co.name AS company_name,
           i.student_id, TRIM(s.first_name || ' ' || COALESCE(s.last_name, '')) AS student_name,
           s.roll_no AS student_roll_no, s.college_id,
           i.message, i.status, i.responded_at, i.created_at
    FROM invitations i
    JOIN jobs j ON i.job_id = j.id
    JOIN companies co ON i.company_id = co.id
    JOIN students s ON i.student_id = s.id
"#;

// ============================================================================
// Create
// ============================================================================

/// POST /invitations (company only)
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(input): Json<CreateInvitationInput>,
) -> Result<impl IntoResponse, ApiError> {
    if auth.role != UserRole::Company {
        return Err(ApiError::forbidden("Only companies send invitations"));
    }
    let company_id = company_id_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;

    // The job must belong to the caller and still be open
    let job: Option<(String, String)> = sqlx::query_as(
        "SELECT title, status FROM jobs WHERE id = $1 AND company_id = $2",
    )
    .bind(input.job_id)
    .bind(company_id)
    .fetch_optional(&state.db)
    .await?;

    let (job_title, job_status) = job.ok_or_else(|| ApiError::not_found("Job not found"))?;
    if job_status != "open" {
        return Err(ApiError::bad_request("This job is closed"));
    }

    // Invitations target students who have not applied yet
    let already_applied: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND student_id = $2)",
    )
    .bind(input.job_id)
    .bind(input.student_id)
    .fetch_one(&state.db)
    .await?;
    if already_applied {
        return Err(ApiError::conflict("This student has already applied to this job"));
    }

    let student: Option<(String, Option<String>, Option<String>, Uuid, Option<Uuid>)> =
        sqlx::query_as(
            "SELECT first_name, last_name, email, college_id, agency_id FROM students WHERE id = $1",
        )
        .bind(input.student_id)
        .fetch_optional(&state.db)
        .await?;

    let (first_name, last_name, student_email, college_id, agency_id) =
        student.ok_or_else(|| ApiError::not_found("Student not found"))?;
    let student_name = match &last_name {
        Some(last) => format!("{} {}", first_name, last),
        None => first_name.clone(),
    };

    let id = Uuid::new_v4();
    let result = sqlx::query(
        r#"
        INSERT INTO invitations (id, job_id, student_id, company_id, message, status)
        VALUES ($1, $2, $3, $4, $5, 'pending')
        "#,
    )
    .bind(id)
    .bind(input.job_id)
    .bind(input.student_id)
    .bind(company_id)
    .bind(&input.message)
    .execute(&state.db)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(ApiError::conflict(
                "An invitation for this student and job already exists",
            ));
        }
        return Err(e.into());
    }

    let company_name: String = sqlx::query_scalar("SELECT name FROM companies WHERE id = $1")
        .bind(company_id)
        .fetch_one(&state.db)
        .await?;

    // Tell the student's managers
    let college_user: Option<(Uuid, String)> = sqlx::query_as(
        "SELECT u.id, u.email FROM colleges c JOIN users u ON c.user_id = u.id WHERE c.id = $1",
    )
    .bind(college_id)
    .fetch_optional(&state.db)
    .await?;

    if let Some((college_user_id, college_user_email)) = &college_user {
        notifications::notify_invitation_received(
            &state.db,
            *college_user_id,
            id,
            &company_name,
            &student_name,
            &job_title,
        )
        .await
        .ok();

        let settings = platform::load(&state.db).await;
        if settings.email_enabled {
            let (subject, body) = email::invitation_received(
                &state.settings.service_name,
                &student_name,
                &job_title,
                &company_name,
                input.message.as_deref(),
            );
            let recipient = student_email.as_deref().unwrap_or(college_user_email);
            state.mailer.send(recipient, &subject, body);
        }
    }

    if let Some(agency_id) = agency_id {
        let agency_user_id: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM agencies WHERE id = $1")
                .bind(agency_id)
                .fetch_optional(&state.db)
                .await?;
        if let Some(agency_user_id) = agency_user_id {
            notifications::notify_invitation_received(
                &state.db,
                agency_user_id,
                id,
                &company_name,
                &student_name,
                &job_title,
            )
            .await
            .ok();
        }
    }

    activity::record(
        &state.db,
        Some(auth.user_id),
        "invitation_sent",
        "invitation",
        Some(id),
        Some(&format!("{} -> {}", company_name, student_name)),
    )
    .await;

    Ok(Created(serde_json::json!({ "id": id, "status": "pending", "success": true })))
}

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct InvitationQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: InvitationQuery,
}

/// GET /invitations
///
/// Role-scoped: companies see invitations they sent, colleges and agencies
/// see invitations for their students.
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvitationQueryParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (company_id, college_id, agency_id) = match auth.role {
        UserRole::SuperAdmin => (None, None, None),
        UserRole::Company => {
            let id = company_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;
            (Some(id), None, None)
        }
        UserRole::College => {
            let id = college_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No college profile for this account"))?;
            (None, Some(id), None)
        }
        UserRole::Agency => {
            let id = agency_id_for_user(&state.db, auth.user_id)
                .await?
                .ok_or_else(|| ApiError::forbidden("No agency profile for this account"))?;
            (None, None, Some(id))
        }
    };

    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM invitations i
        JOIN students s ON i.student_id = s.id
        WHERE ($1::uuid IS NULL OR i.company_id = $1)
        AND ($2::uuid IS NULL OR s.college_id = $2)
        AND ($3::uuid IS NULL OR s.agency_id = $3)
        AND ($4::uuid IS NULL OR i.job_id = $4)
        AND ($5::uuid IS NULL OR i.student_id = $5)
        AND ($6::text IS NULL OR i.status = $6)
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

    let rows = sqlx::query_as::<_, InvitationRow>(&format!(
        r#"{INVITATION_SELECT}
        WHERE ($1::uuid IS NULL OR i.company_id = $1)
        AND ($2::uuid IS NULL OR s.college_id = $2)
        AND ($3::uuid IS NULL OR s.agency_id = $3)
        AND ($4::uuid IS NULL OR i.job_id = $4)
        AND ($5::uuid IS NULL OR i.student_id = $5)
        AND ($6::text IS NULL OR i.status = $6)
        ORDER BY i.created_at DESC
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

    let data: Vec<InvitationResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

// ============================================================================
// Respond
// ============================================================================

/// POST /invitations/:id/respond (student side)
///
/// Accepting creates an application in the `applied` state.
pub async fn respond_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<RespondInvitationInput>,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.role.manages_students() {
        return Err(ApiError::forbidden(
            "Only colleges and agencies respond to invitations",
        ));
    }

    let row = sqlx::query_as::<_, InvitationRow>(&format!(
        "{INVITATION_SELECT} WHERE i.id = $1"
    ))
    .bind(invitation_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Invitation not found"))?;

    let manages = match auth.role {
        UserRole::College => {
            college_id_for_user(&state.db, auth.user_id).await? == Some(row.college_id)
        }
        _ => {
            let agency_id = agency_id_for_user(&state.db, auth.user_id).await?;
            let student_agency: Option<Uuid> =
                sqlx::query_scalar("SELECT agency_id FROM students WHERE id = $1")
                    .bind(row.student_id)
                    .fetch_one(&state.db)
                    .await?;
            agency_id.is_some() && agency_id == student_agency
        }
    };
    if !manages {
        return Err(ApiError::forbidden("This student is not in your roster"));
    }

    if InvitationStatus::parse(&row.status) != Some(InvitationStatus::Pending) {
        return Err(ApiError::bad_request("This invitation has already been answered"));
    }

    let new_status = if input.accept {
        // Accepting files an application for the invited student
        let application_id = Uuid::new_v4();
        let result = sqlx::query(
            "INSERT INTO applications (id, job_id, student_id, status) VALUES ($1, $2, $3, 'applied')",
        )
        .bind(application_id)
        .bind(row.job_id)
        .bind(row.student_id)
        .execute(&state.db)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(ApiError::conflict(
                    "This student has already applied to this job",
                ));
            }
            return Err(e.into());
        }
        InvitationStatus::Accepted
    } else {
        InvitationStatus::Declined
    };

    sqlx::query(
        "UPDATE invitations SET status = $1, responded_at = NOW() WHERE id = $2",
    )
    .bind(new_status.to_string())
    .bind(invitation_id)
    .execute(&state.db)
    .await?;

    let company_user_id: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM companies WHERE id = $1")
            .bind(row.company_id)
            .fetch_optional(&state.db)
            .await?;
    if let Some(company_user_id) = company_user_id {
        notifications::notify_invitation_response(
            &state.db,
            company_user_id,
            invitation_id,
            &row.student_name,
            &row.job_title,
            input.accept,
        )
        .await
        .ok();
    }

    activity::record(
        &state.db,
        Some(auth.user_id),
        if input.accept {
            "invitation_accepted"
        } else {
            "invitation_declined"
        },
        "invitation",
        Some(invitation_id),
        Some(&row.student_name),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "status": new_status.to_string() })))
}
