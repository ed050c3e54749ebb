//! Role-scoped dashboard
//!
//! One endpoint, four shapes: each role gets the counters its dashboard
//! renders, plus a slice of recent activity.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::users::UserRole;
use crate::error::ApiError;
use crate::routes::{agency_id_for_user, college_id_for_user, company_id_for_user};

/// GET /dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let payload = match auth.role {
        UserRole::SuperAdmin => super_admin_dashboard(&state).await?,
        UserRole::College => college_dashboard(&state, auth.user_id).await?,
        UserRole::Company => company_dashboard(&state, auth.user_id).await?,
        UserRole::Agency => agency_dashboard(&state, auth.user_id).await?,
    };

    Ok(Json(DataResponse::new(payload)))
}

async fn super_admin_dashboard(state: &AppState) -> Result<serde_json::Value, ApiError> {
    let (colleges, companies, agencies): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM colleges),
            (SELECT COUNT(*) FROM companies),
            (SELECT COUNT(*) FROM agencies)
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let (students, placed, jobs, open_jobs, applications, pending_accounts): (
        i64,
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM students),
            (SELECT COUNT(*) FROM students WHERE placed = true),
            (SELECT COUNT(*) FROM jobs),
            (SELECT COUNT(*) FROM jobs WHERE status = 'open'),
            (SELECT COUNT(*) FROM applications),
            (SELECT COUNT(*) FROM users WHERE status = 'pending')
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    Ok(serde_json::json!({
        "role": "super_admin",
        "stats": {
            "colleges": colleges,
            "companies": companies,
            "agencies": agencies,
            "students": students,
            "placed_students": placed,
            "jobs": jobs,
            "open_jobs": open_jobs,
            "applications": applications,
            "pending_accounts": pending_accounts,
        },
        "recent_activity": recent_activity(state, 10).await?,
    }))
}

async fn college_dashboard(
    state: &AppState,
    user_id: Uuid,
) -> Result<serde_json::Value, ApiError> {
    let college_id = college_id_for_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No college profile for this account"))?;

    let (students, placed, applications, offers, pending_invitations): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE college_id = $1),
                (SELECT COUNT(*) FROM students WHERE college_id = $1 AND placed = true),
                (SELECT COUNT(*) FROM applications a JOIN students s ON a.student_id = s.id
                 WHERE s.college_id = $1),
                (SELECT COUNT(*) FROM applications a JOIN students s ON a.student_id = s.id
                 WHERE s.college_id = $1 AND a.status IN ('offered', 'offer_accepted', 'hired')),
                (SELECT COUNT(*) FROM invitations i JOIN students s ON i.student_id = s.id
                 WHERE s.college_id = $1 AND i.status = 'pending')
            "#,
        )
        .bind(college_id)
        .fetch_one(&state.db)
        .await?;

    let open_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'open'")
        .fetch_one(&state.db)
        .await?;

    Ok(serde_json::json!({
        "role": "college",
        "stats": {
            "students": students,
            "placed_students": placed,
            "applications": applications,
            "offers": offers,
            "pending_invitations": pending_invitations,
            "open_jobs": open_jobs,
        },
    }))
}

async fn company_dashboard(
    state: &AppState,
    user_id: Uuid,
) -> Result<serde_json::Value, ApiError> {
    let company_id = company_id_for_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No company profile for this account"))?;

    let (jobs, open_jobs, applications, in_pipeline, hired, invitations_sent): (
        i64,
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM jobs WHERE company_id = $1),
            (SELECT COUNT(*) FROM jobs WHERE company_id = $1 AND status = 'open'),
            (SELECT COUNT(*) FROM applications a JOIN jobs j ON a.job_id = j.id
             WHERE j.company_id = $1),
            (SELECT COUNT(*) FROM applications a JOIN jobs j ON a.job_id = j.id
             WHERE j.company_id = $1
             AND a.status NOT IN ('hired', 'rejected', 'withdrawn')),
            (SELECT COUNT(*) FROM applications a JOIN jobs j ON a.job_id = j.id
             WHERE j.company_id = $1 AND a.status = 'hired'),
            (SELECT COUNT(*) FROM invitations WHERE company_id = $1)
        "#,
    )
    .bind(company_id)
    .fetch_one(&state.db)
    .await?;

    Ok(serde_json::json!({
        "role": "company",
        "stats": {
            "jobs": jobs,
            "open_jobs": open_jobs,
            "applications": applications,
            "in_pipeline": in_pipeline,
            "hired": hired,
            "invitations_sent": invitations_sent,
        },
    }))
}

async fn agency_dashboard(
    state: &AppState,
    user_id: Uuid,
) -> Result<serde_json::Value, ApiError> {
    let agency_id = agency_id_for_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("No agency profile for this account"))?;

    let (students, placed, applications, pending_invitations): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE agency_id = $1),
                (SELECT COUNT(*) FROM students WHERE agency_id = $1 AND placed = true),
                (SELECT COUNT(*) FROM applications a JOIN students s ON a.student_id = s.id
                 WHERE s.agency_id = $1),
                (SELECT COUNT(*) FROM invitations i JOIN students s ON i.student_id = s.id
                 WHERE s.agency_id = $1 AND i.status = 'pending')
            "#,
        )
        .bind(agency_id)
        .fetch_one(&state.db)
        .await?;

    let open_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'open'")
        .fetch_one(&state.db)
        .await?;

    Ok(serde_json::json!({
        "role": "agency",
        "stats": {
            "students": students,
            "placed_students": placed,
            "applications": applications,
            "pending_invitations": pending_invitations,
            "open_jobs": open_jobs,
        },
    }))
}

async fn recent_activity(state: &AppState, limit: i64) -> Result<serde_json::Value, ApiError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        action: String,
        entity_type: String,
        detail: Option<String>,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT action, entity_type, detail, created_at FROM activity_log ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(serde_json::Value::Array(
        rows.into_iter()
            .map(|r| {
                serde_json::json!({
                    "action": r.action,
                    "entity_type": r.entity_type,
                    "detail": r.detail,
                    "created_at": r.created_at,
                })
            })
            .collect(),
    ))
}
