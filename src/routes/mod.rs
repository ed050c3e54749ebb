pub mod admin;
pub mod agencies;
pub mod applications;
pub mod auth;
pub mod colleges;
pub mod companies;
pub mod dashboard;
pub mod health;
pub mod invitations;
pub mod jobs;
pub mod me;
pub mod notifications;
pub mod students;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Current user
        .route("/me", get(me::get_me))
        // Colleges
        .route("/colleges", get(colleges::list_colleges))
        .route("/colleges/:college_id", get(colleges::get_college))
        .route("/colleges/:college_id", put(colleges::update_college))
        // Companies
        .route("/companies", get(companies::list_companies))
        .route("/companies/:company_id", get(companies::get_company))
        .route("/companies/:company_id", put(companies::update_company))
        // Agencies
        .route("/agencies/:agency_id", get(agencies::get_agency))
        .route("/agencies/:agency_id", put(agencies::update_agency))
        // Students
        .route("/students", get(students::list_students))
        .route("/students", post(students::create_student))
        .route("/students/import", post(students::import_students))
        .route("/students/export", get(students::export_students))
        .route("/students/:student_id", get(students::get_student))
        .route("/students/:student_id", put(students::update_student))
        .route("/students/:student_id", delete(students::delete_student))
        // Jobs
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/:job_id", get(jobs::get_job))
        .route("/jobs/:job_id", put(jobs::update_job))
        .route("/jobs/:job_id/close", post(jobs::close_job))
        .route(
            "/jobs/:job_id/eligible-students",
            get(jobs::list_eligible_students),
        )
        // Applications
        .route("/jobs/:job_id/applications", post(applications::apply))
        .route("/applications", get(applications::list_applications))
        .route(
            "/applications/:application_id",
            get(applications::get_application),
        )
        .route(
            "/applications/:application_id/status",
            post(applications::update_status),
        )
        .route(
            "/applications/:application_id/withdraw",
            post(applications::withdraw),
        )
        // Invitations
        .route("/invitations", post(invitations::create_invitation))
        .route("/invitations", get(invitations::list_invitations))
        .route(
            "/invitations/:invitation_id/respond",
            post(invitations::respond_invitation),
        )
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        // Dashboard
        .route("/dashboard", get(dashboard::get_dashboard))
        // Admin
        .route("/admin/stats", get(admin::get_stats))
        .route("/admin/accounts", get(admin::list_accounts))
        .route("/admin/accounts/:user_id/approve", post(admin::approve_account))
        .route("/admin/accounts/:user_id/reject", post(admin::reject_account))
        .route(
            "/admin/companies/:company_id/verify",
            post(admin::verify_company),
        )
        .route("/admin/activity", get(admin::list_activity))
        .route("/admin/settings", get(admin::get_settings))
        .route("/admin/settings", put(admin::update_settings))
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn decimal_to_f64(d: sqlx::types::Decimal) -> f64 {
    use std::str::FromStr;
    f64::from_str(&d.to_string()).unwrap_or(0.0)
}

pub(crate) fn decimal_opt_to_f64(d: Option<sqlx::types::Decimal>) -> Option<f64> {
    d.map(decimal_to_f64)
}

/// Whether a database error is a unique-constraint violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

/// College profile id owned by a user, if any
pub(crate) async fn college_id_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM colleges WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Company profile id owned by a user, if any
pub(crate) async fn company_id_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM companies WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Agency profile id owned by a user, if any
pub(crate) async fn agency_id_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM agencies WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
}
