//! Admin routes
//!
//! Protected super-admin endpoints for:
//! - Platform statistics
//! - Account approval workflow (approve/reject registrations)
//! - Company verification
//! - Activity feed
//! - Platform settings
//!
//! All routes require the super_admin role on an approved account.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::admin::{
    AccountQuery, AccountSummary, ActivityEntry, PlatformStats, RejectAccountInput,
};
use crate::domain::settings::{PlatformSettingsResponse, UpdatePlatformSettingsRequest};
use crate::domain::users::UserRole;
use crate::error::{ApiError, ErrorResponse};
use crate::services::{activity, email, notifications, platform};

// ============================================================================
// RequireAdmin Middleware
// ============================================================================

/// Extractor that requires super-admin privileges.
/// Uses RequireAuth internally, then re-checks role and status in the
/// database so demoted or suspended accounts lose access immediately.
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub auth: RequireAuth,
}

impl RequireAdmin {
    pub fn user_id(&self) -> Uuid {
        self.auth.user_id
    }
}

#[derive(Debug)]
pub enum AdminAuthError {
    NotAuthenticated,
    NotAdmin,
    DatabaseError(String),
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AdminAuthError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
            AdminAuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin privileges required"),
            AdminAuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = ErrorResponse {
            code: if status == StatusCode::FORBIDDEN {
                "FORBIDDEN".to_string()
            } else {
                "UNAUTHORIZED".to_string()
            },
            message: message.to_string(),
            request_id: None,
        };

        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(|_| AdminAuthError::NotAuthenticated)?;

        if auth.role != UserRole::SuperAdmin {
            return Err(AdminAuthError::NotAdmin);
        }

        // Claims can outlive a demotion; trust the database
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT role, status FROM users WHERE id = $1")
                .bind(auth.user_id)
                .fetch_optional(&state.db)
                .await
                .map_err(|e| AdminAuthError::DatabaseError(e.to_string()))?;

        match row {
            Some((role, status)) if role == "super_admin" && status == "approved" => {
                Ok(RequireAdmin { auth })
            }
            Some(_) => Err(AdminAuthError::NotAdmin),
            None => Err(AdminAuthError::NotAuthenticated),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// GET /admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
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

    let (students, placed_students, jobs, open_jobs, applications, pending_accounts): (
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

    Ok(Json(DataResponse::new(PlatformStats {
        colleges,
        companies,
        agencies,
        students,
        placed_students,
        jobs,
        open_jobs,
        applications,
        pending_accounts,
    })))
}

// ============================================================================
// Account approval
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    role: String,
    status: String,
    organization: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AccountQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: AccountQuery,
}

const ACCOUNT_SELECT: &str = r#"
    SELECT u.id, u.email, u.role, u.status,
           COALESCE(c.name, co.name, a.name) AS organization,
           u.created_at
    FROM users u
    LEFT JOIN colleges c ON c.user_id = u.id
    LEFT JOIN companies co ON co.user_id = u.id
    LEFT JOIN agencies a ON a.user_id = u.id
"#;

/// GET /admin/accounts
///
/// List accounts, defaulting to the pending approval queue.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AccountQueryParams>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.filter.status.clone().unwrap_or_else(|| "pending".to_string());
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM users u
        LEFT JOIN colleges c ON c.user_id = u.id
        LEFT JOIN companies co ON co.user_id = u.id
        LEFT JOIN agencies a ON a.user_id = u.id
        WHERE u.role != 'super_admin'
        AND u.status = $1
        AND ($2::text IS NULL OR u.role = $2)
        AND ($3::text IS NULL OR u.email ILIKE '%' || $3 || '%'
             OR COALESCE(c.name, co.name, a.name) ILIKE '%' || $3 || '%')
        "#,
    )
    .bind(&status)
    .bind(&query.filter.role)
    .bind(&query.filter.search)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, AccountRow>(&format!(
        r#"{ACCOUNT_SELECT}
        WHERE u.role != 'super_admin'
        AND u.status = $1
        AND ($2::text IS NULL OR u.role = $2)
        AND ($3::text IS NULL OR u.email ILIKE '%' || $3 || '%'
             OR COALESCE(c.name, co.name, a.name) ILIKE '%' || $3 || '%')
        ORDER BY u.created_at ASC
        LIMIT $4 OFFSET $5
        "#
    ))
    .bind(&status)
    .bind(&query.filter.role)
    .bind(&query.filter.search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<AccountSummary> = rows
        .into_iter()
        .map(|r| AccountSummary {
            id: r.id,
            email: r.email,
            role: r.role,
            status: r.status,
            organization: r.organization,
            created_at: r.created_at,
        })
        .collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// POST /admin/accounts/:id/approve
pub async fn approve_account(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let account = sqlx::query_as::<_, AccountRow>(&format!("{ACCOUNT_SELECT} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    if account.status != "pending" {
        return Err(ApiError::bad_request(format!(
            "Account is '{}', only pending accounts can be approved",
            account.status
        )));
    }

    sqlx::query("UPDATE users SET status = 'approved', updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&state.db)
        .await?;

    notifications::notify_account_approved(&state.db, user_id)
        .await
        .ok();

    let settings = platform::load(&state.db).await;
    if settings.email_enabled {
        let organization = account.organization.as_deref().unwrap_or("there");
        let (subject, body) = email::account_approved(&state.settings.service_name, organization);
        state.mailer.send(&account.email, &subject, body);
    }

    activity::record(
        &state.db,
        Some(admin.user_id()),
        "account_approved",
        "user",
        Some(user_id),
        account.organization.as_deref(),
    )
    .await;

    tracing::info!(user_id = %user_id, "Account approved");

    Ok(Json(serde_json::json!({ "success": true, "status": "approved" })))
}

/// POST /admin/accounts/:id/reject
pub async fn reject_account(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    admin: RequireAdmin,
    Json(input): Json<RejectAccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    if input.reason.trim().is_empty() {
        return Err(ApiError::bad_request("A rejection reason is required"));
    }

    let account = sqlx::query_as::<_, AccountRow>(&format!("{ACCOUNT_SELECT} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    if account.status != "pending" {
        return Err(ApiError::bad_request(format!(
            "Account is '{}', only pending accounts can be rejected",
            account.status
        )));
    }

    sqlx::query("UPDATE users SET status = 'rejected', updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&state.db)
        .await?;

    notifications::notify_account_rejected(&state.db, user_id, input.reason.trim())
        .await
        .ok();

    let settings = platform::load(&state.db).await;
    if settings.email_enabled {
        let organization = account.organization.as_deref().unwrap_or("there");
        let (subject, body) = email::account_rejected(
            &state.settings.service_name,
            organization,
            input.reason.trim(),
        );
        state.mailer.send(&account.email, &subject, body);
    }

    activity::record(
        &state.db,
        Some(admin.user_id()),
        "account_rejected",
        "user",
        Some(user_id),
        Some(input.reason.trim()),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "status": "rejected" })))
}

/// POST /admin/companies/:id/verify
pub async fn verify_company(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let company: Option<(Uuid, String, String)> = sqlx::query_as(
        r#"
        SELECT c.user_id, c.name, u.email
        FROM companies c
        JOIN users u ON c.user_id = u.id
        WHERE c.id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&state.db)
    .await?;

    let (company_user_id, company_name, company_email) =
        company.ok_or_else(|| ApiError::not_found("Company not found"))?;

    let result = sqlx::query(
        "UPDATE companies SET verified = true, updated_at = NOW() WHERE id = $1 AND verified = false",
    )
    .bind(company_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::conflict("Company is already verified"));
    }

    notifications::notify_company_verified(&state.db, company_user_id)
        .await
        .ok();

    let settings = platform::load(&state.db).await;
    if settings.email_enabled {
        let (subject, body) =
            email::company_verified(&state.settings.service_name, &company_name);
        state.mailer.send(&company_email, &subject, body);
    }

    activity::record(
        &state.db,
        Some(admin.user_id()),
        "company_verified",
        "company",
        Some(company_id),
        Some(&company_name),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "verified": true })))
}

// ============================================================================
// Activity feed
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    actor_id: Option<Uuid>,
    action: String,
    entity_type: String,
    entity_id: Option<Uuid>,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

/// GET /admin/activity
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = pagination.window();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_log")
        .fetch_one(&state.db)
        .await?;

    let rows = sqlx::query_as::<_, ActivityRow>(
        r#"
        SELECT id, actor_id, action, entity_type, entity_id, detail, created_at
        FROM activity_log
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<ActivityEntry> = rows
        .into_iter()
        .map(|r| ActivityEntry {
            id: r.id,
            actor_id: r.actor_id,
            action: r.action,
            entity_type: r.entity_type,
            entity_id: r.entity_id,
            detail: r.detail,
            created_at: r.created_at,
        })
        .collect();

    Ok(Paginated::new(data, &pagination, total as u64))
}

// ============================================================================
// Platform settings
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    settings: serde_json::Value,
    updated_at: DateTime<Utc>,
}

/// GET /admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, SettingsRow>(
        "SELECT settings, updated_at FROM platform_settings WHERE id = 1",
    )
    .fetch_optional(&state.db)
    .await?;

    let response = match row {
        Some(row) => PlatformSettingsResponse {
            settings: serde_json::from_value(row.settings)
                .map_err(|e| ApiError::internal(format!("Failed to parse settings: {}", e)))?,
            updated_at: row.updated_at,
        },
        None => PlatformSettingsResponse {
            settings: Default::default(),
            updated_at: Utc::now(),
        },
    };

    Ok(Json(DataResponse::new(response)))
}

/// PUT /admin/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    admin: RequireAdmin,
    Json(req): Json<UpdatePlatformSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = serde_json::to_value(&req.settings)
        .map_err(|e| ApiError::internal(format!("Failed to serialize settings: {}", e)))?;

    let row = sqlx::query_as::<_, SettingsRow>(
        r#"
        INSERT INTO platform_settings (id, settings, updated_at)
        VALUES (1, $1, NOW())
        ON CONFLICT (id) DO UPDATE SET
            settings = EXCLUDED.settings,
            updated_at = NOW()
        RETURNING settings, updated_at
        "#,
    )
    .bind(&settings)
    .fetch_one(&state.db)
    .await?;

    activity::record(
        &state.db,
        Some(admin.user_id()),
        "settings_updated",
        "platform_settings",
        None,
        None,
    )
    .await;

    let response = PlatformSettingsResponse {
        settings: serde_json::from_value(row.settings)
            .map_err(|e| ApiError::internal(format!("Failed to parse settings: {}", e)))?,
        updated_at: row.updated_at,
    };

    Ok(Json(DataResponse::new(response)))
}
