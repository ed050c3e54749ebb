//! Notification routes
//!
//! Endpoints for in-app notifications: list, mark read.

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
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::notifications::{NotificationQuery, NotificationResponse};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    notification_type: String,
    title: String,
    message: Option<String>,
    data: serde_json::Value,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Default)]
pub struct NotificationQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: NotificationQuery,
}

/// GET /notifications
///
/// List notifications for the current user with pagination and filtering.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NotificationQueryParams>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = query.pagination.window();
    let unread_only = query.filter.unread_only.unwrap_or(false);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE user_id = $1
        AND ($2::bool = false OR is_read = false)
        AND ($3::text IS NULL OR type = $3)
        "#,
    )
    .bind(auth.user_id)
    .bind(unread_only)
    .bind(&query.filter.notification_type)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, type, title, message, data, is_read, read_at, created_at
        FROM notifications
        WHERE user_id = $1
        AND ($2::bool = false OR is_read = false)
        AND ($3::text IS NULL OR type = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(auth.user_id)
    .bind(unread_only)
    .bind(&query.filter.notification_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<NotificationResponse> = rows
        .into_iter()
        .map(|r| NotificationResponse {
            id: r.id,
            notification_type: r.notification_type,
            title: r.title,
            message: r.message,
            data: r.data,
            is_read: r.is_read,
            read_at: r.read_at,
            created_at: r.created_at,
        })
        .collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// POST /notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<Uuid>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = true, read_at = NOW() WHERE id = $1 AND user_id = $2 AND is_read = false",
    )
    .bind(notification_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = true, read_at = NOW() WHERE user_id = $1 AND is_read = false",
    )
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "marked": result.rows_affected(),
    })))
}
