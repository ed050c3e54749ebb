//! Agency profile routes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::agencies::{AgencyResponse, UpdateAgencyInput};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct AgencyRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    location: Option<String>,
    website: Option<String>,
    about: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// GET /agencies/:id
pub async fn get_agency(
    State(state): State<Arc<AppState>>,
    Path(agency_id): Path<Uuid>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, AgencyRow>(
        r#"
        SELECT id, user_id, name, location, website, about, created_at, updated_at
        FROM agencies
        WHERE id = $1
        "#,
    )
    .bind(agency_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Agency not found"))?;

    Ok(Json(DataResponse::new(AgencyResponse {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        location: row.location,
        website: row.website,
        about: row.about,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })))
}

/// PUT /agencies/:id (owner only)
pub async fn update_agency(
    State(state): State<Arc<AppState>>,
    Path(agency_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateAgencyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE agencies SET
            name = COALESCE($1, name),
            location = COALESCE($2, location),
            website = COALESCE($3, website),
            about = COALESCE($4, about),
            updated_at = NOW()
        WHERE id = $5 AND user_id = $6
        "#,
    )
    .bind(&input.name)
    .bind(&input.location)
    .bind(&input.website)
    .bind(&input.about)
    .bind(agency_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Agency not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
