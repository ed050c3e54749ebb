//! College profile routes

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
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::colleges::{CollegeQuery, CollegeResponse, UpdateCollegeInput};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct CollegeRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    code: Option<String>,
    address: Option<String>,
    city: Option<String>,
    website: Option<String>,
    contact_phone: Option<String>,
    placement_officer: Option<String>,
    student_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CollegeRow> for CollegeResponse {
    fn from(r: CollegeRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            code: r.code,
            address: r.address,
            city: r.city,
            website: r.website,
            contact_phone: r.contact_phone,
            placement_officer: r.placement_officer,
            student_count: r.student_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CollegeQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: CollegeQuery,
}

/// GET /colleges
pub async fn list_colleges(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CollegeQueryParams>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM colleges c
        JOIN users u ON c.user_id = u.id
        WHERE u.status = 'approved'
        AND ($1::text IS NULL OR c.city ILIKE '%' || $1 || '%')
        AND ($2::text IS NULL OR c.name ILIKE '%' || $2 || '%')
        "#,
    )
    .bind(&query.filter.city)
    .bind(&query.filter.search)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, CollegeRow>(
        r#"
        SELECT c.id, c.user_id, c.name, c.code, c.address, c.city, c.website,
               c.contact_phone, c.placement_officer,
               (SELECT COUNT(*) FROM students s WHERE s.college_id = c.id) AS student_count,
               c.created_at, c.updated_at
        FROM colleges c
        JOIN users u ON c.user_id = u.id
        WHERE u.status = 'approved'
        AND ($1::text IS NULL OR c.city ILIKE '%' || $1 || '%')
        AND ($2::text IS NULL OR c.name ILIKE '%' || $2 || '%')
        ORDER BY c.name
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&query.filter.city)
    .bind(&query.filter.search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<CollegeResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// GET /colleges/:id
pub async fn get_college(
    State(state): State<Arc<AppState>>,
    Path(college_id): Path<Uuid>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, CollegeRow>(
        r#"
        SELECT c.id, c.user_id, c.name, c.code, c.address, c.city, c.website,
               c.contact_phone, c.placement_officer,
               (SELECT COUNT(*) FROM students s WHERE s.college_id = c.id) AS student_count,
               c.created_at, c.updated_at
        FROM colleges c
        WHERE c.id = $1
        "#,
    )
    .bind(college_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("College not found"))?;

    Ok(Json(DataResponse::new(CollegeResponse::from(row))))
}

/// PUT /colleges/:id (owner only)
pub async fn update_college(
    State(state): State<Arc<AppState>>,
    Path(college_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateCollegeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE colleges SET
            name = COALESCE($1, name),
            code = COALESCE($2, code),
            address = COALESCE($3, address),
            city = COALESCE($4, city),
            website = COALESCE($5, website),
            contact_phone = COALESCE($6, contact_phone),
            placement_officer = COALESCE($7, placement_officer),
            updated_at = NOW()
        WHERE id = $8 AND user_id = $9
        "#,
    )
    .bind(&input.name)
    .bind(&input.code)
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.website)
    .bind(&input.contact_phone)
    .bind(&input.placement_officer)
    .bind(college_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("College not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
