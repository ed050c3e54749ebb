//! Company profile routes

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
use crate::domain::companies::{CompanyQuery, CompanyResponse, UpdateCompanyInput};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    industry: Option<String>,
    website: Option<String>,
    location: Option<String>,
    about: Option<String>,
    verified: bool,
    open_jobs: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for CompanyResponse {
    fn from(r: CompanyRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            industry: r.industry,
            website: r.website,
            location: r.location,
            about: r.about,
            verified: r.verified,
            open_jobs: r.open_jobs,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CompanyQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    #[serde(flatten)]
    pub filter: CompanyQuery,
}

/// GET /companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompanyQueryParams>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = query.pagination.window();

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM companies c
        JOIN users u ON c.user_id = u.id
        WHERE u.status = 'approved'
        AND ($1::text IS NULL OR c.industry ILIKE '%' || $1 || '%')
        AND ($2::bool IS NULL OR c.verified = $2)
        AND ($3::text IS NULL OR c.name ILIKE '%' || $3 || '%')
        "#,
    )
    .bind(&query.filter.industry)
    .bind(query.filter.verified)
    .bind(&query.filter.search)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, CompanyRow>(
        r#"
        SELECT c.id, c.user_id, c.name, c.industry, c.website, c.location, c.about,
               c.verified,
               (SELECT COUNT(*) FROM jobs j WHERE j.company_id = c.id AND j.status = 'open') AS open_jobs,
               c.created_at, c.updated_at
        FROM companies c
        JOIN users u ON c.user_id = u.id
        WHERE u.status = 'approved'
        AND ($1::text IS NULL OR c.industry ILIKE '%' || $1 || '%')
        AND ($2::bool IS NULL OR c.verified = $2)
        AND ($3::text IS NULL OR c.name ILIKE '%' || $3 || '%')
        ORDER BY c.verified DESC, c.name
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(&query.filter.industry)
    .bind(query.filter.verified)
    .bind(&query.filter.search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<CompanyResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Paginated::new(data, &query.pagination, total as u64))
}

/// GET /companies/:id
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    _auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, CompanyRow>(
        r#"
        SELECT c.id, c.user_id, c.name, c.industry, c.website, c.location, c.about,
               c.verified,
               (SELECT COUNT(*) FROM jobs j WHERE j.company_id = c.id AND j.status = 'open') AS open_jobs,
               c.created_at, c.updated_at
        FROM companies c
        WHERE c.id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(Json(DataResponse::new(CompanyResponse::from(row))))
}

/// PUT /companies/:id (owner only)
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    auth: RequireAuth,
    Json(input): Json<UpdateCompanyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE companies SET
            name = COALESCE($1, name),
            industry = COALESCE($2, industry),
            website = COALESCE($3, website),
            location = COALESCE($4, location),
            about = COALESCE($5, about),
            updated_at = NOW()
        WHERE id = $6 AND user_id = $7
        "#,
    )
    .bind(&input.name)
    .bind(&input.industry)
    .bind(&input.website)
    .bind(&input.location)
    .bind(&input.about)
    .bind(company_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Company not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
