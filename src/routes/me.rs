use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::users::UserRole;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub profile_id: Option<Uuid>,
    pub organization: Option<String>,
}

/// Get current authenticated user info plus their role profile
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<Json<MeResponse>, ApiError> {
    let table = match auth.role {
        UserRole::College => Some("colleges"),
        UserRole::Company => Some("companies"),
        UserRole::Agency => Some("agencies"),
        UserRole::SuperAdmin => None,
    };

    let profile: Option<(Uuid, String)> = match table {
        Some(table) => {
            sqlx::query_as(&format!(
                "SELECT id, name FROM {} WHERE user_id = $1",
                table
            ))
            .bind(auth.user_id)
            .fetch_optional(&state.db)
            .await?
        }
        None => None,
    };

    let (profile_id, organization) = match profile {
        Some((id, name)) => (Some(id), Some(name)),
        None => (None, None),
    };

    Ok(Json(MeResponse {
        user_id: auth.user_id,
        email: auth.email.clone(),
        role: auth.role.to_string(),
        profile_id,
        organization,
    }))
}
