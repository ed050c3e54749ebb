//! Authentication routes
//!
//! Registration creates a pending account plus its role profile; the super
//! admin approves accounts before login succeeds.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::auth::password;
use crate::domain::auth::{
    AuthResponse, LoginRequest, RegisterRequest, RegistrationPendingResponse,
};
use crate::domain::users::{AccountStatus, UserResponse, UserRole};
use crate::error::ApiError;
use crate::routes::is_unique_violation;
use crate::services::{activity, platform};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
}

/// POST /auth/register
///
/// Register a new account. The account stays pending until approved.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.role == UserRole::SuperAdmin {
        return Err(ApiError::forbidden("Cannot self-register as super admin"));
    }

    let settings = platform::load(&state.db).await;
    if !settings.registrations_open {
        return Err(ApiError::forbidden("Registrations are currently closed"));
    }

    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Organization name is required"));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    let mut tx = state.db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, role, status)
        VALUES ($1, $2, $3, $4, 'pending')
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(req.role.to_string())
    .execute(&mut *tx)
    .await;

    if let Err(e) = inserted {
        if is_unique_violation(&e) {
            return Err(ApiError::conflict("An account with this email already exists"));
        }
        return Err(e.into());
    }

    let profile_id = Uuid::new_v4();
    match req.role {
        UserRole::College => {
            sqlx::query(
                r#"
                INSERT INTO colleges (id, user_id, name, code, address, city, website, contact_phone)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(profile_id)
            .bind(user_id)
            .bind(req.name.trim())
            .bind(&req.code)
            .bind(&req.address)
            .bind(&req.location)
            .bind(&req.website)
            .bind(&req.contact_phone)
            .execute(&mut *tx)
            .await?;
        }
        UserRole::Company => {
            sqlx::query(
                r#"
                INSERT INTO companies (id, user_id, name, industry, website, location, verified)
                VALUES ($1, $2, $3, $4, $5, $6, false)
                "#,
            )
            .bind(profile_id)
            .bind(user_id)
            .bind(req.name.trim())
            .bind(&req.industry)
            .bind(&req.website)
            .bind(&req.location)
            .execute(&mut *tx)
            .await?;
        }
        UserRole::Agency => {
            sqlx::query(
                r#"
                INSERT INTO agencies (id, user_id, name, location, website)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(profile_id)
            .bind(user_id)
            .bind(req.name.trim())
            .bind(&req.location)
            .bind(&req.website)
            .execute(&mut *tx)
            .await?;
        }
        UserRole::SuperAdmin => unreachable!(),
    }

    tx.commit().await?;

    activity::record(
        &state.db,
        Some(user_id),
        "account_registered",
        "user",
        Some(user_id),
        Some(&format!("{} ({})", req.name.trim(), req.role)),
    )
    .await;

    tracing::info!(user_id = %user_id, role = %req.role, "Account registered, awaiting approval");

    let response = RegistrationPendingResponse {
        user: UserResponse {
            id: user_id,
            email,
            role: req.role.to_string(),
            status: AccountStatus::Pending.to_string(),
            created_at: Utc::now(),
        },
        approval_required: true,
        message: "Registration received. You will be notified once an administrator approves your account.".to_string(),
    };

    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, role, status, created_at FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let role = UserRole::parse(&user.role)
        .ok_or_else(|| ApiError::internal(format!("Unknown role '{}' on account", user.role)))?;

    match AccountStatus::parse(&user.status) {
        Some(AccountStatus::Approved) => {}
        Some(AccountStatus::Pending) => {
            return Err(ApiError::forbidden(
                "Your account is awaiting administrator approval",
            ));
        }
        Some(AccountStatus::Rejected) => {
            return Err(ApiError::forbidden("Your registration was not approved"));
        }
        Some(AccountStatus::Suspended) => {
            return Err(ApiError::forbidden("Your account has been suspended"));
        }
        None => {
            return Err(ApiError::internal(format!(
                "Unknown status '{}' on account",
                user.status
            )));
        }
    }

    // Maintenance mode locks out everyone except the super admin
    let settings = platform::load(&state.db).await;
    if settings.maintenance_mode && role != UserRole::SuperAdmin {
        return Err(ApiError::forbidden(
            "The platform is under maintenance. Please try again later.",
        ));
    }

    let access_token = state.tokens.issue(user.id, &user.email, role)?;

    tracing::info!(user_id = %user.id, role = %role, "User logged in");

    Ok(Json(DataResponse::new(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expires_in(),
        user: UserResponse {
            id: user.id,
            email: user.email,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        },
    })))
}
