//! Authentication domain types

use serde::{Deserialize, Serialize};

use super::users::{UserResponse, UserRole};

/// Registration request: creates a pending account plus a role profile
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,

    /// Organization name (college, company or agency)
    pub name: String,

    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,

    // College-specific
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,

    // Company-specific
    #[serde(default)]
    pub industry: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Auth response with token
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Registration acknowledgement (account awaits approval)
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPendingResponse {
    pub user: UserResponse,
    pub approval_required: bool,
    pub message: String,
}
