use uuid::Uuid;

use super::Claims;
use crate::domain::users::UserRole;

/// Authenticated user context extracted from a verified token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID (from JWT sub claim)
    pub user_id: Uuid,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        let role = UserRole::parse(&claims.role).ok_or("Unknown role in token")?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role,
        })
    }
}
