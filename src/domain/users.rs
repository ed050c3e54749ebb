//! User account types
//!
//! Accounts carry a role (which dashboard the actor sees) and an approval
//! status (accounts start pending and must be approved by the super admin).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    College,
    Company,
    Agency,
}

impl UserRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Self::SuperAdmin),
            "college" => Some(Self::College),
            "company" => Some(Self::Company),
            "agency" => Some(Self::Agency),
            _ => None,
        }
    }

    /// Roles that manage student records
    pub fn manages_students(&self) -> bool {
        matches!(self, Self::College | Self::Agency)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "super_admin"),
            UserRole::College => write!(f, "college"),
            UserRole::Company => write!(f, "company"),
            UserRole::Agency => write!(f, "agency"),
        }
    }
}

/// Account approval status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl AccountStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Approved => write!(f, "approved"),
            AccountStatus::Rejected => write!(f, "rejected"),
            AccountStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// User account response
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [
            UserRole::SuperAdmin,
            UserRole::College,
            UserRole::Company,
            UserRole::Agency,
        ] {
            assert_eq!(UserRole::parse(&role.to_string()), Some(role));
        }
        assert_eq!(UserRole::parse("student"), None);
    }

    #[test]
    fn student_managers() {
        assert!(UserRole::College.manages_students());
        assert!(UserRole::Agency.manages_students());
        assert!(!UserRole::Company.manages_students());
        assert!(!UserRole::SuperAdmin.manages_students());
    }
}
