//! Notification domain types
//!
//! In-app notification system for dashboard alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    // Account lifecycle
    AccountApproved,
    AccountRejected,
    CompanyVerified,

    // Applications
    ApplicationReceived,
    ApplicationStatusChanged,
    ApplicationWithdrawn,

    // Invitations
    InvitationReceived,
    InvitationAccepted,
    InvitationDeclined,

    // Imports
    ImportCompleted,

    // System
    System,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_string(self).unwrap_or_default();
        write!(f, "{}", s.trim_matches('"'))
    }
}

/// Notification response
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: Option<String>,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notification filter query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_serializes_snake_case() {
        assert_eq!(
            NotificationType::ApplicationStatusChanged.to_string(),
            "application_status_changed"
        );
        assert_eq!(
            NotificationType::InvitationReceived.to_string(),
            "invitation_received"
        );
    }
}
