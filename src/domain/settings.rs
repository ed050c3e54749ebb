//! Platform settings types
//!
//! A single row of platform-wide toggles, editable by the super admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-wide toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(default = "default_true")]
    pub registrations_open: bool,
    #[serde(default = "default_true")]
    pub applications_open: bool,
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            registrations_open: true,
            applications_open: true,
            email_enabled: true,
            maintenance_mode: false,
        }
    }
}

/// Request DTO for updating platform settings
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlatformSettingsRequest {
    pub settings: PlatformSettings,
}

/// Response DTO for platform settings
#[derive(Debug, Clone, Serialize)]
pub struct PlatformSettingsResponse {
    pub settings: PlatformSettings,
    pub updated_at: DateTime<Utc>,
}
