//! Platform settings access
//!
//! The toggles live in a single jsonb row; readers fall back to defaults
//! when the row is missing or unparseable.

use sqlx::PgPool;

use crate::domain::settings::PlatformSettings;

pub async fn load(db: &PgPool) -> PlatformSettings {
    let row: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT settings FROM platform_settings WHERE id = 1")
            .fetch_optional(db)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load platform settings");
                None
            });

    row.and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
