//! Activity log
//!
//! Appends entries consumed by the admin activity feed and the role
//! dashboards. Failures are logged and swallowed so a feed hiccup never
//! fails the operation that produced it.

use sqlx::PgPool;
use uuid::Uuid;

pub async fn record(
    db: &PgPool,
    actor_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Option<Uuid>,
    detail: Option<&str>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO activity_log (id, actor_id, action, entity_type, entity_id, detail)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(detail)
    .execute(db)
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, action = %action, "Failed to record activity");
    }
}
