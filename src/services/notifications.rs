//! Notification service
//!
//! Provides functions to create in-app notifications from other parts of the
//! application. Called by routes when events occur that should surface on a
//! dashboard.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::notifications::NotificationType;

/// Create a notification for a user
pub async fn create_notification(
    db: &PgPool,
    user_id: Uuid,
    notification_type: NotificationType,
    title: &str,
    message: Option<&str>,
    data: Option<serde_json::Value>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let type_str = notification_type.to_string();
    let data = data.unwrap_or(serde_json::json!({}));

    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, type, title, message, data)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&type_str)
    .bind(title)
    .bind(message)
    .bind(&data)
    .execute(db)
    .await?;

    tracing::info!(
        user_id = %user_id,
        notification_type = %type_str,
        notification_id = %id,
        "Notification created"
    );

    Ok(id)
}

/// Account approved by the super admin
pub async fn notify_account_approved(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        user_id,
        NotificationType::AccountApproved,
        "Your account has been approved",
        Some("Welcome aboard! Your dashboard is now fully unlocked."),
        None,
    )
    .await
}

/// Account rejected by the super admin
pub async fn notify_account_rejected(
    db: &PgPool,
    user_id: Uuid,
    reason: &str,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        user_id,
        NotificationType::AccountRejected,
        "Your registration was not approved",
        Some(&format!("Reason: {}", reason)),
        Some(serde_json::json!({ "reason": reason })),
    )
    .await
}

/// Company profile verified by the super admin
pub async fn notify_company_verified(db: &PgPool, user_id: Uuid) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        user_id,
        NotificationType::CompanyVerified,
        "Your company is now verified",
        Some("A verification badge is now visible on your profile."),
        None,
    )
    .await
}

/// New application arrived for a company's job
pub async fn notify_application_received(
    db: &PgPool,
    company_user_id: Uuid,
    application_id: Uuid,
    job_title: &str,
    student_name: &str,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        company_user_id,
        NotificationType::ApplicationReceived,
        &format!("New application for {}", job_title),
        Some(&format!("{} has applied.", student_name)),
        Some(serde_json::json!({
            "application_id": application_id,
            "job_title": job_title,
            "student_name": student_name,
        })),
    )
    .await
}

/// Application status changed (sent to the student's college/agency)
pub async fn notify_application_status(
    db: &PgPool,
    recipient_user_id: Uuid,
    application_id: Uuid,
    student_name: &str,
    job_title: &str,
    status: &str,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        recipient_user_id,
        NotificationType::ApplicationStatusChanged,
        &format!("{} — {}", student_name, job_title),
        Some(&format!("Application moved to {}.", status)),
        Some(serde_json::json!({
            "application_id": application_id,
            "student_name": student_name,
            "job_title": job_title,
            "status": status,
        })),
    )
    .await
}

/// Application withdrawn (sent to the job's company)
pub async fn notify_application_withdrawn(
    db: &PgPool,
    company_user_id: Uuid,
    application_id: Uuid,
    student_name: &str,
    job_title: &str,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        company_user_id,
        NotificationType::ApplicationWithdrawn,
        &format!("{} withdrew from {}", student_name, job_title),
        None,
        Some(serde_json::json!({
            "application_id": application_id,
            "student_name": student_name,
            "job_title": job_title,
        })),
    )
    .await
}

/// Company invited a student (sent to the student's college/agency)
pub async fn notify_invitation_received(
    db: &PgPool,
    recipient_user_id: Uuid,
    invitation_id: Uuid,
    company_name: &str,
    student_name: &str,
    job_title: &str,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        recipient_user_id,
        NotificationType::InvitationReceived,
        &format!("{} invited {}", company_name, student_name),
        Some(&format!(
            "{} would like {} to apply for {}.",
            company_name, student_name, job_title
        )),
        Some(serde_json::json!({
            "invitation_id": invitation_id,
            "company_name": company_name,
            "student_name": student_name,
            "job_title": job_title,
        })),
    )
    .await
}

/// Invitation answered (sent to the inviting company)
pub async fn notify_invitation_response(
    db: &PgPool,
    company_user_id: Uuid,
    invitation_id: Uuid,
    student_name: &str,
    job_title: &str,
    accepted: bool,
) -> Result<Uuid, sqlx::Error> {
    let (notification_type, verb) = if accepted {
        (NotificationType::InvitationAccepted, "accepted")
    } else {
        (NotificationType::InvitationDeclined, "declined")
    };

    create_notification(
        db,
        company_user_id,
        notification_type,
        &format!("{} {} your invitation", student_name, verb),
        Some(&format!("Invitation for {} was {}.", job_title, verb)),
        Some(serde_json::json!({
            "invitation_id": invitation_id,
            "student_name": student_name,
            "job_title": job_title,
            "accepted": accepted,
        })),
    )
    .await
}

/// Bulk import finished (sent to the uploader)
pub async fn notify_import_completed(
    db: &PgPool,
    user_id: Uuid,
    imported: usize,
    updated: usize,
    skipped: usize,
) -> Result<Uuid, sqlx::Error> {
    create_notification(
        db,
        user_id,
        NotificationType::ImportCompleted,
        "Student import finished",
        Some(&format!(
            "{} created, {} updated, {} skipped.",
            imported, updated, skipped
        )),
        Some(serde_json::json!({
            "imported": imported,
            "updated": updated,
            "skipped": skipped,
        })),
    )
    .await
}
