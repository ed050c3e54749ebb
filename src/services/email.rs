//! Templated HTML email bodies
//!
//! Each builder returns `(subject, html_body)` ready for [`super::Mailer::send`].
//! All templates share one layout shell so the messages render consistently.

/// Shared layout wrapper
fn layout(service_name: &str, title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="margin:0;padding:0;background:#f4f5f7;font-family:Arial,Helvetica,sans-serif;">
  <table role="presentation" width="100%" cellpadding="0" cellspacing="0">
    <tr><td align="center" style="padding:24px;">
      <table role="presentation" width="560" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;">
        <tr><td style="background:#1f2d5a;color:#ffffff;padding:16px 24px;font-size:18px;font-weight:bold;">{service_name}</td></tr>
        <tr><td style="padding:24px;">
          <h2 style="margin-top:0;color:#1f2d5a;font-size:16px;">{title}</h2>
          {body_html}
        </td></tr>
        <tr><td style="padding:16px 24px;color:#8a8f98;font-size:12px;border-top:1px solid #e7e9ee;">
          This is an automated message from {service_name}. Please do not reply.
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#
    )
}

/// Sent when the super admin approves an account
pub fn account_approved(service_name: &str, organization: &str) -> (String, String) {
    let subject = format!("Your {service_name} account has been approved");
    let body = format!(
        "<p>Hello {organization},</p>\
         <p>Your account has been <strong>approved</strong>. You can now sign in \
         and start using your dashboard.</p>"
    );
    (subject, layout(service_name, "Account approved", &body))
}

/// Sent when the super admin rejects an account
pub fn account_rejected(service_name: &str, organization: &str, reason: &str) -> (String, String) {
    let subject = format!("Your {service_name} registration was not approved");
    let body = format!(
        "<p>Hello {organization},</p>\
         <p>Your registration was not approved.</p>\
         <p><strong>Reason:</strong> {reason}</p>\
         <p>You may register again after addressing the above.</p>"
    );
    (subject, layout(service_name, "Registration not approved", &body))
}

/// Sent when the super admin verifies a company profile
pub fn company_verified(service_name: &str, company_name: &str) -> (String, String) {
    let subject = format!("{company_name} is now verified on {service_name}");
    let body = format!(
        "<p>Hello {company_name},</p>\
         <p>Your company profile has been <strong>verified</strong>. A verification \
         badge is now visible to colleges and agencies.</p>"
    );
    (subject, layout(service_name, "Company verified", &body))
}

/// Sent to the student's college/agency when an application changes status
pub fn application_status_changed(
    service_name: &str,
    student_name: &str,
    job_title: &str,
    company_name: &str,
    status: &str,
) -> (String, String) {
    let subject = format!("Application update: {student_name} — {job_title}");
    let body = format!(
        "<p>The application of <strong>{student_name}</strong> for \
         <strong>{job_title}</strong> at {company_name} moved to \
         <strong>{status}</strong>.</p>"
    );
    (subject, layout(service_name, "Application status update", &body))
}

/// Sent to the student's college/agency when a company sends an invitation
pub fn invitation_received(
    service_name: &str,
    student_name: &str,
    job_title: &str,
    company_name: &str,
    message: Option<&str>,
) -> (String, String) {
    let subject = format!("{company_name} invited {student_name} to apply");
    let note = message
        .map(|m| format!("<p><em>&ldquo;{m}&rdquo;</em></p>"))
        .unwrap_or_default();
    let body = format!(
        "<p><strong>{company_name}</strong> has invited \
         <strong>{student_name}</strong> to apply for <strong>{job_title}</strong>.</p>\
         {note}\
         <p>Respond from your dashboard to accept or decline.</p>"
    );
    (subject, layout(service_name, "Recruitment invitation", &body))
}

/// Sent after a bulk student import completes
pub fn import_summary(
    service_name: &str,
    organization: &str,
    imported: usize,
    updated: usize,
    skipped: usize,
) -> (String, String) {
    let subject = format!("Student import finished: {imported} added, {updated} updated");
    let body = format!(
        "<p>Hello {organization},</p>\
         <p>Your student upload has been processed.</p>\
         <ul>\
           <li><strong>{imported}</strong> new records created</li>\
           <li><strong>{updated}</strong> existing records updated</li>\
           <li><strong>{skipped}</strong> rows skipped (see the import report)</li>\
         </ul>"
    );
    (subject, layout(service_name, "Import complete", &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_wraps_body() {
        let html = layout("CampusHire", "Test title", "<p>hello</p>");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Test title"));
        assert!(html.contains("<p>hello</p>"));
        assert!(html.contains("automated message from CampusHire"));
    }

    #[test]
    fn approval_mentions_organization() {
        let (subject, html) = account_approved("CampusHire", "NIT Rourkela");
        assert!(subject.contains("approved"));
        assert!(html.contains("NIT Rourkela"));
    }

    #[test]
    fn rejection_carries_reason() {
        let (_, html) = account_rejected("CampusHire", "Acme Corp", "Missing GST details");
        assert!(html.contains("Missing GST details"));
    }

    #[test]
    fn status_email_names_all_parties() {
        let (subject, html) = application_status_changed(
            "CampusHire",
            "Priya Sharma",
            "Graduate Engineer",
            "Acme Corp",
            "shortlisted",
        );
        assert!(subject.contains("Priya Sharma"));
        assert!(html.contains("Graduate Engineer"));
        assert!(html.contains("Acme Corp"));
        assert!(html.contains("shortlisted"));
    }

    #[test]
    fn invitation_note_is_optional() {
        let (_, with_note) =
            invitation_received("CampusHire", "Ravi", "SDE Intern", "Acme", Some("Great profile"));
        assert!(with_note.contains("Great profile"));

        let (_, without) = invitation_received("CampusHire", "Ravi", "SDE Intern", "Acme", None);
        assert!(!without.contains("&ldquo;"));
    }

    #[test]
    fn import_summary_counts() {
        let (subject, html) = import_summary("CampusHire", "NIT Rourkela", 42, 3, 5);
        assert!(subject.contains("42"));
        assert!(html.contains("<strong>3</strong>"));
        assert!(html.contains("<strong>5</strong>"));
    }
}
