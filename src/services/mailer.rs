//! SMTP delivery
//!
//! Delivery is best-effort: sends run on a detached task with the blocking
//! transport moved onto the blocking pool, and failures are logged rather
//! than surfaced to the request that triggered them.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Settings;

#[derive(Clone)]
pub struct Mailer {
    host: String,
    user: String,
    pass: String,
    from: String,
    service_name: String,
}

impl Mailer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            host: settings.smtp_host.clone(),
            user: settings.smtp_user.clone(),
            pass: settings.smtp_pass.clone(),
            from: settings.smtp_from.clone(),
            service_name: settings.service_name.clone(),
        }
    }

    /// Queue an email for delivery and return immediately
    pub fn send(&self, to: &str, subject: &str, html_body: String) {
        let mailer = self.clone();
        let to = to.to_string();
        let subject = subject.to_string();

        tracing::debug!(to = %to, subject = %subject, "Queueing email");

        tokio::spawn(async move {
            let log_subject = subject.clone();
            let result =
                tokio::task::spawn_blocking(move || mailer.deliver(&to, &subject, html_body))
                    .await;

            match result {
                Ok(Ok(())) => tracing::debug!(subject = %log_subject, "Email sent"),
                Ok(Err(e)) => tracing::warn!(error = %e, subject = %log_subject, "Could not send email"),
                Err(e) => tracing::warn!(error = %e, "Email task failed to execute"),
            }
        });
    }

    fn deliver(&self, to: &str, subject: &str, html_body: String) -> Result<()> {
        let message = Message::builder()
            .from(
                format!("{} <{}>", self.service_name, self.from)
                    .parse()
                    .context("Invalid sender address")?,
            )
            .to(to.parse().context("Invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .context("Failed to build message")?;

        // Unauthenticated transport is only for local dev relays
        let transport = if self.user.is_empty() {
            SmtpTransport::builder_dangerous(&self.host).build()
        } else {
            SmtpTransport::relay(&self.host)
                .context("Invalid SMTP relay host")?
                .credentials(Credentials::new(self.user.clone(), self.pass.clone()))
                .build()
        };

        transport.send(&message).context("SMTP send failed")?;
        Ok(())
    }
}
