use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{NotificationError, Notifier};

/// SMTP codes meaning the server refused our login.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

pub struct SmtpNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl SmtpNotifier {
    /// Builds a STARTTLS transport. Missing credentials leave the notifier
    /// unconfigured; every send then fails with `Misconfigured`.
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self, NotificationError> {
        if username.is_empty() || password.is_empty() {
            tracing::warn!("EMAIL_ADDRESS or EMAIL_PASSWORD not set, email notifications disabled");
            return Ok(Self {
                transport: None,
                from_address: username.to_string(),
            });
        }

        let creds = Credentials::new(username.to_string(), password.to_string());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotificationError::Misconfigured(e.to_string()))?
            .port(port)
            .credentials(creds)
            .build();

        tracing::info!(host = %host, port, username = %username, "created SMTP notifier");

        Ok(Self {
            transport: Some(transport),
            from_address: username.to_string(),
        })
    }

    fn build_message(&self, to: &str, subject: &str, html_body: &str) -> Result<Message, NotificationError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| NotificationError::Misconfigured(format!("from address: {e}")))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| NotificationError::Misconfigured(format!("to address '{to}': {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| NotificationError::Misconfigured(e.to_string()))
    }
}

fn classify(e: lettre::transport::smtp::Error) -> NotificationError {
    let code = e.status().map(|c| c.to_string());
    match code.as_deref() {
        Some(c) if AUTH_FAILURE_CODES.contains(&c) => NotificationError::Auth(e.to_string()),
        _ if e.is_permanent() => NotificationError::Misconfigured(e.to_string()),
        _ => NotificationError::Transient(e.to_string()),
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotificationError> {
        let Some(transport) = &self.transport else {
            return Err(NotificationError::Misconfigured(
                "SMTP credentials not set".to_string(),
            ));
        };

        let message = self.build_message(to, subject, html_body)?;
        transport.send(message).await.map_err(classify)?;

        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_notifier_reports_misconfigured() {
        let notifier = SmtpNotifier::new("smtp.gmail.com", 587, "", "").unwrap();
        let result = notifier.send("owner@example.com", "New Booking", "<p>hi</p>").await;
        assert!(matches!(result, Err(NotificationError::Misconfigured(_))));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let notifier = SmtpNotifier {
            transport: None,
            from_address: "desk@example.com".to_string(),
        };
        let result = notifier.build_message("not an address", "s", "b");
        assert!(matches!(result, Err(NotificationError::Misconfigured(_))));
        assert!(notifier.build_message("owner@example.com", "s", "<b>b</b>").is_ok());
    }
}
