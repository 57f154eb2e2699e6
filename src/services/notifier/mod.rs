pub mod smtp;
pub mod templates;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    /// The mail server rejected our credentials.
    #[error("email authentication failed: {0}")]
    Auth(String),
    #[error("email delivery failed: {0}")]
    Transient(String),
    #[error("email is not configured: {0}")]
    Misconfigured(String),
}

impl NotificationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotificationError::Transient(_))
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            factor: 1.5,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        self.initial_backoff.mul_f64(self.factor.powi(exponent))
    }
}

/// Sends through `notifier`, retrying transient failures with backoff.
pub async fn send_with_retry(
    notifier: &dyn Notifier,
    policy: &RetryPolicy,
    to: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), NotificationError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match notifier.send(to, subject, html_body).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    error = %e,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    "email send failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailHealthState {
    Unknown,
    Healthy,
    Misconfigured { reason: String },
}

/// Last observed state of outgoing email, so a broken SMTP setup shows up
/// somewhere other than the logs.
pub struct EmailHealth {
    state: Mutex<EmailHealthState>,
}

impl Default for EmailHealth {
    fn default() -> Self {
        Self {
            state: Mutex::new(EmailHealthState::Unknown),
        }
    }
}

impl EmailHealth {
    pub fn record(&self, result: &Result<(), NotificationError>) {
        let next = match result {
            Ok(()) => EmailHealthState::Healthy,
            Err(NotificationError::Transient(_)) => return,
            Err(e) => EmailHealthState::Misconfigured {
                reason: e.to_string(),
            },
        };
        if let Ok(mut state) = self.state.lock() {
            if *state != next {
                tracing::info!(state = ?next, "email health changed");
            }
            *state = next;
        }
    }

    pub fn state(&self) -> EmailHealthState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Outgoing mail as the rest of the app uses it: admin notifications go out
/// with retry and feed `EmailHealth`; everything else is a single attempt.
pub struct Mailer {
    notifier: Arc<dyn Notifier>,
    retry: RetryPolicy,
    health: Arc<EmailHealth>,
    admin_address: String,
}

impl Mailer {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        retry: RetryPolicy,
        health: Arc<EmailHealth>,
        admin_address: String,
    ) -> Self {
        Self {
            notifier,
            retry,
            health,
            admin_address,
        }
    }

    pub fn health(&self) -> &EmailHealth {
        &self.health
    }

    /// Returns whether the notification was delivered. Failures are logged.
    pub async fn notify_admin(&self, email: &templates::Email) -> bool {
        if self.admin_address.is_empty() {
            let result = Err(NotificationError::Misconfigured(
                "no notification address configured".to_string(),
            ));
            self.health.record(&result);
            tracing::warn!("BOOKING_NOTIFICATION_EMAIL not set, skipping notification");
            return false;
        }

        let result = send_with_retry(
            self.notifier.as_ref(),
            &self.retry,
            &self.admin_address,
            &email.subject,
            &email.html_body,
        )
        .await;
        self.health.record(&result);

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, subject = %email.subject, "failed to notify admin");
                false
            }
        }
    }

    /// One attempt, no retry. Used for customer-facing mail.
    pub async fn send_once(&self, to: &str, email: &templates::Email) -> bool {
        match self.notifier.send(to, &email.subject, &email.html_body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, to = %to, "failed to send email");
                false
            }
        }
    }
}
