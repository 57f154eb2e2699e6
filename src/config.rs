use std::env;
use std::time::Duration;

use crate::services::notifier::RetryPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub record_store: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub admin_password: String,
    pub session_secret: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_address: String,
    pub email_password: String,
    pub notification_email: String,
    pub email_retry_attempts: u32,
    pub email_retry_backoff_ms: u64,
    pub cors_origin: String,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let email_address = env::var("EMAIL_ADDRESS").unwrap_or_default();
        Self {
            port: parsed("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "bookdesk.db".to_string()),
            record_store: env::var("RECORD_STORE").unwrap_or_else(|_| "sqlite".to_string()),
            supabase_url: env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_key: env::var("SUPABASE_KEY").unwrap_or_default(),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: parsed("SMTP_PORT", 587),
            notification_email: env::var("BOOKING_NOTIFICATION_EMAIL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| email_address.clone()),
            email_address,
            email_password: env::var("EMAIL_PASSWORD").unwrap_or_default(),
            email_retry_attempts: parsed("EMAIL_RETRY_ATTEMPTS", 3),
            email_retry_backoff_ms: parsed("EMAIL_RETRY_BACKOFF_MS", 2000),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.email_retry_attempts.max(1),
            initial_backoff: Duration::from_millis(self.email_retry_backoff_ms),
            ..RetryPolicy::default()
        }
    }
}
