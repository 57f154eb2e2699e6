use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha1::Sha1;

use crate::services::clock::Clock;
use crate::services::store::{Record, RecordStore, StoreError, Table};

type HmacSha1 = Hmac<Sha1>;

pub const MIN_PASSWORD_LEN: usize = 6;

const CREDENTIALS_ID: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Current password and new password are required")]
    MissingFields,
    #[error("New password must be at least 6 characters long")]
    TooShort,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error(transparent)]
    Store(#[from] StoreError),
}

const PLAIN_KEY: &[u8] = b"admin-password";

fn digest(key: &[u8], password: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha1::new_from_slice(key).ok()?;
    mac.update(password.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

fn verify_digest(key: &[u8], candidate: &str, expected: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha1::new_from_slice(key) else {
        return false;
    };
    mac.update(candidate.as_bytes());
    mac.verify_slice(expected).is_ok()
}

/// Salted digest stored as `<salt>$<base64>`.
pub fn hash_password(password: &str) -> Option<String> {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = digest(salt.as_bytes(), password)?;
    Some(format!("{salt}${}", STANDARD.encode(digest)))
}

pub fn verify_hash(stored: &str, candidate: &str) -> bool {
    let Some((salt, encoded)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(encoded) else {
        return false;
    };
    verify_digest(salt.as_bytes(), candidate, &expected)
}

/// Constant-time equality for a configured plaintext password: both sides
/// are compared as MACs.
pub fn matches_plain(expected: &str, candidate: &str) -> bool {
    match digest(PLAIN_KEY, expected) {
        Some(tag) => verify_digest(PLAIN_KEY, candidate, &tag),
        None => false,
    }
}

/// The admin password: a hash saved through change-password wins over the
/// `ADMIN_PASSWORD` setting. With neither, every login fails.
pub struct AdminCredentials {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    configured: String,
}

impl AdminCredentials {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, configured: String) -> Self {
        Self {
            store,
            clock,
            configured,
        }
    }

    async fn stored_hash(&self) -> Result<Option<String>, StoreError> {
        match self.store.get(Table::AdminCredentials, CREDENTIALS_ID).await {
            Ok(record) => Ok(record
                .get("password_hash")
                .and_then(Value::as_str)
                .filter(|h| !h.is_empty())
                .map(str::to_string)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn verify(&self, candidate: &str) -> Result<bool, StoreError> {
        if candidate.is_empty() {
            return Ok(false);
        }
        match self.stored_hash().await? {
            Some(hash) => Ok(verify_hash(&hash, candidate)),
            None if self.configured.is_empty() => Ok(false),
            None => Ok(matches_plain(&self.configured, candidate)),
        }
    }

    pub async fn change(&self, current: &str, new: &str) -> Result<(), CredentialError> {
        if current.is_empty() || new.is_empty() {
            return Err(CredentialError::MissingFields);
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialError::TooShort);
        }
        if !self.verify(current).await? {
            return Err(CredentialError::WrongPassword);
        }

        let hash = hash_password(new)
            .ok_or_else(|| StoreError::Backend("could not hash password".to_string()))?;
        let mut record = Record::new();
        record.insert("id".to_string(), Value::from(CREDENTIALS_ID));
        record.insert("password_hash".to_string(), Value::from(hash));
        record.insert(
            "updated_at".to_string(),
            Value::from(self.clock.now().to_rfc3339()),
        );
        self.store.upsert(Table::AdminCredentials, record).await?;

        tracing::info!("admin password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::clock::SystemClock;

    fn credentials(configured: &str) -> AdminCredentials {
        let store: Arc<dyn RecordStore> = Arc::new(db::open_store(":memory:").unwrap());
        AdminCredentials::new(store, Arc::new(SystemClock), configured.to_string())
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("moonstone").unwrap();
        assert!(!hash.contains("moonstone"));
        assert!(verify_hash(&hash, "moonstone"));
        assert!(!verify_hash(&hash, "moonstone "));
        assert!(!verify_hash("garbage", "moonstone"));
    }

    #[test]
    fn test_matches_plain() {
        assert!(matches_plain("s3cret", "s3cret"));
        assert!(!matches_plain("s3cret", "s3cre"));
        assert!(!matches_plain("s3cret", ""));
    }

    #[tokio::test]
    async fn test_unconfigured_password_rejects_everything() {
        let creds = credentials("");
        assert!(!creds.verify("").await.unwrap());
        assert!(!creds.verify("admin123").await.unwrap());
    }

    #[tokio::test]
    async fn test_change_password_replaces_configured() {
        let creds = credentials("s3cret");
        assert!(creds.verify("s3cret").await.unwrap());

        assert!(matches!(
            creds.change("wrong", "moonstone").await,
            Err(CredentialError::WrongPassword)
        ));
        assert!(matches!(
            creds.change("s3cret", "short").await,
            Err(CredentialError::TooShort)
        ));

        creds.change("s3cret", "moonstone").await.unwrap();
        assert!(creds.verify("moonstone").await.unwrap());
        assert!(!creds.verify("s3cret").await.unwrap());
    }
}
