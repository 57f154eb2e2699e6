use std::sync::Arc;

use serde_json::Value;

use crate::models::{ContactMessage, ContactSubmission};
use crate::services::clock::Clock;
use crate::services::notifier::{templates, Mailer};
use crate::services::store::{from_record, record_id, to_record, Order, Record, RecordStore, StoreError, Table};
use crate::services::validation::is_valid_email;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Name, email and message are required")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("message not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct ContactService {
    store: Arc<dyn RecordStore>,
    mailer: Arc<Mailer>,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    pub fn new(store: Arc<dyn RecordStore>, mailer: Arc<Mailer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            mailer,
            clock,
        }
    }

    pub async fn submit(&self, submission: &ContactSubmission) -> Result<ContactMessage, ContactError> {
        let name = submission.name.trim();
        let email = submission.email.trim();
        let body = submission.message.trim();
        if name.is_empty() || email.is_empty() || body.is_empty() {
            return Err(ContactError::MissingFields);
        }
        if !is_valid_email(email) {
            return Err(ContactError::InvalidEmail);
        }

        let mut message = ContactMessage {
            id: 0,
            name: name.to_string(),
            email: email.to_string(),
            phone: non_empty(submission.phone.as_deref()),
            subject: non_empty(submission.subject.as_deref()),
            message: body.to_string(),
            is_read: false,
            created_at: self.clock.now(),
        };

        let mut row = to_record(&message)?;
        row.remove("id");
        let inserted = self.store.insert(Table::ContactMessages, row).await?;
        message.id = record_id(&inserted)
            .ok_or_else(|| StoreError::Backend("insert returned no id".to_string()))?;

        tracing::info!(message_id = message.id, "contact message received");

        self.mailer
            .notify_admin(&templates::contact_notification(&message))
            .await;

        Ok(message)
    }

    /// Newest first, by insertion order.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, ContactError> {
        let rows = self
            .store
            .select(Table::ContactMessages, &[], Some(&Order::desc("id")))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match from_record::<ContactMessage>(row) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed contact message row");
                    None
                }
            })
            .collect())
    }

    pub async fn mark_read(&self, id: i64, is_read: bool) -> Result<ContactMessage, ContactError> {
        let mut fields = Record::new();
        fields.insert("is_read".to_string(), Value::from(is_read));
        match self.store.update(Table::ContactMessages, id, fields).await {
            Ok(row) => Ok(from_record(row)?),
            Err(StoreError::NotFound) => Err(ContactError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), ContactError> {
        match self.store.delete(Table::ContactMessages, id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(ContactError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::clock::ManualClock;
    use crate::services::notifier::{EmailHealth, NotificationError, Notifier, RetryPolicy};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    fn service() -> (ContactService, Arc<dyn RecordStore>, Arc<ManualClock>) {
        let store: Arc<dyn RecordStore> = Arc::new(db::open_store(":memory:").unwrap());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()));
        let mailer = Arc::new(Mailer::new(
            Arc::new(SilentNotifier),
            RetryPolicy::default(),
            Arc::new(EmailHealth::default()),
            "owner@cosmic.in".to_string(),
        ));
        let service = ContactService::new(store.clone(), mailer, clock.clone());
        (service, store, clock)
    }

    fn submission(name: &str) -> ContactSubmission {
        ContactSubmission {
            name: name.to_string(),
            email: "asha@example.in".to_string(),
            phone: None,
            subject: None,
            message: "Is Sunday open?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_across_timestamp_precision() {
        let (service, _store, clock) = service();
        // whole second first, then a fractional one in the same second
        service.submit(&submission("Asha")).await.unwrap();
        clock.advance(Duration::milliseconds(500));
        service.submit(&submission("Ravi")).await.unwrap();

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Ravi", "Asha"]);
    }

    #[tokio::test]
    async fn test_list_skips_malformed_rows() {
        let (service, store, _clock) = service();
        service.submit(&submission("Asha")).await.unwrap();
        let junk: Record = serde_json::from_value(json!({"name": "no email"})).unwrap();
        store.insert(Table::ContactMessages, junk).await.unwrap();

        let messages = service.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, "Asha");
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_email() {
        let (service, _store, _clock) = service();
        let mut bad = submission("Asha");
        bad.email = "asha-at-example".to_string();
        assert!(matches!(service.submit(&bad).await, Err(ContactError::InvalidEmail)));
    }
}
