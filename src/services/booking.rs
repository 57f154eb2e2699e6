use std::sync::Arc;

use serde_json::Value;

use crate::models::{BookingOutcome, BookingRecord, BookingSource, BookingStatus, BookingSubmission, ConfigKey};
use crate::services::clock::Clock;
use crate::services::config_cache::ConfigCache;
use crate::services::notifier::{templates, Mailer};
use crate::services::store::{
    from_record, record_id, to_record, Filter, Order, Record, RecordStore, StoreError, Table,
};
use crate::services::validation;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("failed to save booking: {0}")]
    InsertFailed(StoreError),
    #[error("booking not found")]
    NotFound,
    #[error("cannot change booking from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Booking intake: validate, persist, then notify.
pub struct BookingService {
    store: Arc<dyn RecordStore>,
    mailer: Arc<Mailer>,
    clock: Arc<dyn Clock>,
    config: Arc<ConfigCache>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        mailer: Arc<Mailer>,
        clock: Arc<dyn Clock>,
        config: Arc<ConfigCache>,
    ) -> Self {
        Self {
            store,
            mailer,
            clock,
            config,
        }
    }

    /// Rejections come back as `Ok(Rejected)` with nothing stored or sent.
    /// Only a failed insert is an error; email trouble just clears
    /// `notification_sent`.
    pub async fn submit(
        &self,
        submission: &BookingSubmission,
        source: BookingSource,
    ) -> Result<BookingOutcome, BookingError> {
        let now = self.clock.now();

        let booking = match validation::validate(submission, now.date_naive()) {
            Ok(booking) => booking,
            Err(reason) => {
                tracing::info!(reason = %reason, source = source.as_str(), "booking rejected");
                return Ok(BookingOutcome::Rejected { reason });
            }
        };

        let mut record = BookingRecord {
            id: 0,
            name: booking.name().to_string(),
            phone: booking.phone().to_string(),
            service: booking.service().to_string(),
            message: booking.message().map(str::to_string),
            date_of_birth: booking.date_of_birth().map(str::to_string),
            email: booking.email().map(str::to_string),
            booking_date: booking.booking_date().map(str::to_string),
            booking_time: booking.booking_time().map(str::to_string),
            status: BookingStatus::Pending,
            source,
            created_at: now,
        };

        let mut row = to_record(&record).map_err(BookingError::InsertFailed)?;
        row.remove("id");
        let inserted = self
            .store
            .insert(Table::Bookings, row)
            .await
            .map_err(BookingError::InsertFailed)?;
        record.id = record_id(&inserted).ok_or_else(|| {
            BookingError::InsertFailed(StoreError::Backend("insert returned no id".to_string()))
        })?;

        tracing::info!(
            booking_id = record.id,
            service = %record.service,
            source = source.as_str(),
            "booking created"
        );

        let notification_sent = self
            .mailer
            .notify_admin(&templates::booking_notification(&record))
            .await;

        if let Some(email) = &record.email {
            let config = self.config.get().await;
            let confirmation =
                templates::booking_confirmation(&record, config.get(ConfigKey::BusinessName));
            self.mailer.send_once(email, &confirmation).await;
        }

        Ok(BookingOutcome::Completed {
            record,
            notification_sent,
        })
    }

    /// All bookings, newest first. Ids follow insertion order, which keeps
    /// the ordering stable where `created_at` strings differ in precision.
    pub async fn list(&self) -> Result<Vec<BookingRecord>, BookingError> {
        let rows = self
            .store
            .select(Table::Bookings, &[], Some(&Order::desc("id")))
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match from_record::<BookingRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed booking row");
                    None
                }
            })
            .collect())
    }

    async fn load(&self, id: i64) -> Result<BookingRecord, BookingError> {
        match self.store.get(Table::Bookings, id).await {
            Ok(row) => Ok(from_record(row)?),
            Err(StoreError::NotFound) => Err(BookingError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves a booking out of `pending`. The write only lands if the status
    /// is still the one checked here, so two racing admins cannot both win.
    pub async fn update_status(&self, id: i64, next: BookingStatus) -> Result<BookingRecord, BookingError> {
        let current = self.load(id).await?;

        if !current.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: current.status.as_str(),
                to: next.as_str(),
            });
        }

        let mut fields = Record::new();
        fields.insert("status".to_string(), Value::from(next.as_str()));
        fields.insert(
            "updated_at".to_string(),
            Value::from(self.clock.now().to_rfc3339()),
        );

        let expected = [Filter::eq("status", current.status.as_str())];
        let updated = match self.store.update_if(Table::Bookings, id, &expected, fields).await {
            Ok(row) => row,
            Err(StoreError::NotFound) => return Err(BookingError::NotFound),
            Err(StoreError::Conflict) => {
                let latest = self.load(id).await?;
                tracing::warn!(
                    booking_id = id,
                    status = latest.status.as_str(),
                    "booking status changed concurrently"
                );
                return Err(BookingError::InvalidTransition {
                    from: latest.status.as_str(),
                    to: next.as_str(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(booking_id = id, status = next.as_str(), "booking status updated");
        Ok(from_record(updated)?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BookingError> {
        match self.store.delete(Table::Bookings, id).await {
            Ok(()) => {
                tracing::info!(booking_id = id, "booking deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(BookingError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
