use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::validation::ValidationError;

/// Raw booking form as received from the web form or the chatbot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "dob")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Preferred consultation day, as the customer typed it.
    #[serde(default, alias = "date")]
    pub booking_date: Option<String>,
    #[serde(default, alias = "time")]
    pub booking_time: Option<String>,
}

/// A submission that passed every validation rule. Only
/// `services::validation::validate` can build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedBooking {
    name: String,
    phone: String,
    service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_time: Option<String>,
}

impl ValidatedBooking {
    pub(crate) fn new(
        name: String,
        phone: String,
        service: String,
        message: Option<String>,
        date_of_birth: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            name,
            phone,
            service,
            message,
            date_of_birth,
            email,
            booking_date: None,
            booking_time: None,
        }
    }

    pub(crate) fn with_preferred_slot(mut self, date: Option<String>, time: Option<String>) -> Self {
        self.booking_date = date;
        self.booking_time = time;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<&str> {
        self.date_of_birth.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn booking_date(&self) -> Option<&str> {
        self.booking_date.as_deref()
    }

    pub fn booking_time(&self) -> Option<&str> {
        self.booking_time.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Bookings only ever leave `pending`; confirmed and cancelled are final.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
        )
    }
}

/// Channel a booking arrived through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingSource {
    #[serde(rename = "web-form")]
    WebForm,
    #[serde(rename = "chatbot")]
    Chatbot,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::WebForm => "web-form",
            BookingSource::Chatbot => "chatbot",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRecord {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_time: Option<String>,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Rejected {
        reason: ValidationError,
    },
    Completed {
        record: BookingRecord,
        notification_sent: bool,
    },
}
