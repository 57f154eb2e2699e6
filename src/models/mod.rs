pub mod booking;
pub mod business;
pub mod contact;
pub mod intent;

pub use booking::{BookingOutcome, BookingRecord, BookingSource, BookingStatus, BookingSubmission, ValidatedBooking};
pub use business::{BusinessConfig, ConfigKey};
pub use contact::{ContactMessage, ContactSubmission};
pub use intent::{ClientAction, Intent, ResponseCategory, ResponsePayload};
