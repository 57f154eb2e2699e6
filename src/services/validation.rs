use chrono::{Months, NaiveDate};

use crate::models::{BookingSubmission, ValidatedBooking};

const MIN_AGE_YEARS: u32 = 5;
const MAX_AGE_YEARS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name must be at least 2 characters and contain only letters")]
    InvalidName,
    #[error("Please enter a valid 10-digit Indian mobile number")]
    InvalidPhone,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat,
    #[error("Date of birth cannot be in the future")]
    FutureDob,
    #[error("Minimum age is 5 years")]
    TooYoung,
    #[error("Please enter a valid date of birth")]
    ImplausibleAge,
    #[error("Please select a service")]
    MissingService,
}

/// Checks a booking submission against the intake rules, relative to `today`.
///
/// Rules run in order (name, phone, email, date of birth, service) and the
/// first failure is returned.
pub fn validate(
    submission: &BookingSubmission,
    today: NaiveDate,
) -> Result<ValidatedBooking, ValidationError> {
    let name = validate_name(&submission.name)?;
    let phone = normalize_phone(&submission.phone)?;

    let email = non_empty(submission.email.as_deref());
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
    }

    let date_of_birth = non_empty(submission.date_of_birth.as_deref());
    if let Some(dob) = &date_of_birth {
        check_date_of_birth(dob, today)?;
    }

    let service = submission.service.trim();
    if service.is_empty() {
        return Err(ValidationError::MissingService);
    }

    Ok(ValidatedBooking::new(
        name,
        phone,
        service.to_string(),
        non_empty(submission.message.as_deref()),
        date_of_birth,
        email,
    )
    .with_preferred_slot(
        non_empty(submission.booking_date.as_deref()),
        non_empty(submission.booking_time.as_deref()),
    ))
}

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.chars().count() < 2 || !name.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(ValidationError::InvalidName);
    }
    Ok(name.to_string())
}

/// Strips everything but digits; the result must be a 10-digit Indian mobile
/// number starting with 6, 7, 8 or 9.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 || !matches!(digits.as_bytes()[0], b'6'..=b'9') {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(digits)
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && !host.starts_with('.')
        && !host.ends_with('.')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn check_date_of_birth(raw: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let dob = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateFormat)?;

    if dob > today {
        return Err(ValidationError::FutureDob);
    }

    // Compare on the calendar so a birthday exactly N years ago counts as N.
    let old_enough = dob
        .checked_add_months(Months::new(MIN_AGE_YEARS * 12))
        .is_some_and(|fifth_birthday| fifth_birthday <= today);
    if !old_enough {
        return Err(ValidationError::TooYoung);
    }

    let plausible = dob
        .checked_add_months(Months::new(MAX_AGE_YEARS * 12))
        .map_or(true, |limit| limit >= today);
    if !plausible {
        return Err(ValidationError::ImplausibleAge);
    }

    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn submission(name: &str, phone: &str) -> BookingSubmission {
        BookingSubmission {
            name: name.to_string(),
            phone: phone.to_string(),
            service: "Kundali Reading".to_string(),
            ..Default::default()
        }
    }

    fn with_dob(dob: &str) -> BookingSubmission {
        BookingSubmission {
            date_of_birth: Some(dob.to_string()),
            ..submission("Asha Rao", "9876543210")
        }
    }

    #[test]
    fn test_valid_submission_is_normalized() {
        let sub = BookingSubmission {
            message: Some("  career question  ".to_string()),
            email: Some("".to_string()),
            ..submission("  Asha Rao ", "98765 43210")
        };
        let booking = validate(&sub, today()).unwrap();
        assert_eq!(booking.name(), "Asha Rao");
        assert_eq!(booking.phone(), "9876543210");
        assert_eq!(booking.message(), Some("career question"));
        assert_eq!(booking.email(), None);
    }

    #[test]
    fn test_phone_formatting_is_stripped() {
        let booking = validate(&submission("Asha Rao", "98765-432 10"), today()).unwrap();
        assert_eq!(booking.phone(), "9876543210");
    }

    #[test]
    fn test_phone_rules() {
        for bad in ["123", "5876543210", "98765432101", "", "abcdefghij"] {
            assert_eq!(
                validate(&submission("Asha Rao", bad), today()),
                Err(ValidationError::InvalidPhone),
                "phone {bad:?} should be rejected"
            );
        }
        for good in ["6000000000", "7123456789", "8123456789", "9123456789"] {
            assert!(validate(&submission("Asha Rao", good), today()).is_ok());
        }
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(validate(&submission("A", "9876543210"), today()), Err(ValidationError::InvalidName));
        assert_eq!(validate(&submission("   ", "9876543210"), today()), Err(ValidationError::InvalidName));
        assert_eq!(validate(&submission("R2D2", "9876543210"), today()), Err(ValidationError::InvalidName));
        assert_eq!(validate(&submission("Asha-Rao", "9876543210"), today()), Err(ValidationError::InvalidName));
        assert!(validate(&submission("Al", "9876543210"), today()).is_ok());
    }

    #[test]
    fn test_name_checked_before_phone() {
        assert_eq!(validate(&submission("X", "123"), today()), Err(ValidationError::InvalidName));
    }

    #[test]
    fn test_email_rules() {
        let mut sub = submission("Asha Rao", "9876543210");
        sub.email = Some("asha@example".to_string());
        assert_eq!(validate(&sub, today()), Err(ValidationError::InvalidEmail));
        sub.email = Some("asha example.com".to_string());
        assert_eq!(validate(&sub, today()), Err(ValidationError::InvalidEmail));
        sub.email = Some("asha@example.in".to_string());
        assert_eq!(validate(&sub, today()).unwrap().email(), Some("asha@example.in"));
    }

    #[test]
    fn test_dob_format() {
        assert_eq!(validate(&with_dob("15/06/1990"), today()), Err(ValidationError::InvalidDateFormat));
        assert_eq!(validate(&with_dob("1990-13-01"), today()), Err(ValidationError::InvalidDateFormat));
    }

    #[test]
    fn test_dob_in_future() {
        assert_eq!(validate(&with_dob("2025-06-16"), today()), Err(ValidationError::FutureDob));
    }

    #[test]
    fn test_five_year_boundary_is_inclusive() {
        assert!(validate(&with_dob("2020-06-15"), today()).is_ok());
        assert_eq!(validate(&with_dob("2020-06-16"), today()), Err(ValidationError::TooYoung));
    }

    #[test]
    fn test_implausible_age() {
        assert!(validate(&with_dob("1905-06-15"), today()).is_ok());
        assert_eq!(validate(&with_dob("1905-06-14"), today()), Err(ValidationError::ImplausibleAge));
    }

    #[test]
    fn test_missing_service() {
        let mut sub = submission("Asha Rao", "9876543210");
        sub.service = "  ".to_string();
        assert_eq!(validate(&sub, today()), Err(ValidationError::MissingService));
    }
}
