//! Form validation performed before a request is sent

use chrono::{Datelike, NaiveDate};

use crate::error::Error;

/// Youngest age accepted for a member.
pub const MINIMUM_AGE: i32 = 16;

const DOB_FORMATS: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

pub fn require_non_empty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} is required.", field)));
    }
    Ok(())
}

/// Accepts an optional leading `+` followed by 10 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), Error> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(Error::validation(
            "Please enter a valid phone number (10-15 digits).",
        ));
    }
    Ok(())
}

pub fn parse_dob(dob: &str) -> Option<NaiveDate> {
    let dob = dob.trim();
    DOB_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(dob, format).ok())
}

/// Full years between `dob` and `today`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Parses the date of birth and checks the member is at least
/// [`MINIMUM_AGE`] on `today`.
pub fn validate_dob(dob: &str, today: NaiveDate) -> Result<NaiveDate, Error> {
    let date = parse_dob(dob)
        .filter(|date| *date <= today && age_on(*date, today) >= MINIMUM_AGE)
        .ok_or_else(|| {
            Error::validation(
                "Please select a valid date of birth (must be at least 16 years old).",
            )
        })?;
    Ok(date)
}
