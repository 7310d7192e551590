//! Validation utilities for the services marketplace
//!
//! Records must pass these checks before they reach the calculator, which
//! assumes well-formed input.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::models::NewBooking;

// ============================================================================
// Booking Validations
// ============================================================================

/// Validate a 24-hour "HH:MM" time of day
pub fn validate_booking_time(time: &str) -> Result<(), &'static str> {
    if time.len() != 5 {
        return Err("Booking time must be in HH:MM format");
    }
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| "Booking time must be a valid 24-hour HH:MM time")
}

/// Bookings cannot be placed for a date before `today`
pub fn validate_booking_date(date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if date < today {
        return Err("Booking date cannot be in the past");
    }
    Ok(())
}

/// Validate a booking total (zero is allowed for free services)
pub fn validate_booking_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Booking amount cannot be negative");
    }
    Ok(())
}

/// Validate a submitted booking form
pub fn validate_new_booking(input: &NewBooking, today: NaiveDate) -> Result<(), &'static str> {
    if input.customer_name.trim().is_empty() {
        return Err("Customer name is required");
    }
    validate_email(&input.customer_email)?;
    validate_phone(&input.customer_phone)?;
    validate_booking_time(&input.booking_time)?;
    validate_booking_date(input.booking_date, today)?;
    if input.payment_method.trim().is_empty() {
        return Err("Payment method is required");
    }
    Ok(())
}

// ============================================================================
// Catalog and Commission Validations
// ============================================================================

pub fn validate_service_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Service price must be greater than zero");
    }
    Ok(())
}

pub fn validate_duration_minutes(minutes: i32) -> Result<(), &'static str> {
    if minutes <= 0 {
        return Err("Service duration must be greater than zero");
    }
    Ok(())
}

/// Commission rates are percentages between 0 and 100
pub fn validate_commission_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err("Commission rate must be between 0 and 100");
    }
    Ok(())
}

/// Review ratings are whole stars from 1 to 5
pub fn validate_rating(rating: i32) -> Result<(), &'static str> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate a phone number: 9 to 15 digits, optional leading +, common separators
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')');
    if !phone.chars().all(allowed) {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(9..=15).contains(&digits) {
        return Err("Phone number must have between 9 and 15 digits");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_booking() -> NewBooking {
        NewBooking {
            customer_id: None,
            business_id: Uuid::nil(),
            service_id: Uuid::nil(),
            booking_date: date("2024-06-20"),
            booking_time: "14:30".to_string(),
            payment_method: "payfast".to_string(),
            customer_name: "Sipho Ndlovu".to_string(),
            customer_email: "sipho@example.co.za".to_string(),
            customer_phone: "+27 82 123 4567".to_string(),
            special_instructions: None,
        }
    }

    // ========================================================================
    // Booking Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_booking_time() {
        assert!(validate_booking_time("00:00").is_ok());
        assert!(validate_booking_time("23:59").is_ok());
        assert!(validate_booking_time("24:00").is_err());
        assert!(validate_booking_time("9:30").is_err());
        assert!(validate_booking_time("09:60").is_err());
        assert!(validate_booking_time("noon").is_err());
    }

    #[test]
    fn test_validate_booking_date() {
        let today = date("2024-06-15");
        assert!(validate_booking_date(date("2024-06-15"), today).is_ok());
        assert!(validate_booking_date(date("2024-06-14"), today).is_err());
    }

    #[test]
    fn test_validate_booking_amount() {
        assert!(validate_booking_amount(Decimal::ZERO).is_ok());
        assert!(validate_booking_amount(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_new_booking() {
        let today = date("2024-06-15");
        assert!(validate_new_booking(&new_booking(), today).is_ok());

        let mut guest = new_booking();
        guest.customer_name = "  ".to_string();
        assert!(validate_new_booking(&guest, today).is_err());

        let mut bad_time = new_booking();
        bad_time.booking_time = "2pm".to_string();
        assert!(validate_new_booking(&bad_time, today).is_err());
    }

    // ========================================================================
    // Catalog Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_service_price_and_duration() {
        assert!(validate_service_price(Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_service_price(Decimal::ZERO).is_err());
        assert!(validate_duration_minutes(30).is_ok());
        assert!(validate_duration_minutes(0).is_err());
    }

    #[test]
    fn test_validate_commission_rate() {
        assert!(validate_commission_rate(Decimal::from_str("8.5").unwrap()).is_ok());
        assert!(validate_commission_rate(Decimal::ZERO).is_ok());
        assert!(validate_commission_rate(Decimal::from(100)).is_ok());
        assert!(validate_commission_rate(Decimal::from(101)).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.za").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0821234567").is_ok());
        assert!(validate_phone("+27 82 123 4567").is_ok());
        assert!(validate_phone("082-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("082 CALL ME").is_err());
    }
}
