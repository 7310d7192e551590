//! WebAssembly module for the services marketplace
//!
//! Provides client-side computation for:
//! - Commission and growth figures on the business dashboard
//! - Booking list categorization, filtering and sorting
//! - Lifecycle action buttons
//! - Booking form validation
//!
//! Records cross the boundary as JSON strings and money as decimal strings,
//! matching the backend's wire format.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use shared::{
    available_actions, categorize, commission, conversion_rate, average_booking_value, filter,
    financial_overview, growth_rate, next_status, resolve_commission_rate, round_money, sort,
    validate_booking_time, validate_email, validate_phone, Booking, BookingAction, BookingFilter,
    BookingStatus, Business, CommissionDefaults, SortKey,
};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("marketplace-wasm loaded"));
}

fn parse_json<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_decimal(what: &str, value: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim())
        .map_err(|_| JsValue::from_str(&format!("Invalid {}: {}", what, value)))
}

fn parse_date(value: Option<String>) -> Result<NaiveDate, JsValue> {
    let value = value.unwrap_or_else(today);
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| JsValue::from_str(&format!("Invalid date: {}", value)))
}

/// Two decimal places, halves away from zero
fn fixed2(value: Decimal) -> String {
    let mut value = round_money(value);
    value.rescale(2);
    value.to_string()
}

/// Browser-local date as YYYY-MM-DD
fn today() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

/// Commission on `revenue` at `rate_percent`, rounded to cents
#[wasm_bindgen]
pub fn calculate_commission(revenue: &str, rate_percent: &str) -> Result<String, JsValue> {
    let revenue = parse_decimal("revenue", revenue)?;
    let rate = parse_decimal("rate", rate_percent)?;
    Ok(fixed2(commission(revenue, rate)))
}

/// Rate applied to a business, using the built-in category table
#[wasm_bindgen]
pub fn resolve_business_rate(business_json: &str) -> Result<String, JsValue> {
    let business: Business = parse_json("business", business_json)?;
    Ok(resolve_commission_rate(&business, &CommissionDefaults::builtin()).to_string())
}

/// Percentage growth from `previous` to `current`
#[wasm_bindgen]
pub fn calculate_growth_rate(current: &str, previous: &str) -> Result<String, JsValue> {
    let current = parse_decimal("current revenue", current)?;
    let previous = parse_decimal("previous revenue", previous)?;
    Ok(fixed2(growth_rate(current, previous)))
}

#[wasm_bindgen]
pub fn calculate_conversion_rate(bookings_json: &str) -> Result<String, JsValue> {
    let bookings: Vec<Booking> = parse_json("bookings", bookings_json)?;
    Ok(fixed2(conversion_rate(&bookings)))
}

#[wasm_bindgen]
pub fn calculate_average_booking_value(bookings_json: &str) -> Result<String, JsValue> {
    let bookings: Vec<Booking> = parse_json("bookings", bookings_json)?;
    Ok(fixed2(average_booking_value(&bookings)))
}

/// Platform overview for a list of businesses
#[wasm_bindgen]
pub fn build_financial_overview(businesses_json: &str) -> Result<String, JsValue> {
    let businesses: Vec<Business> = parse_json("businesses", businesses_json)?;
    to_json(&financial_overview(&businesses, &CommissionDefaults::builtin()))
}

/// Split bookings into upcoming, past and cancelled; `as_of` defaults to today
#[wasm_bindgen]
pub fn categorize_bookings(bookings_json: &str, as_of: Option<String>) -> Result<String, JsValue> {
    let bookings: Vec<Booking> = parse_json("bookings", bookings_json)?;
    let as_of = parse_date(as_of)?;
    to_json(&categorize(&bookings, as_of))
}

#[wasm_bindgen]
pub fn filter_bookings(bookings_json: &str, filter_json: &str) -> Result<String, JsValue> {
    let bookings: Vec<Booking> = parse_json("bookings", bookings_json)?;
    let criteria: BookingFilter = parse_json("filter", filter_json)?;
    to_json(&filter(&bookings, &criteria))
}

/// Sort by "date" or "amount", newest or largest first
#[wasm_bindgen]
pub fn sort_bookings(bookings_json: &str, key: &str) -> Result<String, JsValue> {
    let mut bookings: Vec<Booking> = parse_json("bookings", bookings_json)?;
    let key = SortKey::from_str(key)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown sort key: {}", key)))?;
    sort(&mut bookings, key);
    to_json(&bookings)
}

/// Actions to offer for a booking in `status`, as a JSON array
#[wasm_bindgen]
pub fn booking_actions(status: &str) -> Result<String, JsValue> {
    let status = BookingStatus::from_str(status)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown booking status: {}", status)))?;
    to_json(&available_actions(status))
}

/// Status a booking moves to after `action`, or None when not allowed
#[wasm_bindgen]
pub fn next_booking_status(status: &str, action: &str) -> Option<String> {
    let status = BookingStatus::from_str(status)?;
    let action = BookingAction::from_str(action)?;
    next_status(status, action).map(|s| s.as_str().to_string())
}

/// Check the booking form's contact and time fields; returns the first problem
#[wasm_bindgen]
pub fn validate_booking_form(email: &str, phone: &str, time: &str) -> Option<String> {
    validate_email(email)
        .and_then(|_| validate_phone(phone))
        .and_then(|_| validate_booking_time(time))
        .err()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKINGS: &str = r#"[
        {"id":"b1","customer_id":null,"business_id":"6f9c2a52-2d8f-4c3e-9a53-0c1f1e2a9b10",
         "service_id":"0b8e6f12-7a43-4e55-8d2c-3f6b1a9e7c21","service_name":"Home Cleaning",
         "business_name":"Sparkle","booking_date":"2024-06-20","booking_time":"09:00",
         "status":"confirmed","total_amount":"450.00","payment_status":"pending",
         "payment_method":"card","customer_name":"Naledi","customer_email":"naledi@example.com",
         "customer_phone":"0791234567","special_instructions":null,
         "created_at":"2024-06-01T10:00:00Z"},
        {"id":"b2","customer_id":null,"business_id":"6f9c2a52-2d8f-4c3e-9a53-0c1f1e2a9b10",
         "service_id":"0b8e6f12-7a43-4e55-8d2c-3f6b1a9e7c21","service_name":"Window Washing",
         "business_name":"Sparkle","booking_date":"2024-06-01","booking_time":"14:00",
         "status":"pending","total_amount":"150.00","payment_status":"pending",
         "payment_method":"cash","customer_name":"Pieter","customer_email":"pieter@example.com",
         "customer_phone":"0721234567","special_instructions":null,
         "created_at":"2024-05-20T10:00:00Z"}
    ]"#;

    #[test]
    fn test_commission_example() {
        assert_eq!(calculate_commission("1000", "8.5").unwrap(), "85.00");
        assert_eq!(calculate_commission("99.99", "10").unwrap(), "10.00");
    }

    #[test]
    fn test_growth_rate_guard() {
        assert_eq!(calculate_growth_rate("1500", "1000").unwrap(), "50.00");
        assert_eq!(calculate_growth_rate("1500", "0").unwrap(), "0.00");
    }

    #[test]
    fn test_booking_metrics() {
        assert_eq!(calculate_conversion_rate(BOOKINGS).unwrap(), "50.00");
        assert_eq!(calculate_average_booking_value(BOOKINGS).unwrap(), "300.00");
    }

    #[test]
    fn test_categorize_with_explicit_date() {
        let json = categorize_bookings(BOOKINGS, Some("2024-06-15".to_string())).unwrap();
        let split: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(split["upcoming"][0]["id"], "b1");
        assert_eq!(split["past"][0]["id"], "b2");
        assert_eq!(split["cancelled"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_filter_and_sort() {
        let found = filter_bookings(BOOKINGS, r#"{"search_term":"clean"}"#).unwrap();
        let found: Vec<Booking> = serde_json::from_str(&found).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b1");

        let sorted = sort_bookings(BOOKINGS, "amount").unwrap();
        let sorted: Vec<Booking> = serde_json::from_str(&sorted).unwrap();
        assert_eq!(sorted[0].id, "b1");
    }

    #[test]
    fn test_lifecycle_helpers() {
        assert_eq!(booking_actions("pending").unwrap(), r#"["confirm","cancel"]"#);
        assert_eq!(booking_actions("completed").unwrap(), "[]");
        assert_eq!(
            next_booking_status("confirmed", "start"),
            Some("in-progress".to_string())
        );
        assert_eq!(next_booking_status("completed", "cancel"), None);
    }

    #[test]
    fn test_booking_form_validation() {
        assert_eq!(validate_booking_form("a@b.co", "0821234567", "09:30"), None);
        assert!(validate_booking_form("a@b.co", "0821234567", "25:00").is_some());
        assert!(validate_booking_form("nope", "0821234567", "09:30").is_some());
    }
}
