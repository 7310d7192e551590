//! Booking models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled appointment between a customer and a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    /// None for guest bookings
    pub customer_id: Option<Uuid>,
    pub business_id: Uuid,
    pub service_id: Uuid,
    /// Joined from the services collection at fetch time
    pub service_name: String,
    /// Joined from the businesses collection at fetch time
    pub business_name: String,
    pub booking_date: NaiveDate,
    /// 24-hour "HH:MM"
    pub booking_time: String,
    pub status: BookingStatus,
    /// Fixed at creation from the service price
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in-progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states accept no further actions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state recorded on the booking itself
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Input for submitting a booking form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub customer_id: Option<Uuid>,
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub payment_method: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub special_instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(BookingStatus::InProgress).unwrap(),
            json!("in-progress")
        );
        assert_eq!(serde_json::to_value(PaymentStatus::Paid).unwrap(), json!("paid"));
        for status in BookingStatus::ALL {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, json!(status.as_str()));
        }
    }

    #[test]
    fn test_booking_amount_travels_as_string() {
        let booking = Booking {
            id: "bk-1".to_string(),
            customer_id: None,
            business_id: Uuid::nil(),
            service_id: Uuid::nil(),
            service_name: "Deep Clean".to_string(),
            business_name: "Sparkle".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            booking_time: "09:00".to_string(),
            status: BookingStatus::Pending,
            total_amount: Decimal::new(45050, 2),
            payment_status: PaymentStatus::Pending,
            payment_method: "card".to_string(),
            customer_name: "Naledi".to_string(),
            customer_email: "naledi@example.com".to_string(),
            customer_phone: "0791234567".to_string(),
            special_instructions: None,
            created_at: Utc::now(),
        };

        let wire = serde_json::to_value(&booking).unwrap();
        assert_eq!(wire["total_amount"], json!("450.50"));
        assert_eq!(wire["booking_date"], json!("2024-06-20"));

        let back: Booking = serde_json::from_value(wire).unwrap();
        assert_eq!(back, booking);
    }
}
