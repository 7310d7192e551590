//! Business and service models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform approval state of a business
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl BusinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessStatus::Pending => "pending",
            BusinessStatus::Approved => "approved",
            BusinessStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BusinessStatus::Pending),
            "approved" => Some(BusinessStatus::Approved),
            "rejected" => Some(BusinessStatus::Rejected),
            _ => None,
        }
    }
}

/// A service provider registered on the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub category: String,
    pub status: BusinessStatus,
    /// Running average, 0-5
    pub rating: Decimal,
    pub total_reviews: i32,
    /// Explicit rate in percent; falls back to the category default when absent
    pub commission_rate: Option<Decimal>,
    pub verified: bool,
    pub featured: bool,
    /// Projection input for the admin financial overview
    pub monthly_bookings_count: i64,
    /// Projection input for the admin financial overview
    pub average_booking_value: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Business {
    /// Only approved businesses are discoverable and bookable
    pub fn is_bookable(&self) -> bool {
        self.status == BusinessStatus::Approved
    }
}

/// An offering owned by exactly one business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
