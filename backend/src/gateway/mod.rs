//! Persistence gateway
//!
//! The narrow read/write contract the booking core needs from the record
//! store. `PgGateway` is the production implementation; `memory` backs the
//! service tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    Booking, BookingStatus, Business, BusinessStatus, CommissionDefaults, CommissionRecord,
    DateRange, Payment, PaymentStatus, Review, Service,
};
use uuid::Uuid;

use crate::error::AppResult;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgGateway;

/// Selection for `fetch_bookings`; set fields are combined with AND
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub business_id: Option<Uuid>,
    /// Matched case-insensitively
    pub customer_email: Option<String>,
    /// Inclusive, on `booking_date`
    pub date_range: Option<DateRange>,
}

impl BookingQuery {
    pub fn for_business(business_id: Uuid) -> Self {
        Self {
            business_id: Some(business_id),
            ..Default::default()
        }
    }

    pub fn for_customer(email: &str) -> Self {
        Self {
            customer_email: Some(email.to_string()),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.business_id.map_or(true, |id| booking.business_id == id)
            && self
                .customer_email
                .as_deref()
                .map_or(true, |email| booking.customer_email.eq_ignore_ascii_case(email))
            && self
                .date_range
                .map_or(true, |range| range.contains(booking.booking_date))
    }
}

/// A conditional status write and the writes that must commit with it
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub booking_id: String,
    pub expected: BookingStatus,
    pub new: BookingStatus,
    /// Inserted only if the status write applies
    pub commission: Option<CommissionRecord>,
    /// Move a `paid` booking to `refunded` in the same write
    pub refund_if_paid: bool,
}

impl StatusChange {
    pub fn new(booking_id: impl Into<String>, expected: BookingStatus, new: BookingStatus) -> Self {
        Self {
            booking_id: booking_id.into(),
            expected,
            new,
            commission: None,
            refund_if_paid: false,
        }
    }

    pub fn with_commission(mut self, record: CommissionRecord) -> Self {
        self.commission = Some(record);
        self
    }

    pub fn refunding_payment(mut self) -> Self {
        self.refund_if_paid = true;
        self
    }
}

/// Outcome of a conditional status write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    Applied,
    /// The stored status no longer matched the expected one
    Conflict,
}

#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    async fn fetch_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>>;

    async fn fetch_booking(&self, id: &str) -> AppResult<Option<Booking>>;

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()>;

    /// Set `status = new` only where the stored status is still `expected`
    ///
    /// The commission insert and refund in `change` are applied in the same
    /// transaction; on `Conflict` or error nothing is written.
    async fn update_booking_status(&self, change: &StatusChange) -> AppResult<StatusWrite>;

    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> AppResult<()>;

    async fn fetch_business(&self, id: Uuid) -> AppResult<Option<Business>>;

    async fn fetch_businesses(&self, status: Option<BusinessStatus>) -> AppResult<Vec<Business>>;

    /// Returns false when no business has this id
    async fn update_business_status(&self, id: Uuid, status: BusinessStatus) -> AppResult<bool>;

    /// Returns false when no business has this id
    async fn update_business_commission_rate(
        &self,
        id: Uuid,
        rate: Option<Decimal>,
    ) -> AppResult<bool>;

    async fn update_business_rating(
        &self,
        id: Uuid,
        rating: Decimal,
        total_reviews: i32,
    ) -> AppResult<()>;

    async fn fetch_services(&self, business_id: Uuid) -> AppResult<Vec<Service>>;

    async fn fetch_service(&self, id: Uuid) -> AppResult<Option<Service>>;

    async fn fetch_commission_defaults(&self) -> AppResult<CommissionDefaults>;

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()>;

    async fn fetch_reviews(&self, business_id: Uuid) -> AppResult<Vec<Review>>;

    async fn review_exists_for_booking(&self, booking_id: &str) -> AppResult<bool>;

    async fn insert_review(&self, review: &Review) -> AppResult<()>;
}
