//! In-memory gateway for service tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    Booking, Business, BusinessStatus, CommissionDefaults, CommissionRecord,
    Payment, PaymentStatus, Review, Service,
};
use uuid::Uuid;

use super::{BookingQuery, MarketplaceGateway, StatusChange, StatusWrite};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Store {
    bookings: Vec<Booking>,
    businesses: HashMap<Uuid, Business>,
    services: HashMap<Uuid, Service>,
    defaults: CommissionDefaults,
    commissions: Vec<CommissionRecord>,
    payments: Vec<Payment>,
    reviews: Vec<Review>,
    /// Served once by `fetch_booking` in place of the stored record
    stale_reads: HashMap<String, Booking>,
    fail_commission_writes: bool,
}

#[derive(Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business(self, business: Business) -> Self {
        self.store.lock().unwrap().businesses.insert(business.id, business);
        self
    }

    pub fn with_service(self, service: Service) -> Self {
        self.store.lock().unwrap().services.insert(service.id, service);
        self
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.store.lock().unwrap().bookings.push(booking);
        self
    }

    pub fn with_defaults(self, defaults: CommissionDefaults) -> Self {
        self.store.lock().unwrap().defaults = defaults;
        self
    }

    /// Make the next `fetch_booking` return `snapshot` while the store keeps its own copy
    pub fn with_stale_read(self, snapshot: Booking) -> Self {
        self.store
            .lock()
            .unwrap()
            .stale_reads
            .insert(snapshot.id.clone(), snapshot);
        self
    }

    /// Fail any status change that carries a commission insert
    pub fn with_failing_commission_writes(self) -> Self {
        self.store.lock().unwrap().fail_commission_writes = true;
        self
    }

    pub fn commissions(&self) -> Vec<CommissionRecord> {
        self.store.lock().unwrap().commissions.clone()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.store.lock().unwrap().payments.clone()
    }

    pub fn business(&self, id: Uuid) -> Option<Business> {
        self.store.lock().unwrap().businesses.get(&id).cloned()
    }

    pub fn booking(&self, id: &str) -> Option<Booking> {
        self.store
            .lock()
            .unwrap()
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }
}

#[async_trait]
impl MarketplaceGateway for InMemoryGateway {
    async fn fetch_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .bookings
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect())
    }

    async fn fetch_booking(&self, id: &str) -> AppResult<Option<Booking>> {
        let snapshot = {
            let mut store = self.store.lock().unwrap();
            match store.stale_reads.remove(id) {
                Some(stale) => Some(stale),
                None => store.bookings.iter().find(|b| b.id == id).cloned(),
            }
        };
        // Let concurrent callers read before anyone writes
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if store.bookings.iter().any(|b| b.id == booking.id) {
            return Err(AppError::DuplicateEntry("Booking".to_string()));
        }
        store.bookings.push(booking.clone());
        Ok(())
    }

    async fn update_booking_status(&self, change: &StatusChange) -> AppResult<StatusWrite> {
        let mut store = self.store.lock().unwrap();
        let Some(index) = store
            .bookings
            .iter()
            .position(|b| b.id == change.booking_id && b.status == change.expected)
        else {
            return Ok(StatusWrite::Conflict);
        };

        // Every check runs before the first mutation so a failure writes nothing
        if let Some(record) = &change.commission {
            if store.fail_commission_writes {
                return Err(AppError::Internal("commission store unavailable".to_string()));
            }
            if store.commissions.iter().any(|c| c.booking_id == record.booking_id) {
                return Err(AppError::DuplicateEntry(
                    "Commission for this booking".to_string(),
                ));
            }
            store.commissions.push(record.clone());
        }

        let booking = &mut store.bookings[index];
        booking.status = change.new;
        if change.refund_if_paid && booking.payment_status == PaymentStatus::Paid {
            booking.payment_status = PaymentStatus::Refunded;
        }
        Ok(StatusWrite::Applied)
    }

    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        let booking = store
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
        booking.payment_status = status;
        Ok(())
    }

    async fn fetch_business(&self, id: Uuid) -> AppResult<Option<Business>> {
        Ok(self.business(id))
    }

    async fn fetch_businesses(&self, status: Option<BusinessStatus>) -> AppResult<Vec<Business>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .businesses
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect())
    }

    async fn update_business_status(&self, id: Uuid, status: BusinessStatus) -> AppResult<bool> {
        let mut store = self.store.lock().unwrap();
        Ok(store
            .businesses
            .get_mut(&id)
            .map(|b| b.status = status)
            .is_some())
    }

    async fn update_business_commission_rate(
        &self,
        id: Uuid,
        rate: Option<Decimal>,
    ) -> AppResult<bool> {
        let mut store = self.store.lock().unwrap();
        Ok(store
            .businesses
            .get_mut(&id)
            .map(|b| b.commission_rate = rate)
            .is_some())
    }

    async fn update_business_rating(
        &self,
        id: Uuid,
        rating: Decimal,
        total_reviews: i32,
    ) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(business) = store.businesses.get_mut(&id) {
            business.rating = rating;
            business.total_reviews = total_reviews;
        }
        Ok(())
    }

    async fn fetch_services(&self, business_id: Uuid) -> AppResult<Vec<Service>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .services
            .values()
            .filter(|s| s.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn fetch_service(&self, id: Uuid) -> AppResult<Option<Service>> {
        Ok(self.store.lock().unwrap().services.get(&id).cloned())
    }

    async fn fetch_commission_defaults(&self) -> AppResult<CommissionDefaults> {
        Ok(self.store.lock().unwrap().defaults.clone())
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        self.store.lock().unwrap().payments.push(payment.clone());
        Ok(())
    }

    async fn fetch_reviews(&self, business_id: Uuid) -> AppResult<Vec<Review>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .reviews
            .iter()
            .filter(|r| r.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn review_exists_for_booking(&self, booking_id: &str) -> AppResult<bool> {
        let store = self.store.lock().unwrap();
        Ok(store.reviews.iter().any(|r| r.booking_id == booking_id))
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if store.reviews.iter().any(|r| r.booking_id == review.booking_id) {
            return Err(AppError::DuplicateEntry("Review for this booking".to_string()));
        }
        store.reviews.push(review.clone());
        Ok(())
    }
}
