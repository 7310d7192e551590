//! Customer reviews of completed bookings

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{validate_rating, BookingStatus, Review};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::MarketplaceGateway;
use crate::middleware::AuthUser;
use crate::services::booking::is_booking_customer;

/// Review service backed by the persistence gateway
#[derive(Clone)]
pub struct ReviewService {
    gateway: Arc<dyn MarketplaceGateway>,
}

impl ReviewService {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self { gateway }
    }

    /// Record the single review allowed for a completed booking
    pub async fn submit(
        &self,
        user: &AuthUser,
        booking_id: &str,
        rating: i32,
        comment: Option<String>,
    ) -> AppResult<Review> {
        validate_rating(rating).map_err(|msg| AppError::validation("rating", msg))?;

        let booking = self
            .gateway
            .fetch_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;

        if !is_booking_customer(user, &booking) {
            return Err(AppError::Forbidden(
                "Only the customer who made the booking can review it".to_string(),
            ));
        }
        if booking.status != BookingStatus::Completed {
            return Err(AppError::validation(
                "booking_id",
                "Only completed bookings can be reviewed",
            ));
        }
        if self.gateway.review_exists_for_booking(&booking.id).await? {
            return Err(AppError::DuplicateEntry("Review for this booking".to_string()));
        }

        let review = Review {
            id: Uuid::new_v4(),
            booking_id: booking.id.clone(),
            business_id: booking.business_id,
            customer_id: booking.customer_id.or(Some(user.user_id)),
            rating,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            is_verified: true,
            created_at: Utc::now(),
        };
        self.gateway.insert_review(&review).await?;

        let (average, count) = self.refresh_rating(booking.business_id).await?;
        tracing::info!(
            booking_id = %review.booking_id,
            business_id = %review.business_id,
            rating = review.rating,
            average = %average,
            reviews = count,
            "Review recorded"
        );

        Ok(review)
    }

    /// Recompute the business rating from every stored review
    async fn refresh_rating(&self, business_id: Uuid) -> AppResult<(Decimal, i32)> {
        let reviews = self.gateway.fetch_reviews(business_id).await?;
        let count = reviews.len() as i32;
        let average = if reviews.is_empty() {
            Decimal::ZERO
        } else {
            let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
            (Decimal::from(total) / Decimal::from(count)).round_dp(2)
        };

        self.gateway
            .update_business_rating(business_id, average, count)
            .await?;
        Ok((average, count))
    }
}
