//! Payment recording against bookings

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{Payment, PaymentStatus, TransactionStatus};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::MarketplaceGateway;
use crate::middleware::AuthUser;
use crate::services::booking::can_view;

/// Payment service backed by the persistence gateway
#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn MarketplaceGateway>,
}

/// Booking payment status implied by a transaction outcome
fn booking_payment_status(status: TransactionStatus) -> Option<PaymentStatus> {
    match status {
        TransactionStatus::Pending => None,
        TransactionStatus::Completed => Some(PaymentStatus::Paid),
        TransactionStatus::Failed => Some(PaymentStatus::Failed),
        TransactionStatus::Refunded => Some(PaymentStatus::Refunded),
    }
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self { gateway }
    }

    /// Record a transaction and carry its outcome onto the booking
    pub async fn record(
        &self,
        user: &AuthUser,
        booking_id: &str,
        amount: Decimal,
        payment_method: &str,
        status: TransactionStatus,
    ) -> AppResult<Payment> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("amount", "Payment amount must be greater than zero"));
        }
        if payment_method.trim().is_empty() {
            return Err(AppError::validation("payment_method", "Payment method is required"));
        }

        let booking = self
            .gateway
            .fetch_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
        if !can_view(user, &booking) {
            return Err(AppError::NotFound("Booking".to_string()));
        }
        if booking.is_cancelled() && status == TransactionStatus::Completed {
            return Err(AppError::validation(
                "booking_id",
                "Cannot take payment for a cancelled booking",
            ));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: booking.id.clone(),
            amount,
            payment_method: payment_method.trim().to_string(),
            status,
            created_at: Utc::now(),
        };
        self.gateway.insert_payment(&payment).await?;

        if let Some(payment_status) = booking_payment_status(status) {
            self.gateway
                .update_payment_status(&booking.id, payment_status)
                .await?;
        }
        tracing::info!(
            booking_id = %payment.booking_id,
            amount = %payment.amount,
            status = payment.status.as_str(),
            "Payment recorded"
        );

        Ok(payment)
    }
}
