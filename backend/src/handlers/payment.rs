//! Payment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::TransactionStatus;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::PaymentService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    /// Defaults to a completed transaction
    pub status: Option<TransactionStatus>,
}

/// Record a payment against a booking
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(booking_id): Path<String>,
    Json(input): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }
    let service = PaymentService::new(state.gateway.clone());
    let status = input.status.unwrap_or(TransactionStatus::Completed);

    match service
        .record(&user, &booking_id, input.amount, &input.payment_method, status)
        .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}
