//! Booking HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{BookingAction, BookingFilter, DateRange, NewBooking, SortKey};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::BookingService;
use crate::AppState;

/// Booking form submission
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub business_id: Uuid,
    pub service_id: Uuid,
    pub booking_date: NaiveDate,
    #[validate(length(equal = 5, message = "Booking time must be in HH:MM format"))]
    pub booking_time: String,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[validate(length(min = 1, max = 255))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 9, max = 20))]
    pub customer_phone: String,
    #[validate(length(max = 1000))]
    pub special_instructions: Option<String>,
}

impl CreateBookingRequest {
    fn into_new_booking(self, customer_id: Option<Uuid>) -> NewBooking {
        NewBooking {
            customer_id,
            business_id: self.business_id,
            service_id: self.service_id,
            booking_date: self.booking_date,
            booking_time: self.booking_time,
            payment_method: self.payment_method,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            special_instructions: self.special_instructions,
        }
    }
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// A booking status or "all"
    pub status: Option<String>,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// "date" (default) or "amount"
    pub sort: Option<String>,
    /// Admins may narrow to one business
    pub business_id: Option<Uuid>,
    /// Reference date for upcoming/past; defaults to today
    pub as_of: Option<NaiveDate>,
}

impl ListBookingsQuery {
    fn criteria(&self) -> Result<(BookingFilter, SortKey), AppError> {
        let status = BookingFilter::parse_status(self.status.as_deref().unwrap_or("all"))
            .map_err(|msg| AppError::validation("status", msg))?;
        let date_range = match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => {
                return Err(AppError::validation("from", "Start date must not be after end date"))
            }
            (Some(from), Some(to)) => Some(DateRange::new(from, to)),
            (Some(from), None) => Some(DateRange::new(from, NaiveDate::MAX)),
            (None, Some(to)) => Some(DateRange::new(NaiveDate::MIN, to)),
            (None, None) => None,
        };
        let sort = match self.sort.as_deref() {
            None => SortKey::default(),
            Some(key) => SortKey::from_str(key)
                .ok_or_else(|| AppError::validation("sort", "Sort must be 'date' or 'amount'"))?,
        };

        Ok((
            BookingFilter {
                status,
                search_term: self.search.clone(),
                date_range,
            },
            sort,
        ))
    }
}

/// Lifecycle action request
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub action: String,
}

/// Create a booking for the signed-in customer
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }
    let service = BookingService::new(state.gateway.clone());

    match service
        .create_booking(input.into_new_booking(Some(user.user_id)), Utc::now().date_naive())
        .await
    {
        Ok(booking) => (StatusCode::CREATED, Json(booking)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a booking without an account (public endpoint)
pub async fn create_guest_booking(
    State(state): State<AppState>,
    Json(input): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }
    let service = BookingService::new(state.gateway.clone());

    match service
        .create_booking(input.into_new_booking(None), Utc::now().date_naive())
        .await
    {
        Ok(booking) => (StatusCode::CREATED, Json(booking)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the caller's bookings split into upcoming, past and cancelled
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListBookingsQuery>,
) -> impl IntoResponse {
    let (criteria, sort) = match query.criteria() {
        Ok(parsed) => parsed,
        Err(e) => return e.into_response(),
    };
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let service = BookingService::new(state.gateway.clone());

    match service
        .list_bookings(&user, query.business_id, &criteria, sort, as_of)
        .await
    {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single booking
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(booking_id): Path<String>,
) -> impl IntoResponse {
    let service = BookingService::new(state.gateway.clone());

    match service.get_booking(&user, &booking_id).await {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Apply a lifecycle action (confirm, start, complete, cancel)
pub async fn transition_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(booking_id): Path<String>,
    Json(input): Json<TransitionRequest>,
) -> impl IntoResponse {
    let Some(action) = BookingAction::from_str(input.action.trim()) else {
        return AppError::validation(
            "action",
            "Action must be one of confirm, start, complete, cancel",
        )
        .into_response();
    };
    let service = BookingService::new(state.gateway.clone())
        .with_rate_overrides(state.config.commission.category_rates.clone());

    match service.apply_action(&user, &booking_id, action).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}
