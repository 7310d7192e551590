//! Booking service: creation, listing and lifecycle transitions

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use shared::{
    categorize, commission, count_by_status, filter, resolve_commission_rate, round_money, sort,
    transition, validate_new_booking, Booking, BookingAction, BookingFilter, BookingStatus,
    CategorizedBookings, CommissionDefaults, CommissionRecord, CoreError, NewBooking,
    PaymentStatus, SortKey, StatusCounts, UserRole,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::{BookingQuery, MarketplaceGateway, StatusChange, StatusWrite};
use crate::middleware::AuthUser;
use crate::services::commission_table;

/// Booking service backed by the persistence gateway
#[derive(Clone)]
pub struct BookingService {
    gateway: Arc<dyn MarketplaceGateway>,
    rate_overrides: CommissionDefaults,
}

/// A caller's bookings split for the dashboard tabs
#[derive(Debug, Serialize)]
pub struct BookingOverview {
    #[serde(flatten)]
    pub bookings: CategorizedBookings,
    pub counts: StatusCounts,
}

/// Result of a successful lifecycle action
#[derive(Debug, Serialize)]
pub struct TransitionOutcome {
    pub booking: Booking,
    pub previous_status: BookingStatus,
    /// Present when the booking was completed
    pub commission: Option<CommissionRecord>,
}

impl BookingService {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self {
            gateway,
            rate_overrides: CommissionDefaults::default(),
        }
    }

    /// Category rates that win over the stored table
    pub fn with_rate_overrides(mut self, overrides: CommissionDefaults) -> Self {
        self.rate_overrides = overrides;
        self
    }

    /// Create a pending booking; the amount is taken from the service price
    pub async fn create_booking(&self, input: NewBooking, today: NaiveDate) -> AppResult<Booking> {
        validate_new_booking(&input, today)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let business = self
            .gateway
            .fetch_business(input.business_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Business".to_string()))?;
        if !business.is_bookable() {
            return Err(AppError::validation(
                "business_id",
                "This business is not accepting bookings",
            ));
        }

        let service = self
            .gateway
            .fetch_service(input.service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service".to_string()))?;
        if service.business_id != business.id {
            return Err(AppError::validation(
                "service_id",
                "Service does not belong to this business",
            ));
        }
        if !service.is_active {
            return Err(AppError::validation(
                "service_id",
                "This service is no longer offered",
            ));
        }

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            customer_id: input.customer_id,
            business_id: business.id,
            service_id: service.id,
            service_name: service.name,
            business_name: business.name,
            booking_date: input.booking_date,
            booking_time: input.booking_time,
            status: BookingStatus::Pending,
            total_amount: service.price,
            payment_status: PaymentStatus::Pending,
            payment_method: input.payment_method,
            customer_name: input.customer_name.trim().to_string(),
            customer_email: input.customer_email.trim().to_lowercase(),
            customer_phone: input.customer_phone,
            special_instructions: input.special_instructions,
            created_at: Utc::now(),
        };

        self.gateway.insert_booking(&booking).await?;
        tracing::info!(
            booking_id = %booking.id,
            business_id = %booking.business_id,
            amount = %booking.total_amount,
            "Booking created"
        );

        Ok(booking)
    }

    /// Fetch one booking the caller is allowed to see
    pub async fn get_booking(&self, user: &AuthUser, booking_id: &str) -> AppResult<Booking> {
        let booking = self.fetch(booking_id).await?;
        if !can_view(user, &booking) {
            // Do not reveal other people's bookings
            return Err(AppError::NotFound("Booking".to_string()));
        }
        Ok(booking)
    }

    /// The caller's bookings, filtered and sorted, split relative to `as_of`
    pub async fn list_bookings(
        &self,
        user: &AuthUser,
        business_id: Option<Uuid>,
        criteria: &BookingFilter,
        sort_key: SortKey,
        as_of: NaiveDate,
    ) -> AppResult<BookingOverview> {
        let mut query = self.scope_query(user, business_id)?;
        query.date_range = criteria.date_range;
        let fetched = self.gateway.fetch_bookings(&query).await?;

        let mut bookings = filter(&fetched, criteria);
        sort(&mut bookings, sort_key);

        Ok(BookingOverview {
            counts: count_by_status(&bookings),
            bookings: categorize(&bookings, as_of),
        })
    }

    /// Apply a lifecycle action with a conditional status write
    ///
    /// The commission record is resolved before the write and committed with
    /// it, as is the refund of a paid booking on cancel. A lost race or a
    /// failed side effect leaves the booking untouched.
    pub async fn apply_action(
        &self,
        user: &AuthUser,
        booking_id: &str,
        action: BookingAction,
    ) -> AppResult<TransitionOutcome> {
        let booking = self.fetch(booking_id).await?;
        authorize_action(user, &booking, action)?;

        let planned = transition(&booking, action)?;

        let mut change = StatusChange::new(booking.id.clone(), planned.from, planned.to);
        let commission = match planned.to {
            BookingStatus::Completed => Some(self.plan_commission(&booking).await?),
            _ => None,
        };
        if let Some(record) = &commission {
            change = change.with_commission(record.clone());
        }
        if planned.to == BookingStatus::Cancelled {
            change = change.refunding_payment();
        }

        match self.gateway.update_booking_status(&change).await? {
            StatusWrite::Applied => {}
            StatusWrite::Conflict => {
                tracing::warn!(
                    booking_id = %booking.id,
                    expected = %planned.from,
                    action = %action,
                    "Booking status changed concurrently"
                );
                return Err(CoreError::ConflictingUpdate {
                    booking_id: booking.id,
                    expected: planned.from,
                }
                .into());
            }
        }

        let updated = self.fetch(&booking.id).await?;
        tracing::info!(
            booking_id = %updated.id,
            from = %planned.from,
            to = %planned.to,
            actor = %user.user_id,
            "Booking status updated"
        );
        if let Some(record) = &commission {
            tracing::info!(
                booking_id = %record.booking_id,
                rate = %record.rate_percent,
                amount = %record.commission_amount,
                "Commission recorded"
            );
        }
        if planned.to == BookingStatus::Cancelled
            && updated.payment_status == PaymentStatus::Refunded
            && booking.payment_status != PaymentStatus::Refunded
        {
            tracing::info!(booking_id = %updated.id, "Paid booking cancelled, marked refunded");
        }

        Ok(TransitionOutcome {
            booking: updated,
            previous_status: planned.from,
            commission,
        })
    }

    /// Commission owed on `booking` at the business's resolved rate
    async fn plan_commission(&self, booking: &Booking) -> AppResult<CommissionRecord> {
        let business = self
            .gateway
            .fetch_business(booking.business_id)
            .await?
            .ok_or_else(|| CoreError::malformed("booking", "business_id has no business"))?;
        let defaults = commission_table(self.gateway.as_ref(), &self.rate_overrides).await?;
        let rate = resolve_commission_rate(&business, &defaults);

        Ok(CommissionRecord {
            id: Uuid::new_v4(),
            booking_id: booking.id.clone(),
            business_id: booking.business_id,
            booking_amount: booking.total_amount,
            rate_percent: rate,
            commission_amount: round_money(commission(booking.total_amount, rate)),
            created_at: Utc::now(),
        })
    }

    async fn fetch(&self, booking_id: &str) -> AppResult<Booking> {
        self.gateway
            .fetch_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))
    }

    /// Which bookings a caller may list
    fn scope_query(&self, user: &AuthUser, business_id: Option<Uuid>) -> AppResult<BookingQuery> {
        match user.role {
            UserRole::Customer => Ok(BookingQuery::for_customer(&user.email)),
            UserRole::BusinessOwner => {
                let own = user
                    .business_id
                    .ok_or_else(|| AppError::Forbidden("No business on this account".to_string()))?;
                if business_id.is_some_and(|requested| requested != own) {
                    return Err(AppError::Forbidden(
                        "You do not manage this business".to_string(),
                    ));
                }
                Ok(BookingQuery::for_business(own))
            }
            UserRole::Admin => Ok(BookingQuery {
                business_id,
                ..Default::default()
            }),
        }
    }
}

/// Matched on account id, or on email for bookings made as a guest
pub(crate) fn is_booking_customer(user: &AuthUser, booking: &Booking) -> bool {
    booking.customer_id == Some(user.user_id)
        || booking.customer_email.eq_ignore_ascii_case(&user.email)
}

pub(crate) fn can_view(user: &AuthUser, booking: &Booking) -> bool {
    user.manages_business(booking.business_id) || is_booking_customer(user, booking)
}

/// Owners and admins drive the lifecycle; customers may only cancel their own booking
fn authorize_action(user: &AuthUser, booking: &Booking, action: BookingAction) -> AppResult<()> {
    if user.manages_business(booking.business_id) {
        return Ok(());
    }
    if is_booking_customer(user, booking) {
        if action == BookingAction::Cancel {
            return Ok(());
        }
        return Err(AppError::Forbidden(format!(
            "Customers cannot {} a booking",
            action
        )));
    }
    Err(AppError::NotFound("Booking".to_string()))
}
