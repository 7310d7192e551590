//! Revenue analytics and the platform financial overview

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::{
    count_by_status, financial_overview, monthly_breakdown, resolve_commission_rate,
    revenue_summary, upcoming_within, Booking, BusinessStatus, CommissionDefaults,
    FinancialOverview, MonthlyRevenue, Period, RevenueSummary, StatusCounts,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::gateway::{BookingQuery, MarketplaceGateway};
use crate::middleware::AuthUser;
use crate::services::commission_table;

/// Finance service backed by the persistence gateway
#[derive(Clone)]
pub struct FinanceService {
    gateway: Arc<dyn MarketplaceGateway>,
    rate_overrides: CommissionDefaults,
}

/// Everything a business owner's landing page shows
#[derive(Debug, Serialize)]
pub struct BusinessDashboard {
    pub business_id: Uuid,
    pub business_name: String,
    pub summary: RevenueSummary,
    pub status_counts: StatusCounts,
    /// Not cancelled, within the configured window
    pub coming_up: Vec<Booking>,
}

impl FinanceService {
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

    /// Ledger summary for one calendar month against the month before
    pub async fn business_summary(
        &self,
        user: &AuthUser,
        business_id: Uuid,
        year: i32,
        month: u32,
    ) -> AppResult<RevenueSummary> {
        user.require_business(business_id)?;
        let period = Period::month(year, month)
            .ok_or_else(|| AppError::validation("month", "Month must be between 1 and 12"))?;
        let previous = period
            .previous_month()
            .ok_or_else(|| AppError::validation("year", "Year is out of range"))?;

        let query = BookingQuery::for_business(business_id);
        let (business, bookings, defaults) = tokio::try_join!(
            self.gateway.fetch_business(business_id),
            self.gateway.fetch_bookings(&query),
            commission_table(self.gateway.as_ref(), &self.rate_overrides),
        )?;
        let business = business.ok_or_else(|| AppError::NotFound("Business".to_string()))?;
        let rate = resolve_commission_rate(&business, &defaults);

        tracing::debug!(
            business_id = %business_id,
            bookings = bookings.len(),
            rate = %rate,
            "Building revenue summary"
        );

        Ok(revenue_summary(&bookings, period, previous, rate))
    }

    /// Ledger revenue per calendar month of `year`
    pub async fn monthly(
        &self,
        user: &AuthUser,
        business_id: Uuid,
        year: i32,
    ) -> AppResult<Vec<MonthlyRevenue>> {
        user.require_business(business_id)?;
        if self.gateway.fetch_business(business_id).await?.is_none() {
            return Err(AppError::NotFound("Business".to_string()));
        }

        let bookings = self
            .gateway
            .fetch_bookings(&BookingQuery::for_business(business_id))
            .await?;
        Ok(monthly_breakdown(&bookings, year))
    }

    /// Projected platform revenue and commission across approved businesses
    pub async fn overview(&self, user: &AuthUser) -> AppResult<FinancialOverview> {
        user.require_admin()?;

        let (businesses, defaults) = tokio::try_join!(
            self.gateway.fetch_businesses(Some(BusinessStatus::Approved)),
            commission_table(self.gateway.as_ref(), &self.rate_overrides),
        )?;
        let overview = financial_overview(&businesses, &defaults);

        tracing::info!(
            businesses = overview.businesses.len(),
            monthly_revenue = %overview.total_monthly_revenue,
            monthly_commission = %overview.total_monthly_commission,
            "Financial overview generated"
        );

        Ok(overview)
    }

    /// This month's summary, status badges and the bookings coming up soon
    pub async fn dashboard(
        &self,
        user: &AuthUser,
        business_id: Uuid,
        today: NaiveDate,
        window_days: i64,
    ) -> AppResult<BusinessDashboard> {
        user.require_business(business_id)?;
        let period = Period::month(today.year(), today.month())
            .ok_or_else(|| AppError::validation("today", "Date is out of range"))?;
        let previous = period
            .previous_month()
            .ok_or_else(|| AppError::Internal("Previous month is out of range".to_string()))?;

        let query = BookingQuery::for_business(business_id);
        let (business, bookings, defaults) = tokio::try_join!(
            self.gateway.fetch_business(business_id),
            self.gateway.fetch_bookings(&query),
            commission_table(self.gateway.as_ref(), &self.rate_overrides),
        )?;
        let business = business.ok_or_else(|| AppError::NotFound("Business".to_string()))?;
        let rate = resolve_commission_rate(&business, &defaults);

        let mut coming_up = upcoming_within(&bookings, today, window_days);
        coming_up.sort_by(|a, b| {
            (a.booking_date, &a.booking_time).cmp(&(b.booking_date, &b.booking_time))
        });

        Ok(BusinessDashboard {
            business_id: business.id,
            business_name: business.name,
            summary: revenue_summary(&bookings, period, previous, rate),
            status_counts: count_by_status(&bookings),
            coming_up,
        })
    }
}
