//! Commission and revenue calculations
//!
//! Everything here is a total function over already-fetched records. Money is
//! `Decimal` end to end; rounding to cents happens only when a summary is
//! assembled for display.
//!
//! Two revenue models coexist. [`monthly_revenue`] is the admin overview's
//! projection (`bookings per month × average value`), while
//! [`revenue_for_period`] is the ledger sum used by analytics. They will
//! disagree on real data and are never substituted for one another.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregation::{count_by_status, StatusCounts};
use crate::models::{Booking, BookingStatus, Business, CommissionDefaults, FALLBACK_COMMISSION_RATE};

const MONTHS_PER_YEAR: i64 = 12;

/// Half-open timestamp window `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The calendar month `year-month` in UTC
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start: Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
            end: Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
        })
    }

    /// The calendar month immediately before this period's start month
    pub fn previous_month(&self) -> Option<Self> {
        let (year, month) = match self.start.month() {
            1 => (self.start.year() - 1, 12),
            m => (self.start.year(), m - 1),
        };
        Self::month(year, month)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Round a money amount to cents, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Projected monthly revenue for the admin overview
pub fn monthly_revenue(business: &Business) -> Decimal {
    Decimal::from(business.monthly_bookings_count) * business.average_booking_value
}

pub fn annual_revenue(business: &Business) -> Decimal {
    monthly_revenue(business) * Decimal::from(MONTHS_PER_YEAR)
}

/// Ledger revenue: sum of `total_amount` for bookings created in `[start, end)`
pub fn revenue_for_period(bookings: &[Booking], start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    bookings
        .iter()
        .filter(|b| start <= b.created_at && b.created_at < end)
        .map(|b| b.total_amount)
        .sum()
}

/// `revenue × rate / 100`
pub fn commission(revenue: Decimal, rate_percent: Decimal) -> Decimal {
    revenue * (rate_percent / Decimal::ONE_HUNDRED)
}

/// Resolve the rate for a business: explicit rate, then category default, then 10%
pub fn resolve_commission_rate(business: &Business, defaults: &CommissionDefaults) -> Decimal {
    business
        .commission_rate
        .or_else(|| defaults.rate_for(&business.category))
        .unwrap_or(FALLBACK_COMMISSION_RATE)
}

/// Percentage change from `previous` to `current`; zero when there is no baseline
pub fn growth_rate(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        (current - previous) / previous * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Share of bookings in `confirmed` status, as a percentage
pub fn conversion_rate(bookings: &[Booking]) -> Decimal {
    if bookings.is_empty() {
        return Decimal::ZERO;
    }
    let confirmed = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();
    Decimal::from(confirmed as u64) / Decimal::from(bookings.len() as u64) * Decimal::ONE_HUNDRED
}

pub fn average_booking_value(bookings: &[Booking]) -> Decimal {
    if bookings.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = bookings.iter().map(|b| b.total_amount).sum();
    total / Decimal::from(bookings.len() as u64)
}

/// One row of the admin financial overview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessFinancials {
    pub business_id: Uuid,
    pub business_name: String,
    pub category: String,
    pub commission_rate: Decimal,
    pub monthly_revenue: Decimal,
    pub annual_revenue: Decimal,
    pub monthly_commission: Decimal,
    pub annual_commission: Decimal,
}

/// Platform-wide projection across all businesses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialOverview {
    pub businesses: Vec<BusinessFinancials>,
    pub total_monthly_revenue: Decimal,
    pub total_annual_revenue: Decimal,
    pub total_monthly_commission: Decimal,
    pub total_annual_commission: Decimal,
    /// Unweighted mean of the resolved rates; zero with no businesses
    pub average_commission_rate: Decimal,
}

pub fn business_financials(business: &Business, defaults: &CommissionDefaults) -> BusinessFinancials {
    let rate = resolve_commission_rate(business, defaults);
    let monthly = monthly_revenue(business);
    let annual = annual_revenue(business);

    BusinessFinancials {
        business_id: business.id,
        business_name: business.name.clone(),
        category: business.category.clone(),
        commission_rate: rate,
        monthly_revenue: round_money(monthly),
        annual_revenue: round_money(annual),
        monthly_commission: round_money(commission(monthly, rate)),
        annual_commission: round_money(commission(annual, rate)),
    }
}

/// Build the admin overview. Totals are summed before rounding.
pub fn financial_overview(businesses: &[Business], defaults: &CommissionDefaults) -> FinancialOverview {
    let mut total_monthly = Decimal::ZERO;
    let mut total_monthly_commission = Decimal::ZERO;
    let mut rate_sum = Decimal::ZERO;

    for business in businesses {
        let rate = resolve_commission_rate(business, defaults);
        let monthly = monthly_revenue(business);
        total_monthly += monthly;
        total_monthly_commission += commission(monthly, rate);
        rate_sum += rate;
    }

    let months = Decimal::from(MONTHS_PER_YEAR);
    let average_commission_rate = if businesses.is_empty() {
        Decimal::ZERO
    } else {
        (rate_sum / Decimal::from(businesses.len() as u64)).round_dp(2)
    };

    FinancialOverview {
        businesses: businesses
            .iter()
            .map(|b| business_financials(b, defaults))
            .collect(),
        total_monthly_revenue: round_money(total_monthly),
        total_annual_revenue: round_money(total_monthly * months),
        total_monthly_commission: round_money(total_monthly_commission),
        total_annual_commission: round_money(total_monthly_commission * months),
        average_commission_rate,
    }
}

/// Ledger analytics for one business over a period, compared to the one before
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueSummary {
    pub period: Period,
    pub revenue: Decimal,
    pub previous_revenue: Decimal,
    pub growth_rate: Decimal,
    pub booking_count: usize,
    pub average_booking_value: Decimal,
    pub conversion_rate: Decimal,
    pub commission_rate: Decimal,
    pub commission: Decimal,
    /// Revenue left to the business after the platform cut
    pub net_payout: Decimal,
    pub status_counts: StatusCounts,
}

/// Summarise `bookings` for `period`; `previous` is the baseline for growth
pub fn revenue_summary(
    bookings: &[Booking],
    period: Period,
    previous: Period,
    commission_rate: Decimal,
) -> RevenueSummary {
    let in_period: Vec<Booking> = bookings
        .iter()
        .filter(|b| period.contains(b.created_at))
        .cloned()
        .collect();

    let revenue = revenue_for_period(bookings, period.start, period.end);
    let previous_revenue = revenue_for_period(bookings, previous.start, previous.end);
    let cut = commission(revenue, commission_rate);

    RevenueSummary {
        period,
        revenue: round_money(revenue),
        previous_revenue: round_money(previous_revenue),
        growth_rate: growth_rate(revenue, previous_revenue).round_dp(2),
        booking_count: in_period.len(),
        average_booking_value: round_money(average_booking_value(&in_period)),
        conversion_rate: conversion_rate(&in_period).round_dp(2),
        commission_rate,
        commission: round_money(cut),
        net_payout: round_money(revenue - cut),
        status_counts: count_by_status(&in_period),
    }
}

/// Ledger revenue for a single calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRevenue {
    pub month: u32,
    pub revenue: Decimal,
    pub booking_count: usize,
}

/// Twelve buckets, January first, by `created_at`
pub fn monthly_breakdown(bookings: &[Booking], year: i32) -> Vec<MonthlyRevenue> {
    let mut buckets: Vec<MonthlyRevenue> = (1..=12)
        .map(|month| MonthlyRevenue {
            month,
            revenue: Decimal::ZERO,
            booking_count: 0,
        })
        .collect();

    for booking in bookings.iter().filter(|b| b.created_at.year() == year) {
        let bucket = &mut buckets[booking.created_at.month0() as usize];
        bucket.revenue += booking.total_amount;
        bucket.booking_count += 1;
    }

    for bucket in &mut buckets {
        bucket.revenue = round_money(bucket.revenue);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessStatus, PaymentStatus};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn business(category: &str, rate: Option<&str>) -> Business {
        Business {
            id: Uuid::new_v4(),
            owner_id: None,
            name: "Sparkle Co".to_string(),
            email: None,
            phone: None,
            address: None,
            category: category.to_string(),
            status: BusinessStatus::Approved,
            rating: Decimal::ZERO,
            total_reviews: 0,
            commission_rate: rate.map(dec),
            verified: true,
            featured: false,
            monthly_bookings_count: 40,
            average_booking_value: dec("250.00"),
            created_at: Utc::now(),
        }
    }

    fn booking_at(amount: &str, status: BookingStatus, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4().to_string(),
            customer_id: None,
            business_id: Uuid::nil(),
            service_id: Uuid::nil(),
            service_name: "Deep Clean".to_string(),
            business_name: "Sparkle Co".to_string(),
            booking_date: created_at.date_naive(),
            booking_time: "10:00".to_string(),
            status,
            total_amount: dec(amount),
            payment_status: PaymentStatus::Pending,
            payment_method: "cash".to_string(),
            customer_name: "Thandi".to_string(),
            customer_email: "thandi@example.com".to_string(),
            customer_phone: "0821234567".to_string(),
            special_instructions: None,
            created_at,
        }
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_rate_resolution_order() {
        let defaults = CommissionDefaults::builtin();
        assert_eq!(
            resolve_commission_rate(&business("Beauty & Wellness", Some("5")), &defaults),
            dec("5")
        );
        assert_eq!(
            resolve_commission_rate(&business("Beauty & Wellness", None), &defaults),
            dec("8.5")
        );
        assert_eq!(
            resolve_commission_rate(&business("Underwater Welding", None), &defaults),
            dec("10")
        );
    }

    #[test]
    fn test_beauty_and_wellness_commission() {
        let defaults = CommissionDefaults::builtin();
        let rate = resolve_commission_rate(&business("Beauty & Wellness", None), &defaults);
        assert_eq!(commission(dec("1000"), rate), dec("85.0"));
    }

    #[test]
    fn test_projection_revenue() {
        let b = business("Home Services", None);
        assert_eq!(monthly_revenue(&b), dec("10000"));
        assert_eq!(annual_revenue(&b), dec("120000"));
    }

    #[test]
    fn test_revenue_for_period_is_half_open() {
        let bookings = vec![
            booking_at("100", BookingStatus::Completed, ts(2024, 5, 31)),
            booking_at("200", BookingStatus::Completed, ts(2024, 6, 1)),
            booking_at("300", BookingStatus::Pending, ts(2024, 6, 30)),
        ];
        let june = Period::month(2024, 6).unwrap();
        assert_eq!(revenue_for_period(&bookings, june.start, june.end), dec("500"));
        assert_eq!(
            revenue_for_period(&bookings, ts(2024, 6, 1), ts(2024, 6, 1)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_growth_rate_zero_baseline() {
        assert_eq!(growth_rate(dec("500"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(growth_rate(dec("150"), dec("100")), dec("50"));
        assert_eq!(growth_rate(dec("50"), dec("100")), dec("-50"));
    }

    #[test]
    fn test_conversion_rate_example() {
        let now = ts(2024, 6, 1);
        let bookings = vec![
            booking_at("10", BookingStatus::Confirmed, now),
            booking_at("10", BookingStatus::Confirmed, now),
            booking_at("10", BookingStatus::Cancelled, now),
            booking_at("10", BookingStatus::Pending, now),
        ];
        assert_eq!(conversion_rate(&bookings), dec("50"));
        assert_eq!(conversion_rate(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_average_booking_value() {
        let now = ts(2024, 6, 1);
        let bookings = vec![
            booking_at("100", BookingStatus::Completed, now),
            booking_at("250", BookingStatus::Completed, now),
        ];
        assert_eq!(average_booking_value(&bookings), dec("175"));
        assert_eq!(average_booking_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_has_no_float_drift() {
        let now = ts(2024, 6, 1);
        let bookings: Vec<Booking> = (0..10)
            .map(|_| booking_at("0.10", BookingStatus::Completed, now))
            .collect();
        let total = revenue_for_period(&bookings, ts(2024, 1, 1), ts(2025, 1, 1));
        assert_eq!(total, dec("1.00"));
    }

    #[test]
    fn test_financial_overview_totals() {
        let defaults = CommissionDefaults::builtin();
        let businesses = vec![business("Beauty & Wellness", None), business("Home Services", Some("12"))];
        let overview = financial_overview(&businesses, &defaults);

        assert_eq!(overview.total_monthly_revenue, dec("20000"));
        assert_eq!(overview.total_annual_revenue, dec("240000"));
        // 850 + 1200
        assert_eq!(overview.total_monthly_commission, dec("2050"));
        assert_eq!(overview.average_commission_rate, dec("10.25"));
        assert_eq!(overview.businesses.len(), 2);
    }

    #[test]
    fn test_financial_overview_empty() {
        let overview = financial_overview(&[], &CommissionDefaults::builtin());
        assert_eq!(overview.total_monthly_revenue, Decimal::ZERO);
        assert_eq!(overview.average_commission_rate, Decimal::ZERO);
    }

    #[test]
    fn test_revenue_summary() {
        let bookings = vec![
            booking_at("100", BookingStatus::Completed, ts(2024, 5, 10)),
            booking_at("200", BookingStatus::Confirmed, ts(2024, 6, 3)),
            booking_at("100", BookingStatus::Cancelled, ts(2024, 6, 4)),
        ];
        let june = Period::month(2024, 6).unwrap();
        let may = june.previous_month().unwrap();
        let summary = revenue_summary(&bookings, june, may, dec("10"));

        assert_eq!(summary.revenue, dec("300"));
        assert_eq!(summary.previous_revenue, dec("100"));
        assert_eq!(summary.growth_rate, dec("200"));
        assert_eq!(summary.booking_count, 2);
        assert_eq!(summary.commission, dec("30"));
        assert_eq!(summary.net_payout, dec("270"));
        assert_eq!(summary.conversion_rate, dec("50"));
        assert_eq!(summary.status_counts.cancelled, 1);
    }

    #[test]
    fn test_monthly_breakdown() {
        let bookings = vec![
            booking_at("100", BookingStatus::Completed, ts(2024, 1, 10)),
            booking_at("50.555", BookingStatus::Completed, ts(2024, 1, 20)),
            booking_at("75", BookingStatus::Completed, ts(2024, 12, 31)),
            booking_at("999", BookingStatus::Completed, ts(2023, 12, 31)),
        ];
        let months = monthly_breakdown(&bookings, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].revenue, dec("150.56"));
        assert_eq!(months[0].booking_count, 2);
        assert_eq!(months[11].revenue, dec("75"));
        assert_eq!(months[5].booking_count, 0);
    }

    #[test]
    fn test_period_month_boundaries() {
        let dec_period = Period::month(2024, 12).unwrap();
        assert_eq!(dec_period.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let jan = Period::month(2025, 1).unwrap();
        assert_eq!(jan.previous_month(), Some(dec_period));
        assert!(Period::month(2024, 13).is_none());
    }
}
