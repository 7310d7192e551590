//! Booking aggregation, filtering and sorting for dashboards

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus};
use crate::types::DateRange;

/// Disjoint views of a booking list relative to a reference date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorizedBookings {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
    pub cancelled: Vec<Booking>,
}

impl CategorizedBookings {
    pub fn total(&self) -> usize {
        self.upcoming.len() + self.past.len() + self.cancelled.len()
    }
}

/// Partition `bookings` into upcoming, past and cancelled
///
/// Cancellation wins over the date, so a cancelled booking in the future is
/// never upcoming. Every input booking lands in exactly one bucket and keeps
/// its relative order.
pub fn categorize(bookings: &[Booking], as_of: NaiveDate) -> CategorizedBookings {
    let mut out = CategorizedBookings::default();
    for booking in bookings {
        if booking.is_cancelled() {
            out.cancelled.push(booking.clone());
        } else if booking.booking_date >= as_of {
            out.upcoming.push(booking.clone());
        } else {
            out.past.push(booking.clone());
        }
    }
    out
}

/// Criteria for narrowing a booking list; `None` fields do not filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    /// `None` means "all"
    pub status: Option<BookingStatus>,
    pub search_term: Option<String>,
    pub date_range: Option<DateRange>,
}

impl BookingFilter {
    /// Parse a status query value where "all" (or empty) disables the filter
    pub fn parse_status(value: &str) -> Result<Option<BookingStatus>, &'static str> {
        match value.trim() {
            "" | "all" => Ok(None),
            other => BookingStatus::from_str(other)
                .map(Some)
                .ok_or("Unknown booking status"),
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }

        if let Some(range) = &self.date_range {
            if !range.contains(booking.booking_date) {
                return false;
            }
        }

        match self.search_term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                [
                    &booking.service_name,
                    &booking.business_name,
                    &booking.customer_name,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

pub fn filter(bookings: &[Booking], criteria: &BookingFilter) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| criteria.matches(b))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recent appointment first
    #[default]
    Date,
    /// Highest amount first
    Amount,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "date" => Some(SortKey::Date),
            "amount" => Some(SortKey::Amount),
            _ => None,
        }
    }
}

/// Stable descending sort; equal keys keep their input order
pub fn sort(bookings: &mut [Booking], key: SortKey) {
    match key {
        SortKey::Date => bookings.sort_by(|a, b| {
            (b.booking_date, &b.booking_time).cmp(&(a.booking_date, &a.booking_time))
        }),
        SortKey::Amount => bookings.sort_by(|a, b| b.total_amount.cmp(&a.total_amount)),
    }
}

/// Number of bookings in each lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.confirmed + self.in_progress + self.completed + self.cancelled
    }
}

pub fn count_by_status(bookings: &[Booking]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Pending => counts.pending += 1,
            BookingStatus::Confirmed => counts.confirmed += 1,
            BookingStatus::InProgress => counts.in_progress += 1,
            BookingStatus::Completed => counts.completed += 1,
            BookingStatus::Cancelled => counts.cancelled += 1,
        }
    }
    counts
}

/// Non-cancelled bookings dated within `days` days from `as_of`, inclusive
pub fn upcoming_within(bookings: &[Booking], as_of: NaiveDate, days: i64) -> Vec<Booking> {
    let until = as_of + Duration::days(days);
    let window = DateRange::new(as_of, until);
    bookings
        .iter()
        .filter(|b| !b.is_cancelled() && window.contains(b.booking_date))
        .cloned()
        .collect()
}
