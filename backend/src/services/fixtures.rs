//! Record builders shared by the service tests

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    Booking, BookingStatus, Business, BusinessStatus, PaymentStatus, Service, UserRole,
};
use uuid::Uuid;

use crate::middleware::AuthUser;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn business(category: &str, rate: Option<&str>) -> Business {
    Business {
        id: Uuid::new_v4(),
        owner_id: Some(Uuid::new_v4()),
        name: format!("{} Co", category),
        email: Some("hello@example.com".to_string()),
        phone: Some("0211234567".to_string()),
        address: None,
        category: category.to_string(),
        status: BusinessStatus::Approved,
        rating: Decimal::ZERO,
        total_reviews: 0,
        commission_rate: rate.map(dec),
        verified: true,
        featured: false,
        monthly_bookings_count: 40,
        average_booking_value: dec("250"),
        created_at: Utc::now(),
    }
}

pub fn service(business: &Business, name: &str, price: &str, active: bool) -> Service {
    Service {
        id: Uuid::new_v4(),
        business_id: business.id,
        name: name.to_string(),
        description: None,
        price: dec(price),
        duration_minutes: 60,
        category_id: None,
        is_active: active,
        created_at: Utc::now(),
    }
}

/// A R500 booking for `business` made by thandi@example.com
pub fn booking(business: &Business, status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4().to_string(),
        customer_id: None,
        business_id: business.id,
        service_id: Uuid::new_v4(),
        service_name: "Deep Tissue Massage".to_string(),
        business_name: business.name.clone(),
        booking_date: date("2024-06-18"),
        booking_time: "10:00".to_string(),
        status,
        total_amount: dec("500"),
        payment_status: PaymentStatus::Pending,
        payment_method: "card".to_string(),
        customer_name: "Thandi Nkosi".to_string(),
        customer_email: "thandi@example.com".to_string(),
        customer_phone: "0821234567".to_string(),
        special_instructions: None,
        created_at: Utc::now(),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        role: UserRole::Admin,
        business_id: None,
    }
}

pub fn owner(business_id: Uuid) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: "owner@example.com".to_string(),
        role: UserRole::BusinessOwner,
        business_id: Some(business_id),
    }
}

pub fn customer(email: &str) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: email.to_string(),
        role: UserRole::Customer,
        business_id: None,
    }
}
