//! PostgreSQL implementation of the persistence gateway

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    validate_booking_amount, validate_commission_rate, validate_duration_minutes,
    validate_service_price, Booking, BookingStatus, Business, BusinessStatus, CommissionDefaults,
    CoreError, Payment, PaymentStatus, Review, Service,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{BookingQuery, MarketplaceGateway, StatusChange, StatusWrite};
use crate::error::{AppError, AppResult};

const UNIQUE_VIOLATION: &str = "23505";

const BOOKING_COLUMNS: &str = r#"
    b.id, b.customer_id, b.business_id, b.service_id,
    s.name AS service_name, bz.name AS business_name,
    b.booking_date, b.booking_time, b.status, b.total_amount,
    b.payment_status, b.payment_method, b.customer_name, b.customer_email,
    b.customer_phone, b.special_instructions, b.created_at
"#;

const BUSINESS_COLUMNS: &str = r#"
    id, owner_id, name, email, phone, address, category, status, rating,
    total_reviews, commission_rate, verified, featured,
    monthly_bookings_count, average_booking_value, created_at
"#;

/// Gateway backed by the platform's PostgreSQL database
#[derive(Clone)]
pub struct PgGateway {
    db: PgPool,
}

impl PgGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Database row for a booking joined with its service and business names
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    customer_id: Option<Uuid>,
    business_id: Uuid,
    service_id: Uuid,
    service_name: Option<String>,
    business_name: Option<String>,
    booking_date: NaiveDate,
    booking_time: String,
    status: String,
    total_amount: Option<Decimal>,
    payment_status: String,
    payment_method: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    special_instructions: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::from_str(&row.status)
            .ok_or_else(|| CoreError::malformed("booking", format!("status '{}'", row.status)))?;
        let payment_status = PaymentStatus::from_str(&row.payment_status).ok_or_else(|| {
            CoreError::malformed("booking", format!("payment_status '{}'", row.payment_status))
        })?;
        let total_amount = row
            .total_amount
            .ok_or_else(|| CoreError::malformed("booking", "total_amount is missing"))?;
        validate_booking_amount(total_amount)
            .map_err(|msg| CoreError::malformed("booking", msg))?;
        let service_name = row
            .service_name
            .ok_or_else(|| CoreError::malformed("booking", "service_id has no service"))?;
        let business_name = row
            .business_name
            .ok_or_else(|| CoreError::malformed("booking", "business_id has no business"))?;

        Ok(Booking {
            id: row.id,
            customer_id: row.customer_id,
            business_id: row.business_id,
            service_id: row.service_id,
            service_name,
            business_name,
            booking_date: row.booking_date,
            booking_time: row.booking_time,
            status,
            total_amount,
            payment_status,
            payment_method: row.payment_method,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            special_instructions: row.special_instructions,
            created_at: row.created_at,
        })
    }
}

/// Database row for a business
#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: Uuid,
    owner_id: Option<Uuid>,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    category: String,
    status: String,
    rating: Decimal,
    total_reviews: i32,
    commission_rate: Option<Decimal>,
    verified: bool,
    featured: bool,
    monthly_bookings_count: i64,
    average_booking_value: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<BusinessRow> for Business {
    type Error = CoreError;

    fn try_from(row: BusinessRow) -> Result<Self, Self::Error> {
        let status = BusinessStatus::from_str(&row.status)
            .ok_or_else(|| CoreError::malformed("business", format!("status '{}'", row.status)))?;
        if let Some(rate) = row.commission_rate {
            validate_commission_rate(rate).map_err(|msg| CoreError::malformed("business", msg))?;
        }

        Ok(Business {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            category: row.category,
            status,
            rating: row.rating,
            total_reviews: row.total_reviews,
            commission_rate: row.commission_rate,
            verified: row.verified,
            featured: row.featured,
            monthly_bookings_count: row.monthly_bookings_count,
            average_booking_value: row.average_booking_value,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    business_id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    duration_minutes: i32,
    category_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ServiceRow> for Service {
    type Error = CoreError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        validate_service_price(row.price).map_err(|msg| CoreError::malformed("service", msg))?;
        validate_duration_minutes(row.duration_minutes)
            .map_err(|msg| CoreError::malformed("service", msg))?;

        Ok(Service {
            id: row.id,
            business_id: row.business_id,
            name: row.name,
            description: row.description,
            price: row.price,
            duration_minutes: row.duration_minutes,
            category_id: row.category_id,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    booking_id: String,
    business_id: Uuid,
    customer_id: Option<Uuid>,
    rating: i32,
    comment: Option<String>,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            booking_id: row.booking_id,
            business_id: row.business_id,
            customer_id: row.customer_id,
            rating: row.rating,
            comment: row.comment,
            is_verified: row.is_verified,
            created_at: row.created_at,
        }
    }
}

/// Map unique-key violations to `DuplicateEntry`, everything else to `DatabaseError`
fn map_unique_violation(err: sqlx::Error, what: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::DuplicateEntry(what.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

#[async_trait]
impl MarketplaceGateway for PgGateway {
    async fn fetch_bookings(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM bookings b
            LEFT JOIN services s ON s.id = b.service_id
            LEFT JOIN businesses bz ON bz.id = b.business_id
            WHERE ($1::uuid IS NULL OR b.business_id = $1)
              AND ($2::text IS NULL OR LOWER(b.customer_email) = LOWER($2))
              AND ($3::date IS NULL OR b.booking_date >= $3)
              AND ($4::date IS NULL OR b.booking_date <= $4)
            ORDER BY b.booking_date DESC, b.booking_time DESC
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(query.business_id)
            .bind(query.customer_email.as_deref())
            // Open-ended ranges use the chrono extremes, which Postgres cannot store
            .bind(query.date_range.map(|r| r.start).filter(|d| *d != NaiveDate::MIN))
            .bind(query.date_range.map(|r| r.end).filter(|d| *d != NaiveDate::MAX))
            .fetch_all(&self.db)
            .await?;

        let bookings = rows
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    async fn fetch_booking(&self, id: &str) -> AppResult<Option<Booking>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM bookings b
            LEFT JOIN services s ON s.id = b.service_id
            LEFT JOIN businesses bz ON bz.id = b.business_id
            WHERE b.id = $1
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Booking::try_from).transpose()?)
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, business_id, service_id, booking_date, booking_time,
                status, total_amount, payment_status, payment_method,
                customer_name, customer_email, customer_phone, special_instructions, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(&booking.id)
        .bind(booking.customer_id)
        .bind(booking.business_id)
        .bind(booking.service_id)
        .bind(booking.booking_date)
        .bind(&booking.booking_time)
        .bind(booking.status.as_str())
        .bind(booking.total_amount)
        .bind(booking.payment_status.as_str())
        .bind(&booking.payment_method)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.special_instructions)
        .bind(booking.created_at)
        .execute(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "Booking"))?;

        Ok(())
    }

    async fn update_booking_status(&self, change: &StatusChange) -> AppResult<StatusWrite> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1,
                payment_status = CASE
                    WHEN $4 AND payment_status = 'paid' THEN 'refunded'
                    ELSE payment_status
                END
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(change.new.as_str())
        .bind(&change.booking_id)
        .bind(change.expected.as_str())
        .bind(change.refund_if_paid)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Ok(StatusWrite::Conflict);
        }

        if let Some(record) = &change.commission {
            sqlx::query(
                r#"
                INSERT INTO commissions (
                    id, booking_id, business_id, booking_amount, rate_percent,
                    commission_amount, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.id)
            .bind(&record.booking_id)
            .bind(record.business_id)
            .bind(record.booking_amount)
            .bind(record.rate_percent)
            .bind(record.commission_amount)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, "Commission for this booking"))?;
        }

        tx.commit().await?;
        Ok(StatusWrite::Applied)
    }

    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE bookings SET payment_status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Booking".to_string()));
        }
        Ok(())
    }

    async fn fetch_business(&self, id: Uuid) -> AppResult<Option<Business>> {
        let sql = format!("SELECT {} FROM businesses WHERE id = $1", BUSINESS_COLUMNS);
        let row = sqlx::query_as::<_, BusinessRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Business::try_from).transpose()?)
    }

    async fn fetch_businesses(&self, status: Option<BusinessStatus>) -> AppResult<Vec<Business>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM businesses
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY featured DESC, rating DESC, name ASC
            "#,
            BUSINESS_COLUMNS
        );
        let rows = sqlx::query_as::<_, BusinessRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.db)
            .await?;

        let businesses = rows
            .into_iter()
            .map(Business::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(businesses)
    }

    async fn update_business_status(&self, id: Uuid, status: BusinessStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE businesses SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_business_commission_rate(
        &self,
        id: Uuid,
        rate: Option<Decimal>,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE businesses SET commission_rate = $1 WHERE id = $2")
            .bind(rate)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_business_rating(
        &self,
        id: Uuid,
        rating: Decimal,
        total_reviews: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE businesses SET rating = $1, total_reviews = $2 WHERE id = $3")
            .bind(rating)
            .bind(total_reviews)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn fetch_services(&self, business_id: Uuid) -> AppResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, business_id, name, description, price, duration_minutes,
                   category_id, is_active, created_at
            FROM services
            WHERE business_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        let services = rows
            .into_iter()
            .map(Service::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    async fn fetch_service(&self, id: Uuid) -> AppResult<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT id, business_id, name, description, price, duration_minutes,
                   category_id, is_active, created_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Service::try_from).transpose()?)
    }

    async fn fetch_commission_defaults(&self) -> AppResult<CommissionDefaults> {
        let rows = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT name, commission_rate FROM service_types ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, booking_id, amount, payment_method, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payment.id)
        .bind(&payment.booking_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn fetch_reviews(&self, business_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, booking_id, business_id, customer_id, rating, comment,
                   is_verified, created_at
            FROM reviews
            WHERE business_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn review_exists_for_booking(&self, booking_id: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = $1)")
                .bind(booking_id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, booking_id, business_id, customer_id, rating, comment,
                is_verified, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(review.id)
        .bind(&review.booking_id)
        .bind(review.business_id)
        .bind(review.customer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.is_verified)
        .bind(review.created_at)
        .execute(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "Review for this booking"))?;

        Ok(())
    }
}
