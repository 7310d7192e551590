//! Revenue analytics handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::services::FinanceService;
use crate::AppState;

/// Query parameters for a monthly summary; both default to the current month
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
}

fn finance_service(state: &AppState) -> FinanceService {
    FinanceService::new(state.gateway.clone())
        .with_rate_overrides(state.config.commission.category_rates.clone())
}

/// Revenue summary for one business and month
pub async fn get_business_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    match finance_service(&state)
        .business_summary(&user, business_id, year, month)
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Month-by-month revenue for one business and year
pub async fn get_business_monthly(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(business_id): Path<Uuid>,
    Query(query): Query<MonthlyQuery>,
) -> impl IntoResponse {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    match finance_service(&state).monthly(&user, business_id, year).await {
        Ok(months) => (
            StatusCode::OK,
            Json(serde_json::json!({ "year": year, "months": months })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Business owner landing page data
pub async fn get_business_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(business_id): Path<Uuid>,
) -> impl IntoResponse {
    let window = state.config.bookings.upcoming_window_days;

    match finance_service(&state)
        .dashboard(&user, business_id, Utc::now().date_naive(), window)
        .await
    {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Platform-wide financial overview (admin only)
pub async fn get_financial_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    match finance_service(&state).overview(&user).await {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(e) => e.into_response(),
    }
}
