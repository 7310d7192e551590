//! Business discovery and administration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::BusinessStatus;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::services::BusinessService;
use crate::AppState;

/// Query parameters for business discovery
#[derive(Debug, Deserialize)]
pub struct DiscoverBusinessesQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBusinessStatusRequest {
    pub status: BusinessStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommissionRateRequest {
    /// Percent; null falls back to the category default
    pub commission_rate: Option<Decimal>,
}

/// List approved businesses (public endpoint)
pub async fn list_businesses(
    State(state): State<AppState>,
    Query(query): Query<DiscoverBusinessesQuery>,
) -> impl IntoResponse {
    let service = BusinessService::new(state.gateway.clone());

    match service.list_approved(query.category.as_deref()).await {
        Ok(businesses) => (
            StatusCode::OK,
            Json(serde_json::json!({ "businesses": businesses })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List a business's active services (public endpoint)
pub async fn list_business_services(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BusinessService::new(state.gateway.clone());

    match service.list_services(business_id).await {
        Ok(services) => (
            StatusCode::OK,
            Json(serde_json::json!({ "services": services })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Approve or reject a business
pub async fn update_business_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(business_id): Path<Uuid>,
    Json(input): Json<UpdateBusinessStatusRequest>,
) -> impl IntoResponse {
    let service = BusinessService::new(state.gateway.clone());

    match service.update_status(&user, business_id, input.status).await {
        Ok(business) => (StatusCode::OK, Json(business)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set or clear a business's commission rate
pub async fn update_business_commission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(business_id): Path<Uuid>,
    Json(input): Json<UpdateCommissionRateRequest>,
) -> impl IntoResponse {
    let service = BusinessService::new(state.gateway.clone());

    match service
        .update_commission_rate(&user, business_id, input.commission_rate)
        .await
    {
        Ok(business) => (StatusCode::OK, Json(business)).into_response(),
        Err(e) => e.into_response(),
    }
}
