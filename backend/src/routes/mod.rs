//! Route definitions for the services marketplace API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Discovery (public)
        .nest("/businesses", business_routes())
        // Guest checkout (public)
        .route("/bookings/guest", post(handlers::create_guest_booking))
        // Protected routes - bookings
        .nest("/bookings", booking_routes(state.clone()))
        // Protected routes - business analytics
        .nest("/finance", finance_routes(state.clone()))
        // Protected routes - platform administration
        .nest("/admin", admin_routes(state))
}

/// Business discovery routes (public)
fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_businesses))
        .route("/:business_id/services", get(handlers::list_business_services))
}

/// Booking routes (protected)
fn booking_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_bookings).post(handlers::create_booking))
        .route("/:booking_id", get(handlers::get_booking))
        .route("/:booking_id/transition", post(handlers::transition_booking))
        .route("/:booking_id/payments", post(handlers::record_payment))
        .route("/:booking_id/review", post(handlers::submit_review))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Business analytics routes (protected)
fn finance_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/business/:business_id/summary", get(handlers::get_business_summary))
        .route("/business/:business_id/monthly", get(handlers::get_business_monthly))
        .route("/business/:business_id/dashboard", get(handlers::get_business_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Platform administration routes (protected, admin role checked per handler)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/finance/overview", get(handlers::get_financial_overview))
        .route("/businesses/:business_id/status", put(handlers::update_business_status))
        .route(
            "/businesses/:business_id/commission",
            put(handlers::update_business_commission),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
