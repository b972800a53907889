//! API module for booking analytics
//!
//! REST interface over the analytics service.

pub mod handlers;
pub mod service;

pub use service::AnalyticsService;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the REST router. Analytic endpoints live under `/api/analytics`.
pub fn router(service: Arc<AnalyticsService>, cors: CorsLayer) -> Router {
    let analytics = Router::new()
        .route("/bookings/stats", get(handlers::get_booking_stats))
        .route("/revenue/stats", get(handlers::get_revenue_stats))
        .route("/popular-routes", get(handlers::get_popular_routes))
        .route("/daily-trends", get(handlers::get_daily_trends))
        .route("/class-distribution", get(handlers::get_class_distribution))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/passengers/top-spenders", get(handlers::get_top_spenders))
        .route("/journeys/performance", get(handlers::get_journey_performance));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api/analytics", analytics)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
