//! REST API handlers for booking analytics
//!
//! These handlers validate parameters, call the shared AnalyticsService and
//! shape its results into the JSON records served to clients.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::service::{AnalyticsService, Dashboard};
use crate::aggregate::{
    BookingStats, ClassRevenue, ClassShare, DailyTrend, DateRevenue, JourneyStat, PassengerSpend,
    RevenueStats, RouteRevenue, RouteStat,
};
use crate::error::{AnalyticsError, Result};
use crate::models::{today, DateRange, DEFAULT_WINDOW_DAYS};

pub const MAX_LIMIT: i64 = 50;
pub const MAX_DAYS: i64 = 365;
pub const DEFAULT_ROUTE_LIMIT: i64 = 10;
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 5;

// ============================================================================
// Response Types (JSON-serializable versions)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingStatsResponse {
    pub total_bookings: i64,
    pub total_revenue: f64,
    pub average_booking_value: f64,
    pub bookings_by_status: BTreeMap<String, i64>,
    pub bookings_by_class: BTreeMap<String, i64>,
}

impl From<BookingStats> for BookingStatsResponse {
    fn from(s: BookingStats) -> Self {
        Self {
            total_bookings: s.total_bookings,
            total_revenue: s.total_revenue as f64,
            average_booking_value: s.average_booking_value,
            bookings_by_status: s.bookings_by_status,
            bookings_by_class: s.bookings_by_class,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DateRevenueResponse {
    pub date: NaiveDate,
    pub revenue: f64,
}

impl From<DateRevenue> for DateRevenueResponse {
    fn from(d: DateRevenue) -> Self {
        Self {
            date: d.date,
            revenue: d.revenue as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassRevenueResponse {
    #[serde(rename = "class")]
    pub class_name: String,
    pub revenue: f64,
}

impl From<ClassRevenue> for ClassRevenueResponse {
    fn from(c: ClassRevenue) -> Self {
        Self {
            class_name: c.class_name,
            revenue: c.revenue as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteRevenueResponse {
    pub route: String,
    pub revenue: f64,
}

impl From<RouteRevenue> for RouteRevenueResponse {
    fn from(r: RouteRevenue) -> Self {
        Self {
            route: r.route,
            revenue: r.revenue as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevenueStatsResponse {
    pub total_revenue: f64,
    pub revenue_by_date: Vec<DateRevenueResponse>,
    pub revenue_by_class: Vec<ClassRevenueResponse>,
    pub revenue_by_route: Vec<RouteRevenueResponse>,
}

impl From<RevenueStats> for RevenueStatsResponse {
    fn from(r: RevenueStats) -> Self {
        Self {
            total_revenue: r.total_revenue as f64,
            revenue_by_date: r.revenue_by_date.into_iter().map(Into::into).collect(),
            revenue_by_class: r.revenue_by_class.into_iter().map(Into::into).collect(),
            revenue_by_route: r.revenue_by_route.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PopularRouteResponse {
    pub origin: String,
    pub destination: String,
    pub route: String,
    pub booking_count: i64,
    pub total_revenue: f64,
    pub average_price: f64,
}

impl From<RouteStat> for PopularRouteResponse {
    fn from(r: RouteStat) -> Self {
        Self {
            origin: r.origin,
            destination: r.destination,
            route: r.route,
            booking_count: r.booking_count,
            total_revenue: r.total_revenue as f64,
            average_price: r.average_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyTrendResponse {
    pub date: NaiveDate,
    pub booking_count: i64,
    pub revenue: f64,
}

impl From<DailyTrend> for DailyTrendResponse {
    fn from(d: DailyTrend) -> Self {
        Self {
            date: d.date,
            booking_count: d.booking_count,
            revenue: d.revenue as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassDistributionResponse {
    pub class_name: String,
    pub booking_count: i64,
    pub revenue: f64,
    pub percentage: f64,
}

impl From<ClassShare> for ClassDistributionResponse {
    fn from(c: ClassShare) -> Self {
        Self {
            class_name: c.class_name,
            booking_count: c.booking_count,
            revenue: c.revenue as f64,
            percentage: c.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub overview: BookingStatsResponse,
    pub daily_trends: Vec<DailyTrendResponse>,
    pub popular_routes: Vec<PopularRouteResponse>,
    pub class_distribution: Vec<ClassDistributionResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(d: Dashboard) -> Self {
        Self {
            overview: d.overview.into(),
            daily_trends: d.daily_trends.into_iter().map(Into::into).collect(),
            popular_routes: d.popular_routes.into_iter().map(Into::into).collect(),
            class_distribution: d.class_distribution.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopSpenderResponse {
    pub name: String,
    pub email: String,
    pub total_bookings: i64,
    pub total_spent: f64,
}

impl From<PassengerSpend> for TopSpenderResponse {
    fn from(p: PassengerSpend) -> Self {
        Self {
            name: p.name,
            email: p.email,
            total_bookings: p.total_bookings,
            total_spent: p.total_spent as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JourneyPerformanceResponse {
    pub journey_name: String,
    pub total_bookings: i64,
    pub total_revenue: f64,
    pub average_booking_value: f64,
}

impl From<JourneyStat> for JourneyPerformanceResponse {
    fn from(j: JourneyStat) -> Self {
        Self {
            journey_name: j.journey_name,
            total_bookings: j.total_bookings,
            total_revenue: j.total_revenue as f64,
            average_booking_value: j.average_booking_value,
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    fn range(&self) -> DateRange {
        DateRange::resolve(self.start_date, self.end_date, today())
    }
}

#[derive(Debug, Deserialize)]
pub struct RankedQuery {
    pub limit: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RankedQuery {
    fn range(&self) -> DateRange {
        DateRange::resolve(self.start_date, self.end_date, today())
    }

    fn limit(&self, default: i64) -> Result<usize> {
        let limit = bounded("limit", self.limit.unwrap_or(default), 1, MAX_LIMIT)?;
        Ok(limit as usize)
    }
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

impl DaysQuery {
    fn range(&self) -> Result<DateRange> {
        let days = bounded("days", self.days.unwrap_or(DEFAULT_WINDOW_DAYS), 1, MAX_DAYS)?;
        Ok(DateRange::trailing(days, today()))
    }
}

fn bounded(name: &'static str, value: i64, min: i64, max: i64) -> Result<i64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(AnalyticsError::InvalidParameter { name, value, min, max })
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<AnalyticsService>;

/// GET /
pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Train Booking Analytics API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "analytics": "/api/analytics"
        }
    }))
}

/// GET /health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    match service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "healthy", "database": "connected"})),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unhealthy", "database": "disconnected"})),
            )
        }
    }
}

/// GET /api/analytics/bookings/stats
pub async fn get_booking_stats(
    State(service): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<BookingStatsResponse>> {
    let stats = service.booking_stats(params.range()).await?;
    Ok(Json(stats.into()))
}

/// GET /api/analytics/revenue/stats
pub async fn get_revenue_stats(
    State(service): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<RevenueStatsResponse>> {
    let stats = service.revenue_stats(params.range()).await?;
    Ok(Json(stats.into()))
}

/// GET /api/analytics/popular-routes
pub async fn get_popular_routes(
    State(service): State<AppState>,
    Query(params): Query<RankedQuery>,
) -> Result<Json<Vec<PopularRouteResponse>>> {
    let limit = params.limit(DEFAULT_ROUTE_LIMIT)?;
    let routes = service.popular_routes(params.range(), limit).await?;
    Ok(Json(routes.into_iter().map(Into::into).collect()))
}

/// GET /api/analytics/daily-trends
pub async fn get_daily_trends(
    State(service): State<AppState>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<Vec<DailyTrendResponse>>> {
    let trends = service.daily_trends(params.range()?).await?;
    Ok(Json(trends.into_iter().map(Into::into).collect()))
}

/// GET /api/analytics/class-distribution
pub async fn get_class_distribution(
    State(service): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<Vec<ClassDistributionResponse>>> {
    let shares = service.class_distribution(params.range()).await?;
    Ok(Json(shares.into_iter().map(Into::into).collect()))
}

/// GET /api/analytics/dashboard
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<DashboardResponse>> {
    let dashboard = service.dashboard(params.range()?).await?;
    Ok(Json(dashboard.into()))
}

/// GET /api/analytics/passengers/top-spenders
pub async fn get_top_spenders(
    State(service): State<AppState>,
    Query(params): Query<RankedQuery>,
) -> Result<Json<Vec<TopSpenderResponse>>> {
    let limit = params.limit(DEFAULT_LEADERBOARD_LIMIT)?;
    let spenders = service.top_spenders(params.range(), limit).await?;
    Ok(Json(spenders.into_iter().map(Into::into).collect()))
}

/// GET /api/analytics/journeys/performance
pub async fn get_journey_performance(
    State(service): State<AppState>,
    Query(params): Query<RankedQuery>,
) -> Result<Json<Vec<JourneyPerformanceResponse>>> {
    let limit = params.limit(DEFAULT_LEADERBOARD_LIMIT)?;
    let journeys = service.journey_performance(params.range(), limit).await?;
    Ok(Json(journeys.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        assert_eq!(bounded("limit", 1, 1, 50).unwrap(), 1);
        assert_eq!(bounded("limit", 50, 1, 50).unwrap(), 50);
        assert!(bounded("limit", 0, 1, 50).is_err());
        assert!(bounded("days", 366, 1, 365).is_err());
    }

    #[test]
    fn test_ranked_query_defaults() {
        let query = RankedQuery {
            limit: None,
            start_date: None,
            end_date: None,
        };
        assert_eq!(query.limit(DEFAULT_LEADERBOARD_LIMIT).unwrap(), 5);
        assert_eq!(query.range().end, today());
    }

    #[test]
    fn test_shaping_converts_money_to_float() {
        let shaped = PopularRouteResponse::from(RouteStat {
            origin: "A".to_string(),
            destination: "B".to_string(),
            route: "A → B".to_string(),
            booking_count: 2,
            total_revenue: 300,
            average_price: 150.0,
        });
        let json = serde_json::to_value(&shaped).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "origin": "A",
                "destination": "B",
                "route": "A → B",
                "booking_count": 2,
                "total_revenue": 300.0,
                "average_price": 150.0
            })
        );
    }

    #[test]
    fn test_class_revenue_serializes_as_class() {
        let shaped = ClassRevenueResponse::from(ClassRevenue {
            class_name: "First".to_string(),
            revenue: 10,
        });
        let json = serde_json::to_value(&shaped).unwrap();
        assert_eq!(json, serde_json::json!({"class": "First", "revenue": 10.0}));
    }
}
