//! Shared business logic for the analytics API
//!
//! Each call loads its own booking set for the requested range, enriches it
//! and runs one aggregation view over it. Nothing is cached between calls.

use crate::aggregate::{
    self, BookingStats, ClassShare, DailyTrend, JourneyStat, PassengerSpend, RevenueStats,
    RouteStat,
};
use crate::db::{self, DbPool};
use crate::error::Result;
use crate::models::{BookingRecord, DateRange};
use tracing::debug;

/// Result of the composite dashboard call
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub range: DateRange,
    pub overview: BookingStats,
    pub daily_trends: Vec<DailyTrend>,
    pub popular_routes: Vec<RouteStat>,
    pub class_distribution: Vec<ClassShare>,
}

/// Number of routes shown on the dashboard
pub const DASHBOARD_ROUTE_LIMIT: usize = 10;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: DbPool,
}

impl AnalyticsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load and enrich every booking in `range`.
    ///
    /// Holds one pooled connection for the duration of the query; it goes
    /// back to the pool when dropped, whether the query succeeded or not.
    pub async fn load_bookings(&self, range: DateRange) -> Result<Vec<BookingRecord>> {
        let mut conn = self.pool.acquire().await?;
        let rows = db::fetch_bookings(&mut *conn, range).await?;
        debug!("Loaded {} bookings for {}", rows.len(), range);
        Ok(aggregate::enrich(rows))
    }

    pub async fn booking_stats(&self, range: DateRange) -> Result<BookingStats> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::booking_stats(&records))
    }

    pub async fn revenue_stats(&self, range: DateRange) -> Result<RevenueStats> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::revenue_stats(&records))
    }

    pub async fn popular_routes(&self, range: DateRange, limit: usize) -> Result<Vec<RouteStat>> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::popular_routes(&records, limit))
    }

    pub async fn daily_trends(&self, range: DateRange) -> Result<Vec<DailyTrend>> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::daily_trends(&records))
    }

    pub async fn class_distribution(&self, range: DateRange) -> Result<Vec<ClassShare>> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::class_distribution(&records))
    }

    pub async fn top_spenders(
        &self,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<PassengerSpend>> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::top_spenders(&records, limit))
    }

    pub async fn journey_performance(
        &self,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<JourneyStat>> {
        let records = self.load_bookings(range).await?;
        Ok(aggregate::journey_performance(&records, limit))
    }

    /// Overview, daily trends, top routes and class distribution for one window.
    ///
    /// The four parts query the store independently, so under concurrent
    /// writes they may observe different snapshots. Any failing part fails
    /// the whole dashboard.
    pub async fn dashboard(&self, range: DateRange) -> Result<Dashboard> {
        let (overview, daily_trends, popular_routes, class_distribution) = tokio::try_join!(
            self.booking_stats(range),
            self.daily_trends(range),
            self.popular_routes(range, DASHBOARD_ROUTE_LIMIT),
            self.class_distribution(range),
        )?;

        Ok(Dashboard {
            range,
            overview,
            daily_trends,
            popular_routes,
            class_distribution,
        })
    }

    /// Check the store is reachable
    pub async fn ping(&self) -> Result<()> {
        db::ping(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::ingest::{ingest_records, tests::csv_record};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> AnalyticsService {
        let pool = memory_pool().await;
        ingest_records(
            &pool,
            &[
                csv_record(1, "2024-03-01", "Dublin", "Cork", "First", 100),
                csv_record(2, "2024-03-01", "Dublin", "Cork", "First", 200),
                csv_record(3, "2024-03-02", "Cork", "Galway", "Economy", 50),
                csv_record(4, "2024-05-01", "Cork", "Galway", "Economy", 999),
            ],
        )
        .await
        .unwrap();
        AnalyticsService::new(pool)
    }

    fn march() -> DateRange {
        DateRange::new(date("2024-03-01"), date("2024-03-31"))
    }

    #[tokio::test]
    async fn test_load_bookings_enriches() {
        let service = seeded().await;
        let records = service.load_bookings(march()).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].route, "Dublin → Cork");
        assert_eq!(records[0].passenger_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_views_respect_range() {
        let service = seeded().await;

        let stats = service.booking_stats(march()).await.unwrap();
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.total_revenue, 350);

        let routes = service.popular_routes(march(), 10).await.unwrap();
        assert_eq!(routes[0].route, "Dublin → Cork");
        assert_eq!(routes[0].booking_count, 2);
        assert_eq!(routes[0].average_price, 150.0);

        let spenders = service.top_spenders(march(), 5).await.unwrap();
        assert_eq!(spenders.len(), 1);
        assert_eq!(spenders[0].total_spent, 350);

        let journeys = service.journey_performance(march(), 5).await.unwrap();
        assert_eq!(journeys[0].total_bookings, 3);
    }

    #[tokio::test]
    async fn test_dashboard_composes_views() {
        let service = seeded().await;
        let dashboard = service.dashboard(march()).await.unwrap();

        assert_eq!(dashboard.overview.total_bookings, 3);
        assert_eq!(dashboard.daily_trends.len(), 2);
        assert_eq!(dashboard.popular_routes.len(), 2);
        assert_eq!(dashboard.class_distribution.len(), 2);
        assert_eq!(dashboard.range, march());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = seeded().await;
        service.pool.close().await;
        assert!(service.booking_stats(march()).await.is_err());
        assert!(service.dashboard(march()).await.is_err());
    }
}
