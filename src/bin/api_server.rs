//! REST API server for train booking analytics
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options (each also read from the environment):
//!   --host HOST                 Address to bind (HOST, default: 0.0.0.0)
//!   --port PORT                 Port to listen on (PORT, default: 8000)
//!   --database-url URL          SQLite database (DATABASE_URL, default: sqlite://data/bookings.db)
//!   --max-connections N         Pool size (DB_MAX_CONNECTIONS, default: 5)
//!   --cors-origins A,B          Allowed browser origins (CORS_ORIGINS)
//!
//! REST endpoints:
//!   GET /                                        - Service index
//!   GET /health                                  - Health check
//!   GET /api/analytics/bookings/stats            - Booking statistics
//!   GET /api/analytics/revenue/stats             - Revenue statistics
//!   GET /api/analytics/popular-routes            - Routes by booking count (?limit=1-50)
//!   GET /api/analytics/daily-trends              - Per-day bookings and revenue (?days=1-365)
//!   GET /api/analytics/class-distribution        - Bookings per carriage class
//!   GET /api/analytics/dashboard                 - Composite of the above (?days=1-365)
//!   GET /api/analytics/passengers/top-spenders   - Passengers by spend (?limit=1-50)
//!   GET /api/analytics/journeys/performance      - Journeys by booking count (?limit=1-50)
//!
//! Date-ranged endpoints take ?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD and
//! default to the trailing 30 days.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use train_booking_analytics::api::{self, AnalyticsService};
use train_booking_analytics::config::ServerConfig;
use train_booking_analytics::db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_banner(config: &ServerConfig) {
    println!("============================================================");
    println!("           TRAIN BOOKING ANALYTICS API SERVER");
    println!("============================================================");
    println!();
    println!("  Listen:   http://{}:{}/", config.host, config.port);
    println!("  Database: {}", config.database_url);
    println!();
    println!("REST Endpoints:");
    println!("  GET /health                                Health check");
    println!("  GET /api/analytics/bookings/stats          Booking stats");
    println!("  GET /api/analytics/revenue/stats           Revenue stats");
    println!("  GET /api/analytics/popular-routes          Popular routes");
    println!("  GET /api/analytics/daily-trends            Daily trends");
    println!("  GET /api/analytics/class-distribution      Class shares");
    println!("  GET /api/analytics/dashboard               Dashboard");
    println!("  GET /api/analytics/passengers/top-spenders Top spenders");
    println!("  GET /api/analytics/journeys/performance    Journeys");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let config = ServerConfig::parse();
    print_banner(&config);

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    db::init_schema(&pool).await.context("Failed to initialize schema")?;
    tracing::info!("Connected to {}", config.database_url);

    let service = Arc::new(AnalyticsService::new(pool));
    let app = api::router(service, config.cors_layer()?);

    let addr = config.socket_addr()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
