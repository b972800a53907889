use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use train_booking_analytics::api::handlers::DashboardResponse;
use train_booking_analytics::api::AnalyticsService;
use train_booking_analytics::db;
use train_booking_analytics::models::{today, DateRange};

/// Print the analytics dashboard for a trailing window
#[derive(Parser, Debug)]
#[command(name = "train_booking_analytics")]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data/bookings.db")]
    database_url: String,

    /// Trailing window in days
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(i64).range(1..=365))]
    days: i64,

    /// Emit the dashboard as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let pool = db::connect(&args.database_url, 1).await?;
    info!("Connected to {}", args.database_url);
    db::init_schema(&pool).await?;

    let service = AnalyticsService::new(pool);
    let dashboard = service.dashboard(DateRange::trailing(args.days, today())).await?;

    if args.json {
        let response = DashboardResponse::from(dashboard);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let overview = &dashboard.overview;
    println!("=== Bookings {} ===", dashboard.range);
    println!("Total bookings:   {}", overview.total_bookings);
    println!("Total revenue:    {}", overview.total_revenue);
    println!("Average booking:  {:.2}", overview.average_booking_value);
    for (status, count) in &overview.bookings_by_status {
        println!("  {:<20} {:>8}", status, count);
    }

    println!();
    println!("=== Popular Routes ===");
    for route in &dashboard.popular_routes {
        println!(
            "  {:<45} {:>6} bookings {:>10} revenue {:>8.2} avg",
            route.route, route.booking_count, route.total_revenue, route.average_price
        );
    }

    println!();
    println!("=== Class Distribution ===");
    for share in &dashboard.class_distribution {
        println!(
            "  {:<20} {:>6} bookings {:>10} revenue {:>6.2}%",
            share.class_name, share.booking_count, share.revenue, share.percentage
        );
    }

    println!();
    println!("=== Daily Trends ===");
    for day in &dashboard.daily_trends {
        println!("  {}  {:>6} bookings {:>10} revenue", day.date, day.booking_count, day.revenue);
    }

    Ok(())
}
