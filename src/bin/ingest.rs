//! Import a booking CSV into the analytics database
//!
//! Usage:
//!   cargo run --release --bin ingest -- [OPTIONS]
//!
//! Options:
//!   --input <PATH>         CSV to import (default: data/bookings.csv)
//!   --database-url <URL>   SQLite database (DATABASE_URL, default: sqlite://data/bookings.db)

use anyhow::{Context, Result};
use clap::Parser;
use csv::ReaderBuilder;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use train_booking_analytics::{db, ingest::ingest_records, models::BookingCsvRecord};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Import denormalised booking rows into the database")]
struct Args {
    /// Input CSV path
    #[arg(long, default_value = "data/bookings.csv")]
    input: PathBuf,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data/bookings.db")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    info!("Reading CSV from {:?}", args.input);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(&args.input)
        .with_context(|| format!("Failed to open {:?}", args.input))?;

    let mut records: Vec<BookingCsvRecord> = Vec::new();
    let mut error_count = 0;
    for (line, result) in reader.deserialize::<BookingCsvRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                // +2: header row and 1-based numbering
                warn!("Skipping line {}: {}", line + 2, e);
                error_count += 1;
            }
        }
    }
    info!("Parsed {} records ({} rejected)", records.len(), error_count);

    info!("Connecting to {}", args.database_url);
    let pool = db::connect(&args.database_url, 1).await?;

    info!("Initializing schema...");
    db::init_schema(&pool).await?;

    let summary = ingest_records(&pool, &records).await?;

    println!("Ingestion complete:");
    println!("  Bookings inserted: {}", summary.bookings_inserted);
    println!("  Bookings skipped:  {}", summary.bookings_skipped);
    println!("  Stations:          {}", summary.stations);
    println!("  Carriage classes:  {}", summary.classes);
    println!("  Statuses:          {}", summary.statuses);
    println!("  Passengers:        {}", summary.passengers);
    println!("  Journeys:          {}", summary.journeys);

    Ok(())
}
