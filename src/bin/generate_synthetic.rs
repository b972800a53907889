//! Synthetic booking generator
//!
//! Writes a booking CSV in the format read by `ingest`, with random but
//! plausible stations, classes, fares, statuses and passengers spread over a
//! trailing window of days.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --count <N>        Number of bookings (default: 2000)
//!   --days <N>         Spread bookings over the last N days (default: 90)
//!   --passengers <N>   Size of the passenger pool (default: 250)
//!   --end-date <DATE>  Last booking date (default: today)
//!   --seed <N>         Random seed for reproducibility (optional)
//!   --output <PATH>    Output CSV path (default: data/bookings.csv)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;
use train_booking_analytics::models::{today, BookingCsvRecord};

/// Synthetic data generator for the booking dataset
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate synthetic train bookings")]
struct Args {
    /// Number of bookings to generate
    #[arg(long, default_value = "2000")]
    count: usize,

    /// Window of days the bookings are spread over
    #[arg(long, default_value = "90")]
    days: i64,

    /// Number of distinct passengers
    #[arg(long, default_value = "250")]
    passengers: usize,

    /// Most recent booking date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/bookings.csv")]
    output: PathBuf,
}

const STATIONS: &[&str] = &[
    "London Euston",
    "Birmingham New Street",
    "Manchester Piccadilly",
    "Liverpool Lime Street",
    "Leeds",
    "York",
    "Newcastle",
    "Edinburgh Waverley",
    "Glasgow Central",
    "Bristol Temple Meads",
];

const JOURNEYS: &[&str] = &[
    "West Coast Morning",
    "West Coast Evening",
    "East Coast Express",
    "Cross Country Day",
    "Northern Sleeper",
];

/// Class name with its base fare
const CLASSES: &[(&str, i64)] = &[("Standard", 35), ("Standard Premium", 60), ("First", 110)];

/// Status name with its cumulative weight out of 100
const STATUSES: &[(&str, u32)] = &[("Confirmed", 82), ("Pending", 90), ("Cancelled", 100)];

const FIRST_NAMES: &[&str] = &[
    "Olivia", "Noah", "Amelia", "George", "Isla", "Arthur", "Ava", "Muhammad", "Mia", "Leo",
    "Freya", "Oscar",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Taylor", "Brown", "Williams", "Wilson", "Johnson", "Davies", "Patel",
    "Wright",
];

struct Passenger {
    first_name: String,
    last_name: String,
    email_address: String,
}

fn passenger_pool(rng: &mut StdRng, size: usize) -> Vec<Passenger> {
    (0..size.max(1))
        .map(|i| {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            Passenger {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email_address: format!(
                    "{}.{}{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    i
                ),
            }
        })
        .collect()
}

fn pick_status(rng: &mut StdRng) -> &'static str {
    let roll = rng.gen_range(0..100);
    STATUSES
        .iter()
        .find(|(_, cumulative)| roll < *cumulative)
        .map(|(name, _)| *name)
        .unwrap_or("Confirmed")
}

fn generate(args: &Args, rng: &mut StdRng) -> Vec<BookingCsvRecord> {
    let end_date = args.end_date.unwrap_or_else(today);
    let passengers = passenger_pool(rng, args.passengers);

    (0..args.count)
        .map(|i| {
            let origin = rng.gen_range(0..STATIONS.len());
            // Any station but the origin
            let destination = (origin + rng.gen_range(1..STATIONS.len())) % STATIONS.len();
            let (class_name, base_fare) = CLASSES[rng.gen_range(0..CLASSES.len())];
            let passenger = &passengers[rng.gen_range(0..passengers.len())];
            let distance_factor = (origin as i64 - destination as i64).abs();

            BookingCsvRecord {
                booking_date: end_date - Duration::days(rng.gen_range(0..args.days.max(1))),
                amount_paid: base_fare + distance_factor * 8 + rng.gen_range(0..=base_fare / 4),
                ticket_no: 100_000 + i as i64,
                seat_no: format!(
                    "{}{}",
                    (b'A' + rng.gen_range(0..8u8)) as char,
                    rng.gen_range(1..=80)
                ),
                origin_station: STATIONS[origin].to_string(),
                destination_station: STATIONS[destination].to_string(),
                class_name: class_name.to_string(),
                status: pick_status(rng).to_string(),
                first_name: passenger.first_name.clone(),
                last_name: passenger.last_name.clone(),
                email_address: passenger.email_address.clone(),
                journey_name: JOURNEYS[rng.gen_range(0..JOURNEYS.len())].to_string(),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("Generating {} bookings over {} days...", args.count, args.days);
    let records = generate(&args, &mut rng);

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)
        .with_context(|| format!("Failed to create {:?}", args.output))?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    let revenue: i64 = records.iter().map(|r| r.amount_paid).sum();
    println!("Wrote {} bookings ({} total revenue) to {:?}", records.len(), revenue, args.output);

    Ok(())
}
