use crate::error::Result;
use crate::models::{BookingRow, DateRange};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use std::str::FromStr;

pub type DbPool = SqlitePool;

/// Open a connection pool, creating the database file (and its directory) if
/// it does not exist
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    ensure_parent_dir(options.get_filename())?;

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

fn ensure_parent_dir(filename: &Path) -> Result<()> {
    match filename.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(sqlx::Error::Io)?;
            tracing::info!("Created database directory {:?}", dir);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Initialize database schema
pub async fn init_schema(pool: &DbPool) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS schedule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS train_station (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            station_name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS train_journey (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            schedule_id INTEGER REFERENCES schedule (id),
            name TEXT NOT NULL UNIQUE
        );

        -- ordered stops of a journey
        CREATE TABLE IF NOT EXISTS journey_station (
            journey_id INTEGER NOT NULL REFERENCES train_journey (id),
            station_id INTEGER NOT NULL REFERENCES train_station (id),
            stop_order INTEGER,
            departure_time DATETIME,
            PRIMARY KEY (journey_id, station_id)
        );

        CREATE TABLE IF NOT EXISTS carriage_class (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_name TEXT NOT NULL UNIQUE,
            seating_capacity INTEGER
        );

        CREATE TABLE IF NOT EXISTS journey_carriage (
            journey_id INTEGER NOT NULL REFERENCES train_journey (id),
            carriage_class_id INTEGER NOT NULL REFERENCES carriage_class (id),
            position INTEGER,
            PRIMARY KEY (journey_id, carriage_class_id)
        );

        CREATE TABLE IF NOT EXISTS carriage_price (
            schedule_id INTEGER NOT NULL REFERENCES schedule (id),
            carriage_class_id INTEGER NOT NULL REFERENCES carriage_class (id),
            price INTEGER,
            PRIMARY KEY (schedule_id, carriage_class_id)
        );

        CREATE TABLE IF NOT EXISTS booking_status (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS passenger (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email_address TEXT NOT NULL UNIQUE,
            password TEXT
        );

        CREATE TABLE IF NOT EXISTS booking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            passenger_id INTEGER NOT NULL REFERENCES passenger (id),
            status_id INTEGER NOT NULL REFERENCES booking_status (id),
            booking_date DATE NOT NULL,
            starting_station_id INTEGER NOT NULL REFERENCES train_station (id),
            ending_station_id INTEGER NOT NULL REFERENCES train_station (id),
            train_journey_id INTEGER NOT NULL REFERENCES train_journey (id),
            ticket_class_id INTEGER NOT NULL REFERENCES carriage_class (id),
            amount_paid INTEGER NOT NULL,
            ticket_no INTEGER NOT NULL UNIQUE,
            seat_no TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_booking_date ON booking (booking_date);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every booking dated within `range` (inclusive), joined against its
/// stations, class, status, passenger and journey.
///
/// Inner joins: a booking whose references do not all resolve is not returned.
pub async fn fetch_bookings(
    conn: &mut SqliteConnection,
    range: DateRange,
) -> Result<Vec<BookingRow>> {
    let rows = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT
            b.id,
            b.booking_date,
            b.amount_paid,
            b.ticket_no,
            b.seat_no,
            s1.station_name AS origin_station,
            s2.station_name AS destination_station,
            cc.class_name,
            bs.name AS status,
            p.first_name,
            p.last_name,
            p.email_address,
            tj.name AS journey_name
        FROM booking b
        JOIN train_station s1 ON b.starting_station_id = s1.id
        JOIN train_station s2 ON b.ending_station_id = s2.id
        JOIN carriage_class cc ON b.ticket_class_id = cc.id
        JOIN booking_status bs ON b.status_id = bs.id
        JOIN passenger p ON b.passenger_id = p.id
        JOIN train_journey tj ON b.train_journey_id = tj.id
        WHERE b.booking_date BETWEEN ? AND ?
        ORDER BY b.booking_date, b.id
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Round trip to the store, used by the health endpoint
pub async fn ping(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn memory_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    init_schema(&pool).await.expect("create schema");
    pool
}
