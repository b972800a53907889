//! Import of denormalised booking rows into the relational schema
//!
//! Referenced stations, classes, statuses, passengers and journeys are
//! created on first sight. Bookings are keyed by ticket number, so importing
//! the same file twice leaves the store unchanged.

use crate::db::DbPool;
use crate::error::Result;
use crate::models::BookingCsvRecord;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info};

const INSERT_STATION: &str =
    "INSERT INTO train_station (station_name) VALUES (?) ON CONFLICT (station_name) DO NOTHING";
const SELECT_STATION: &str = "SELECT id FROM train_station WHERE station_name = ?";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub bookings_inserted: usize,
    pub bookings_skipped: usize,
    pub stations: usize,
    pub classes: usize,
    pub statuses: usize,
    pub passengers: usize,
    pub journeys: usize,
}

/// Name → id lookups for the reference tables touched by one import
#[derive(Default)]
struct EntityIds {
    stations: HashMap<String, i64>,
    classes: HashMap<String, i64>,
    statuses: HashMap<String, i64>,
    passengers: HashMap<String, i64>,
    journeys: HashMap<String, i64>,
}

async fn named_id(
    conn: &mut SqliteConnection,
    cache: &mut HashMap<String, i64>,
    insert_sql: &str,
    select_sql: &str,
    name: &str,
) -> Result<i64> {
    if let Some(id) = cache.get(name) {
        return Ok(*id);
    }
    sqlx::query(insert_sql).bind(name).execute(&mut *conn).await?;
    let id: i64 = sqlx::query_scalar(select_sql).bind(name).fetch_one(&mut *conn).await?;
    cache.insert(name.to_string(), id);
    Ok(id)
}

async fn passenger_id(
    conn: &mut SqliteConnection,
    ids: &mut EntityIds,
    record: &BookingCsvRecord,
) -> Result<i64> {
    if let Some(id) = ids.passengers.get(&record.email_address) {
        return Ok(*id);
    }
    sqlx::query(
        "INSERT INTO passenger (first_name, last_name, email_address) VALUES (?, ?, ?) \
         ON CONFLICT (email_address) DO NOTHING",
    )
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(&record.email_address)
    .execute(&mut *conn)
    .await?;
    let id: i64 = sqlx::query_scalar("SELECT id FROM passenger WHERE email_address = ?")
        .bind(&record.email_address)
        .fetch_one(&mut *conn)
        .await?;
    ids.passengers.insert(record.email_address.clone(), id);
    Ok(id)
}

/// Write `records` to the store in a single transaction
pub async fn ingest_records(pool: &DbPool, records: &[BookingCsvRecord]) -> Result<IngestSummary> {
    let mut tx = pool.begin().await?;
    let mut ids = EntityIds::default();
    let mut summary = IngestSummary::default();

    for record in records {
        let origin = named_id(
            &mut *tx,
            &mut ids.stations,
            INSERT_STATION,
            SELECT_STATION,
            &record.origin_station,
        )
        .await?;
        let destination = named_id(
            &mut *tx,
            &mut ids.stations,
            INSERT_STATION,
            SELECT_STATION,
            &record.destination_station,
        )
        .await?;
        let class = named_id(
            &mut *tx,
            &mut ids.classes,
            "INSERT INTO carriage_class (class_name) VALUES (?) \
             ON CONFLICT (class_name) DO NOTHING",
            "SELECT id FROM carriage_class WHERE class_name = ?",
            &record.class_name,
        )
        .await?;
        let status = named_id(
            &mut *tx,
            &mut ids.statuses,
            "INSERT INTO booking_status (name) VALUES (?) ON CONFLICT (name) DO NOTHING",
            "SELECT id FROM booking_status WHERE name = ?",
            &record.status,
        )
        .await?;
        let journey = named_id(
            &mut *tx,
            &mut ids.journeys,
            "INSERT INTO train_journey (name) VALUES (?) ON CONFLICT (name) DO NOTHING",
            "SELECT id FROM train_journey WHERE name = ?",
            &record.journey_name,
        )
        .await?;
        let passenger = passenger_id(&mut *tx, &mut ids, record).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO booking (passenger_id, status_id, booking_date, starting_station_id,
                ending_station_id, train_journey_id, ticket_class_id, amount_paid,
                ticket_no, seat_no)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (ticket_no) DO NOTHING
            "#,
        )
        .bind(passenger)
        .bind(status)
        .bind(record.booking_date)
        .bind(origin)
        .bind(destination)
        .bind(journey)
        .bind(class)
        .bind(record.amount_paid)
        .bind(record.ticket_no)
        .bind(&record.seat_no)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Ticket {} already present, skipping", record.ticket_no);
            summary.bookings_skipped += 1;
        } else {
            summary.bookings_inserted += 1;
        }
    }

    tx.commit().await?;

    summary.stations = ids.stations.len();
    summary.classes = ids.classes.len();
    summary.statuses = ids.statuses.len();
    summary.passengers = ids.passengers.len();
    summary.journeys = ids.journeys.len();

    info!(
        "Imported {} bookings ({} skipped) across {} stations, {} passengers, {} journeys",
        summary.bookings_inserted,
        summary.bookings_skipped,
        summary.stations,
        summary.passengers,
        summary.journeys
    );

    Ok(summary)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::memory_pool;
    use chrono::NaiveDate;

    /// Confirmed booking for a fixed passenger on a fixed journey
    pub(crate) fn csv_record(
        ticket_no: i64,
        date: &str,
        origin: &str,
        destination: &str,
        class_name: &str,
        amount_paid: i64,
    ) -> BookingCsvRecord {
        BookingCsvRecord {
            booking_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount_paid,
            ticket_no,
            seat_no: format!("A{}", ticket_no),
            origin_station: origin.to_string(),
            destination_station: destination.to_string(),
            class_name: class_name.to_string(),
            status: "Confirmed".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email_address: "ada@example.com".to_string(),
            journey_name: "Morning Express".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ingest_creates_reference_entities_once() {
        let pool = memory_pool().await;
        let summary = ingest_records(
            &pool,
            &[
                csv_record(1, "2024-03-01", "Dublin", "Cork", "First", 120),
                csv_record(2, "2024-03-02", "Cork", "Dublin", "Economy", 40),
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary.bookings_inserted, 2);
        assert_eq!(summary.stations, 2);
        assert_eq!(summary.classes, 2);
        assert_eq!(summary.passengers, 1);

        let stations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM train_station")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stations, 2);
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent_per_ticket() {
        let pool = memory_pool().await;
        let records = vec![csv_record(7, "2024-03-01", "Dublin", "Cork", "First", 120)];

        ingest_records(&pool, &records).await.unwrap();
        let again = ingest_records(&pool, &records).await.unwrap();

        assert_eq!(again.bookings_inserted, 0);
        assert_eq!(again.bookings_skipped, 1);
        let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM booking")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(bookings, 1);
    }
}
