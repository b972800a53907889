use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Window used when a request does not name both ends of its date range.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Current calendar date in the server's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range ending on `today` and reaching back `days` days.
    pub fn trailing(days: i64, today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    /// Uses the explicit bounds only when both are given, otherwise the
    /// default trailing window.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Self::trailing(DEFAULT_WINDOW_DAYS, today),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// One row of the booking join, exactly as returned by the store
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub booking_date: NaiveDate,
    pub amount_paid: i64,
    pub ticket_no: i64,
    pub seat_no: String,
    pub origin_station: String,
    pub destination_station: String,
    pub class_name: String,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub journey_name: String,
}

/// Booking row with the derived grouping fields filled in
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub id: i64,
    pub booking_date: NaiveDate,
    pub amount_paid: i64,
    pub ticket_no: i64,
    pub seat_no: String,
    pub origin_station: String,
    pub destination_station: String,
    pub class_name: String,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub journey_name: String,
    /// "origin → destination"
    pub route: String,
    /// "first last"
    pub passenger_name: String,
}

/// Denormalised booking as exchanged in CSV files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCsvRecord {
    pub booking_date: NaiveDate,
    pub amount_paid: i64,
    pub ticket_no: i64,
    pub seat_no: String,
    pub origin_station: String,
    pub destination_station: String,
    pub class_name: String,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub journey_name: String,
}
