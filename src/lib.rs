//! Train booking analytics
//!
//! Loads bookings joined against their stations, classes, statuses,
//! passengers and journeys, and aggregates them into reporting views served
//! over a REST API.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
