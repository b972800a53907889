//! Booking aggregation views
//!
//! Every view is a pure function over an enriched booking slice. Groups are
//! collected in ordered maps, so un-ranked output is ordered by grouping key.
//! Ranked views sort those key-ordered groups with a stable descending sort,
//! which breaks ties on the ranking metric by grouping key ascending.
//!
//! Monetary amounts stay integer sums here; conversion to floating point
//! happens when responses are shaped.

use crate::models::{BookingRecord, BookingRow};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Number of routes kept in the revenue-by-route breakdown
pub const REVENUE_ROUTE_LIMIT: usize = 10;

// ============================================================================
// Derived fields
// ============================================================================

pub fn format_route(origin: &str, destination: &str) -> String {
    format!("{} → {}", origin, destination)
}

pub fn format_passenger_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

/// Attach `route` and `passenger_name` to every loaded row
pub fn enrich(rows: Vec<BookingRow>) -> Vec<BookingRecord> {
    rows.into_iter()
        .map(|row| BookingRecord {
            route: format_route(&row.origin_station, &row.destination_station),
            passenger_name: format_passenger_name(&row.first_name, &row.last_name),
            id: row.id,
            booking_date: row.booking_date,
            amount_paid: row.amount_paid,
            ticket_no: row.ticket_no,
            seat_no: row.seat_no,
            origin_station: row.origin_station,
            destination_station: row.destination_station,
            class_name: row.class_name,
            status: row.status,
            first_name: row.first_name,
            last_name: row.last_name,
            email_address: row.email_address,
            journey_name: row.journey_name,
        })
        .collect()
}

// ============================================================================
// View outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub total_revenue: i64,
    pub average_booking_value: f64,
    pub bookings_by_status: BTreeMap<String, i64>,
    pub bookings_by_class: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRevenue {
    pub date: NaiveDate,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassRevenue {
    pub class_name: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRevenue {
    pub route: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueStats {
    pub total_revenue: i64,
    pub revenue_by_date: Vec<DateRevenue>,
    pub revenue_by_class: Vec<ClassRevenue>,
    pub revenue_by_route: Vec<RouteRevenue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStat {
    pub origin: String,
    pub destination: String,
    pub route: String,
    pub booking_count: i64,
    pub total_revenue: i64,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub booking_count: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare {
    pub class_name: String,
    pub booking_count: i64,
    pub revenue: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassengerSpend {
    pub name: String,
    pub email: String,
    pub total_bookings: i64,
    pub total_spent: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JourneyStat {
    pub journey_name: String,
    pub total_bookings: i64,
    pub total_revenue: i64,
    pub average_booking_value: f64,
}

// ============================================================================
// Grouping
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals {
    count: i64,
    revenue: i64,
}

impl Totals {
    fn add(&mut self, amount: i64) {
        self.count += 1;
        self.revenue += amount;
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.revenue as f64 / self.count as f64
        }
    }
}

fn totals(records: &[BookingRecord]) -> Totals {
    let mut totals = Totals::default();
    for record in records {
        totals.add(record.amount_paid);
    }
    totals
}

fn group_by<K, F>(records: &[BookingRecord], key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&BookingRecord) -> K,
{
    let mut groups: BTreeMap<K, Totals> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().add(record.amount_paid);
    }
    groups
}

/// Stable descending sort on `metric`, then keep the first `limit`
fn top_n<T, M, F>(mut items: Vec<T>, limit: usize, metric: F) -> Vec<T>
where
    M: Ord,
    F: Fn(&T) -> M,
{
    items.sort_by(|a, b| metric(b).cmp(&metric(a)));
    items.truncate(limit);
    items
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Views
// ============================================================================

/// Whole-range totals plus booking counts per status and per class
pub fn booking_stats(records: &[BookingRecord]) -> BookingStats {
    let overall = totals(records);
    let count_map = |groups: BTreeMap<String, Totals>| -> BTreeMap<String, i64> {
        groups.into_iter().map(|(k, t)| (k, t.count)).collect()
    };

    BookingStats {
        total_bookings: overall.count,
        total_revenue: overall.revenue,
        average_booking_value: overall.average(),
        bookings_by_status: count_map(group_by(records, |r| r.status.clone())),
        bookings_by_class: count_map(group_by(records, |r| r.class_name.clone())),
    }
}

pub fn revenue_stats(records: &[BookingRecord]) -> RevenueStats {
    let revenue_by_date = group_by(records, |r| r.booking_date)
        .into_iter()
        .map(|(date, t)| DateRevenue { date, revenue: t.revenue })
        .collect();

    let revenue_by_class = group_by(records, |r| r.class_name.clone())
        .into_iter()
        .map(|(class_name, t)| ClassRevenue { class_name, revenue: t.revenue })
        .collect();

    let routes: Vec<RouteRevenue> = group_by(records, |r| r.route.clone())
        .into_iter()
        .map(|(route, t)| RouteRevenue { route, revenue: t.revenue })
        .collect();

    RevenueStats {
        total_revenue: totals(records).revenue,
        revenue_by_date,
        revenue_by_class,
        revenue_by_route: top_n(routes, REVENUE_ROUTE_LIMIT, |r| r.revenue),
    }
}

/// Routes ranked by booking count
pub fn popular_routes(records: &[BookingRecord], limit: usize) -> Vec<RouteStat> {
    let by_route = group_by(records, |r| {
        (r.origin_station.clone(), r.destination_station.clone())
    });
    let routes: Vec<RouteStat> = by_route
        .into_iter()
        .map(|((origin, destination), t)| RouteStat {
            route: format_route(&origin, &destination),
            origin,
            destination,
            booking_count: t.count,
            total_revenue: t.revenue,
            average_price: t.average(),
        })
        .collect();

    top_n(routes, limit, |r| r.booking_count)
}

/// One entry per booking date present, oldest first
pub fn daily_trends(records: &[BookingRecord]) -> Vec<DailyTrend> {
    group_by(records, |r| r.booking_date)
        .into_iter()
        .map(|(date, t)| DailyTrend {
            date,
            booking_count: t.count,
            revenue: t.revenue,
        })
        .collect()
}

/// Booking share per carriage class, percentages rounded to two decimals
pub fn class_distribution(records: &[BookingRecord]) -> Vec<ClassShare> {
    let total = records.len() as f64;
    group_by(records, |r| r.class_name.clone())
        .into_iter()
        .map(|(class_name, t)| ClassShare {
            class_name,
            booking_count: t.count,
            revenue: t.revenue,
            percentage: round2(t.count as f64 / total * 100.0),
        })
        .collect()
}

/// Passengers ranked by total amount spent
pub fn top_spenders(records: &[BookingRecord], limit: usize) -> Vec<PassengerSpend> {
    let by_passenger = group_by(records, |r| {
        (r.passenger_name.clone(), r.email_address.clone())
    });
    let passengers: Vec<PassengerSpend> = by_passenger
        .into_iter()
        .map(|((name, email), t)| PassengerSpend {
            name,
            email,
            total_bookings: t.count,
            total_spent: t.revenue,
        })
        .collect();

    top_n(passengers, limit, |p| p.total_spent)
}

/// Journeys ranked by booking count
pub fn journey_performance(records: &[BookingRecord], limit: usize) -> Vec<JourneyStat> {
    let journeys: Vec<JourneyStat> = group_by(records, |r| r.journey_name.clone())
        .into_iter()
        .map(|(journey_name, t)| JourneyStat {
            journey_name,
            total_bookings: t.count,
            total_revenue: t.revenue,
            average_booking_value: t.average(),
        })
        .collect();

    top_n(journeys, limit, |j| j.total_bookings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(
        day: &str,
        origin: &str,
        destination: &str,
        class_name: &str,
        amount: i64,
    ) -> BookingRecord {
        let row = BookingRow {
            id: 0,
            booking_date: date(day),
            amount_paid: amount,
            ticket_no: 0,
            seat_no: "A1".to_string(),
            origin_station: origin.to_string(),
            destination_station: destination.to_string(),
            class_name: class_name.to_string(),
            status: "Confirmed".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email_address: "ada@example.com".to_string(),
            journey_name: "Morning Express".to_string(),
        };
        enrich(vec![row]).remove(0)
    }

    fn with_passenger(mut r: BookingRecord, first: &str, last: &str, email: &str) -> BookingRecord {
        r.first_name = first.to_string();
        r.last_name = last.to_string();
        r.passenger_name = format_passenger_name(first, last);
        r.email_address = email.to_string();
        r
    }

    fn grace(r: BookingRecord) -> BookingRecord {
        with_passenger(r, "Grace", "Hopper", "grace@example.com")
    }

    fn with_journey(mut r: BookingRecord, journey: &str) -> BookingRecord {
        r.journey_name = journey.to_string();
        r
    }

    fn with_status(mut r: BookingRecord, status: &str) -> BookingRecord {
        r.status = status.to_string();
        r
    }

    fn mixed() -> Vec<BookingRecord> {
        vec![
            record("2024-03-01", "A", "B", "First", 100),
            with_status(record("2024-03-01", "A", "B", "Economy", 40), "Cancelled"),
            record("2024-03-02", "B", "C", "Economy", 35),
            record("2024-03-03", "C", "A", "Business", 80),
            record("2024-03-03", "A", "C", "Economy", 25),
        ]
    }

    #[test]
    fn test_enrich_derives_route_and_name() {
        let r = record("2024-03-01", "Dublin", "Cork", "First", 10);
        assert_eq!(r.route, "Dublin → Cork");
        assert_eq!(r.passenger_name, "Ada Lovelace");
    }

    #[test]
    fn test_empty_input() {
        let stats = booking_stats(&[]);
        assert_eq!(stats.total_bookings, 0);
        assert_eq!(stats.total_revenue, 0);
        assert_eq!(stats.average_booking_value, 0.0);
        assert!(stats.bookings_by_status.is_empty());
        assert!(stats.bookings_by_class.is_empty());

        let revenue = revenue_stats(&[]);
        assert_eq!(revenue.total_revenue, 0);
        assert!(revenue.revenue_by_date.is_empty());
        assert!(revenue.revenue_by_class.is_empty());
        assert!(revenue.revenue_by_route.is_empty());

        assert!(popular_routes(&[], 10).is_empty());
        assert!(daily_trends(&[]).is_empty());
        assert!(class_distribution(&[]).is_empty());
        assert!(top_spenders(&[], 5).is_empty());
        assert!(journey_performance(&[], 5).is_empty());
    }

    #[test]
    fn test_booking_stats_breakdowns() {
        let stats = booking_stats(&mixed());
        assert_eq!(stats.total_bookings, 5);
        assert_eq!(stats.total_revenue, 280);
        assert_eq!(stats.average_booking_value, 56.0);
        assert_eq!(stats.bookings_by_status.get("Confirmed"), Some(&4));
        assert_eq!(stats.bookings_by_status.get("Cancelled"), Some(&1));
        assert_eq!(stats.bookings_by_class.get("Economy"), Some(&3));
        assert_eq!(stats.bookings_by_class.get("First"), Some(&1));
        assert_eq!(stats.bookings_by_class.get("Business"), Some(&1));
    }

    #[test]
    fn test_total_revenue_matches_class_revenue() {
        let records = mixed();
        let stats = booking_stats(&records);
        let revenue = revenue_stats(&records);
        let by_class: i64 = revenue.revenue_by_class.iter().map(|c| c.revenue).sum();
        assert_eq!(stats.total_revenue, by_class);
        assert_eq!(revenue.total_revenue, stats.total_revenue);
    }

    #[test]
    fn test_revenue_stats_groups() {
        let revenue = revenue_stats(&mixed());
        assert_eq!(
            revenue.revenue_by_date,
            vec![
                DateRevenue {
                    date: date("2024-03-01"),
                    revenue: 140,
                },
                DateRevenue {
                    date: date("2024-03-02"),
                    revenue: 35,
                },
                DateRevenue {
                    date: date("2024-03-03"),
                    revenue: 105,
                },
            ]
        );
        let top_route = RouteRevenue {
            route: "A → B".to_string(),
            revenue: 140,
        };
        assert_eq!(revenue.revenue_by_route[0], top_route);
        assert_eq!(revenue.revenue_by_route.len(), 4);
    }

    #[test]
    fn test_revenue_by_route_keeps_top_ten() {
        let records: Vec<BookingRecord> = (0..12)
            .map(|i| record("2024-03-01", &format!("S{:02}", i), "Hub", "Economy", 10 + i))
            .collect();
        let routes = revenue_stats(&records).revenue_by_route;
        assert_eq!(routes.len(), REVENUE_ROUTE_LIMIT);
        assert_eq!(routes[0].route, "S11 → Hub");
        assert_eq!(routes[9].route, "S02 → Hub");
    }

    #[test]
    fn test_popular_routes_single_route() {
        let records = vec![
            record("2024-03-01", "A", "B", "First", 100),
            record("2024-03-02", "A", "B", "First", 200),
        ];
        let routes = popular_routes(&records, 10);
        assert_eq!(
            routes,
            vec![RouteStat {
                origin: "A".to_string(),
                destination: "B".to_string(),
                route: "A → B".to_string(),
                booking_count: 2,
                total_revenue: 300,
                average_price: 150.0,
            }]
        );
    }

    #[test]
    fn test_popular_routes_limit_one() {
        let mut records = Vec::new();
        for _ in 0..5 {
            records.push(record("2024-03-01", "X", "Y", "Economy", 10));
        }
        for _ in 0..3 {
            records.push(record("2024-03-01", "A", "B", "Economy", 10));
        }
        records.push(record("2024-03-01", "M", "N", "Economy", 10));

        let routes = popular_routes(&records, 1);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route, "X → Y");
        assert_eq!(routes[0].booking_count, 5);
    }

    #[test]
    fn test_ranking_ties_break_on_key() {
        let records = vec![
            record("2024-03-01", "C", "D", "Economy", 10),
            record("2024-03-01", "A", "B", "Economy", 10),
            record("2024-03-01", "B", "C", "Economy", 10),
        ];
        let routes: Vec<String> = popular_routes(&records, 10)
            .into_iter()
            .map(|r| r.route)
            .collect();
        assert_eq!(routes, vec!["A → B", "B → C", "C → D"]);
    }

    #[test]
    fn test_daily_trends_ordered_by_date() {
        let records = vec![
            record("2024-03-02", "A", "B", "Economy", 100),
            record("2024-03-01", "A", "B", "Economy", 50),
            record("2024-03-01", "B", "A", "Economy", 150),
        ];
        assert_eq!(
            daily_trends(&records),
            vec![
                DailyTrend {
                    date: date("2024-03-01"),
                    booking_count: 2,
                    revenue: 200,
                },
                DailyTrend {
                    date: date("2024-03-02"),
                    booking_count: 1,
                    revenue: 100,
                },
            ]
        );
    }

    #[test]
    fn test_class_distribution_sums() {
        let records = vec![
            record("2024-03-01", "A", "B", "First", 100),
            record("2024-03-01", "A", "B", "Economy", 20),
            record("2024-03-01", "A", "B", "Economy", 20),
        ];
        let shares = class_distribution(&records);

        let count: i64 = shares.iter().map(|s| s.booking_count).sum();
        assert_eq!(count, records.len() as i64);

        let pct: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((pct - 100.0).abs() < 0.02, "percentages sum to {}", pct);

        assert_eq!(shares[0].class_name, "Economy");
        assert_eq!(shares[0].percentage, 66.67);
        assert_eq!(shares[0].revenue, 40);
        assert_eq!(shares[1].class_name, "First");
        assert_eq!(shares[1].percentage, 33.33);
    }

    #[test]
    fn test_top_spenders_ranked_by_spend() {
        let records = vec![
            grace(record("2024-03-01", "A", "B", "Economy", 30)),
            grace(record("2024-03-02", "A", "B", "Economy", 30)),
            with_passenger(
                record("2024-03-01", "A", "B", "First", 200),
                "Alan",
                "Turing",
                "alan@example.com",
            ),
            record("2024-03-01", "A", "B", "Economy", 10),
        ];
        let spenders = top_spenders(&records, 2);
        assert_eq!(spenders.len(), 2);
        assert_eq!(spenders[0].name, "Alan Turing");
        assert_eq!(spenders[0].total_spent, 200);
        assert_eq!(spenders[1].name, "Grace Hopper");
        assert_eq!(spenders[1].email, "grace@example.com");
        assert_eq!(spenders[1].total_bookings, 2);
        assert_eq!(spenders[1].total_spent, 60);
    }

    #[test]
    fn test_journey_performance_ranked_by_count() {
        let records = vec![
            with_journey(record("2024-03-01", "A", "B", "Economy", 30), "Night Sleeper"),
            record("2024-03-01", "A", "B", "Economy", 20),
            record("2024-03-01", "A", "B", "First", 70),
        ];
        let journeys = journey_performance(&records, 5);
        assert_eq!(journeys.len(), 2);
        assert_eq!(journeys[0].journey_name, "Morning Express");
        assert_eq!(journeys[0].total_bookings, 2);
        assert_eq!(journeys[0].total_revenue, 90);
        assert_eq!(journeys[0].average_booking_value, 45.0);
        assert_eq!(journeys[1].journey_name, "Night Sleeper");
    }

    #[test]
    fn test_views_are_idempotent() {
        let records = mixed();
        assert_eq!(booking_stats(&records), booking_stats(&records));
        assert_eq!(revenue_stats(&records), revenue_stats(&records));
        assert_eq!(popular_routes(&records, 3), popular_routes(&records, 3));
        assert_eq!(daily_trends(&records), daily_trends(&records));
        assert_eq!(class_distribution(&records), class_distribution(&records));
        assert_eq!(top_spenders(&records, 3), top_spenders(&records, 3));
        assert_eq!(journey_performance(&records, 3), journey_performance(&records, 3));
    }
}
