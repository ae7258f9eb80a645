use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use super::models::{Bot, Reservation, ReservationStatus, Service};
use super::PanelApi;
use crate::error::Result;

const UPCOMING_LIMIT: usize = 5;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub active_bots: usize,
    /// Reservations that are not cancelled
    pub active_reservations: usize,
    pub pending_reservations: usize,
    /// Reservations starting in the current calendar month
    pub monthly_bookings: usize,
    /// Next non-cancelled reservations, soonest first
    pub upcoming: Vec<Reservation>,
}

impl DashboardStats {
    /// Compute stats as of `now`. The calendar month is taken in `now`'s time zone.
    pub fn compute<Tz: TimeZone>(
        bots: &[Bot],
        reservations: &[Reservation],
        now: DateTime<Tz>,
    ) -> Self {
        let active_bots = bots.iter().filter(|b| b.active).count();

        let live: Vec<&Reservation> = reservations
            .iter()
            .filter(|r| r.status != ReservationStatus::Cancelled)
            .collect();

        let pending_reservations = reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Pending)
            .count();

        let zone = now.timezone();
        let monthly_bookings = reservations
            .iter()
            .map(|r| r.starts_at.with_timezone(&zone))
            .filter(|start| start.year() == now.year() && start.month() == now.month())
            .count();

        let now = now.with_timezone(&Utc);
        let mut upcoming: Vec<Reservation> = live
            .iter()
            .filter(|r| r.starts_at > now)
            .map(|r| (*r).clone())
            .collect();
        upcoming.sort_by_key(|r| r.starts_at);
        upcoming.truncate(UPCOMING_LIMIT);

        Self {
            active_bots,
            active_reservations: live.len(),
            pending_reservations,
            monthly_bookings,
            upcoming,
        }
    }
}

/// Everything the dashboard shows, loaded in one go.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub bots: Vec<Bot>,
    pub reservations: Vec<Reservation>,
    pub services: Vec<Service>,
    pub stats: DashboardStats,
}

pub struct Dashboard {
    api: PanelApi,
}

impl Dashboard {
    pub fn new(api: PanelApi) -> Self {
        Self { api }
    }

    /// Load bots, reservations and services concurrently, then compute stats.
    ///
    /// Each load is its own gateway call, so a 401 on any of them refreshes
    /// independently of the others.
    pub async fn load(&self) -> Result<DashboardData> {
        let bots_api = self.api.bots();
        let reservations_api = self.api.reservations();
        let services_api = self.api.services();

        let (bots, reservations, services) = futures::try_join!(
            bots_api.list(),
            reservations_api.list(),
            services_api.list(),
        )?;

        let stats = DashboardStats::compute(&bots, &reservations, Local::now());
        info!(
            "[OK] Dashboard loaded: {} bots, {} reservations, {} services",
            bots.len(),
            reservations.len(),
            services.len()
        );

        Ok(DashboardData {
            bots,
            reservations,
            services,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Gateway, MemorySessionStore, Session};
    use crate::config::ClientConfig;
    use chrono::FixedOffset;
    use mockito::Server;
    use serde_json::json;
    use std::sync::Arc;

    fn bot(id: i64, active: bool) -> Bot {
        serde_json::from_value(json!({ "id": id, "nombre": format!("bot-{id}"), "activo": active }))
            .unwrap()
    }

    fn reservation(id: i64, starts_at: DateTime<Utc>, status: ReservationStatus) -> Reservation {
        Reservation {
            id,
            bot: 1,
            bot_name: None,
            service: None,
            service_name: None,
            customer_name: format!("customer-{id}"),
            customer_phone: String::new(),
            starts_at,
            ends_at: starts_at + chrono::Duration::hours(1),
            status,
            cancellable: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_compute_stats() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let bots = vec![bot(1, true), bot(2, false), bot(3, true)];
        let reservations = vec![
            reservation(1, Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(), ReservationStatus::Confirmed),
            reservation(2, Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap(), ReservationStatus::Pending),
            reservation(3, Utc.with_ymd_and_hms(2025, 3, 18, 9, 0, 0).unwrap(), ReservationStatus::Cancelled),
            reservation(4, Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap(), ReservationStatus::Confirmed),
            reservation(5, Utc.with_ymd_and_hms(2024, 3, 16, 9, 0, 0).unwrap(), ReservationStatus::Confirmed),
        ];

        let stats = DashboardStats::compute(&bots, &reservations, now);
        assert_eq!(stats.active_bots, 2);
        assert_eq!(stats.active_reservations, 4);
        assert_eq!(stats.pending_reservations, 1);
        assert_eq!(stats.monthly_bookings, 3);

        let upcoming: Vec<i64> = stats.upcoming.iter().map(|r| r.id).collect();
        assert_eq!(upcoming, vec![2, 4]);
    }

    #[test]
    fn test_monthly_bookings_follow_time_zone_of_now() {
        let zone = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap();
        let reservations = vec![
            // 2025-03-31 22:30 at -03:00
            reservation(1, Utc.with_ymd_and_hms(2025, 4, 1, 1, 30, 0).unwrap(), ReservationStatus::Confirmed),
            // 2025-03-01 00:30 at -03:00
            reservation(2, Utc.with_ymd_and_hms(2025, 3, 1, 3, 30, 0).unwrap(), ReservationStatus::Confirmed),
        ];

        let stats = DashboardStats::compute(&[], &reservations, now);
        assert_eq!(stats.monthly_bookings, 2);
        let upcoming: Vec<i64> = stats.upcoming.iter().map(|r| r.id).collect();
        assert_eq!(upcoming, vec![1]);
    }

    #[test]
    fn test_upcoming_is_capped() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let reservations: Vec<Reservation> = (1..=8)
            .rev()
            .map(|day| {
                reservation(
                    day,
                    Utc.with_ymd_and_hms(2025, 3, day as u32 + 1, 10, 0, 0).unwrap(),
                    ReservationStatus::Confirmed,
                )
            })
            .collect();

        let stats = DashboardStats::compute(&[], &reservations, now);
        let upcoming: Vec<i64> = stats.upcoming.iter().map(|r| r.id).collect();
        assert_eq!(upcoming, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_load_fetches_all_resources() {
        let mut server = Server::new_async().await;
        let config = ClientConfig::new(&format!("{}/api/", server.url())).unwrap();
        let store = MemorySessionStore::with_session(Session::new("A1", "R1"));
        let api = PanelApi::new(Gateway::new(config, Arc::new(store)));

        let bots = server
            .mock("GET", "/api/bots/")
            .with_status(200)
            .with_body(r#"[{"id":1,"nombre":"Recepción","activo":true}]"#)
            .expect(1)
            .create_async()
            .await;
        let reservations = server
            .mock("GET", "/api/reservas/")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let services = server
            .mock("GET", "/api/servicios/")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let data = api.dashboard().load().await.unwrap();
        assert_eq!(data.stats.active_bots, 1);
        assert!(data.reservations.is_empty());

        bots.assert_async().await;
        reservations.assert_async().await;
        services.assert_async().await;
    }
}
