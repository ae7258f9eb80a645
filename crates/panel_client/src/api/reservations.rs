use serde_json::json;
use tracing::info;

use super::models::{Reservation, ReservationDraft, ReservationStatus};
use super::{get_json, send_json};
use crate::auth::{Gateway, RequestOptions};
use crate::error::Result;

#[derive(Clone)]
pub struct ReservationsApi {
    gateway: Gateway,
}

impl ReservationsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Reservation>> {
        get_json(&self.gateway, "reservas/").await
    }

    pub async fn create(&self, draft: &ReservationDraft) -> Result<Reservation> {
        let reservation: Reservation =
            send_json(&self.gateway, "reservas/", RequestOptions::post(), draft).await?;
        info!(
            "[OK] Created reservation {} at {}",
            reservation.id, reservation.starts_at
        );
        Ok(reservation)
    }

    /// Cancelling is a partial update of the status; the reservation is kept.
    pub async fn cancel(&self, id: i64) -> Result<Reservation> {
        let payload = json!({ "estado": ReservationStatus::Cancelled.as_str() });
        let reservation: Reservation = send_json(
            &self.gateway,
            &format!("reservas/{}/", id),
            RequestOptions::patch(),
            &payload,
        )
        .await?;
        info!("[OK] Cancelled reservation {}", id);
        Ok(reservation)
    }
}
