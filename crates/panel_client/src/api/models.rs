use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A booking bot owned by a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion", default)]
    pub description: String,

    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,

    /// Blocked by an administrator
    #[serde(rename = "bloqueado", default)]
    pub blocked: bool,

    #[serde(rename = "cliente_nombre", default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    /// Active, not blocked, and the owning business is active
    #[serde(rename = "esta_operativo", default, skip_serializing_if = "Option::is_none")]
    pub operational: Option<bool>,

    #[serde(rename = "total_reservas", default, skip_serializing_if = "Option::is_none")]
    pub total_reservations: Option<u64>,

    #[serde(rename = "reservas_pendientes", default, skip_serializing_if = "Option::is_none")]
    pub pending_reservations: Option<u64>,

    #[serde(rename = "servicios", default)]
    pub services: Vec<Service>,
}

/// Fields accepted when creating or replacing a bot.
#[derive(Debug, Clone, Serialize)]
pub struct BotDraft {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "prompt_sistema", skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(rename = "whatsapp_phone_id", skip_serializing_if = "Option::is_none")]
    pub whatsapp_phone_id: Option<String>,
}

/// A service offered by a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion", default)]
    pub description: String,

    /// Decimal amount as sent by the backend, e.g. "25.00"
    #[serde(rename = "precio")]
    pub price: String,

    pub bot: i64,

    #[serde(rename = "bot_nombre", default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDraft {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "precio")]
    pub price: String,

    pub bot: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReservationStatus {
    #[default]
    #[serde(rename = "Confirmada")]
    Confirmed,
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Cancelada")]
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "Confirmada",
            ReservationStatus::Pending => "Pendiente",
            ReservationStatus::Cancelled => "Cancelada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,

    pub bot: i64,

    #[serde(rename = "bot_nombre", default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,

    #[serde(rename = "servicio", default)]
    pub service: Option<i64>,

    #[serde(rename = "servicio_nombre", default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(rename = "cliente_final_nombre")]
    pub customer_name: String,

    #[serde(rename = "cliente_final_telefono", default)]
    pub customer_phone: String,

    #[serde(rename = "fecha_hora_inicio")]
    pub starts_at: DateTime<Utc>,

    #[serde(rename = "fecha_hora_fin")]
    pub ends_at: DateTime<Utc>,

    #[serde(rename = "estado", default)]
    pub status: ReservationStatus,

    /// Whether the backend still allows cancelling (more than 24h ahead)
    #[serde(rename = "puede_cancelar", default, skip_serializing_if = "Option::is_none")]
    pub cancellable: Option<bool>,

    #[serde(rename = "notas", default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationDraft {
    pub bot: i64,

    #[serde(rename = "servicio", skip_serializing_if = "Option::is_none")]
    pub service: Option<i64>,

    #[serde(rename = "cliente_final_nombre")]
    pub customer_name: String,

    #[serde(rename = "cliente_final_telefono")]
    pub customer_phone: String,

    #[serde(rename = "fecha_hora_inicio")]
    pub starts_at: DateTime<Utc>,

    #[serde(rename = "fecha_hora_fin")]
    pub ends_at: DateTime<Utc>,

    #[serde(rename = "notas")]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Business profile attached to a non-admin user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(rename = "nombre_emprendimiento")]
    pub name: String,

    #[serde(rename = "telefono", default)]
    pub phone: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub max_bots_allowed: Option<u32>,
}

/// Response of `GET me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user: User,
    #[serde(rename = "cliente", default)]
    pub business: Option<Business>,
}

impl Profile {
    /// Name to greet the user with: business name, else username.
    pub fn display_name(&self) -> &str {
        self.business
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or(&self.user.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardKind {
    #[serde(rename = "admin_dashboard")]
    Admin,
    #[serde(rename = "emprendimiento_dashboard")]
    Business,
    #[serde(rename = "limited_dashboard")]
    Limited,
}

impl DashboardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardKind::Admin => "admin_dashboard",
            DashboardKind::Business => "emprendimiento_dashboard",
            DashboardKind::Limited => "limited_dashboard",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub has_cliente_profile: bool,
}

/// Which dashboard the logged-in user gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub dashboard_type: DashboardKind,
    #[serde(default)]
    pub user_info: DashboardUser,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bot_from_backend_payload() {
        let bot: Bot = serde_json::from_value(json!({
            "id": 3,
            "nombre": "Recepción",
            "descripcion": "Bot de turnos",
            "activo": true,
            "bloqueado": false,
            "prompt_sistema": "Eres un asistente",
            "whatsapp_phone_id": "123",
            "servicios": [
                { "id": 7, "nombre": "Corte", "descripcion": "", "precio": "25.00", "bot": 3, "bot_nombre": "Recepción" }
            ],
            "total_reservas": 4,
            "cliente": 1,
            "cliente_nombre": "Peluquería Ana",
            "esta_operativo": true,
            "reservas_pendientes": 1,
            "fecha_creacion": "2025-01-10T10:00:00Z",
            "fecha_modificacion": "2025-01-11T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(bot.name, "Recepción");
        assert_eq!(bot.services[0].price, "25.00");
        assert_eq!(bot.total_reservations, Some(4));
        assert_eq!(bot.business_name.as_deref(), Some("Peluquería Ana"));
    }

    #[test]
    fn test_reservation_status_wire_names() {
        let reservation: Reservation = serde_json::from_value(json!({
            "id": 1,
            "bot": 3,
            "servicio": null,
            "cliente_final_nombre": "Luis",
            "cliente_final_telefono": "555",
            "fecha_hora_inicio": "2025-03-01T15:00:00-03:00",
            "fecha_hora_fin": "2025-03-01T16:00:00-03:00",
            "estado": "Pendiente",
            "notas": ""
        }))
        .unwrap();

        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.starts_at.to_rfc3339(), "2025-03-01T18:00:00+00:00");
        assert_eq!(
            serde_json::to_value(ReservationStatus::Cancelled).unwrap(),
            json!("Cancelada")
        );
    }

    #[test]
    fn test_profile_display_name() {
        let admin: Profile = serde_json::from_value(json!({
            "user": { "id": 1, "username": "root", "is_superuser": true },
            "cliente": null
        }))
        .unwrap();
        assert_eq!(admin.display_name(), "root");

        let owner: Profile = serde_json::from_value(json!({
            "user": { "id": 2, "username": "ana" },
            "cliente": { "id": 5, "nombre_emprendimiento": "Peluquería Ana", "telefono": "555" }
        }))
        .unwrap();
        assert_eq!(owner.display_name(), "Peluquería Ana");
    }

    #[test]
    fn test_bot_draft_uses_backend_names() {
        let draft = BotDraft {
            name: "Nuevo".to_string(),
            description: String::new(),
            active: false,
            system_prompt: None,
            whatsapp_phone_id: None,
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({ "nombre": "Nuevo", "descripcion": "", "activo": false })
        );
    }
}
