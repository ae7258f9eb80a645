//! Typed access to the panel's REST resources.
//!
//! Every call goes through the [`Gateway`]; non-2xx answers are turned into
//! [`ApiError::Application`] here, since the gateway passes them through as-is.

pub mod bots;
pub mod dashboard;
pub mod models;
pub mod profile;
pub mod reservations;
pub mod services;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{Gateway, RequestOptions};
use crate::error::{ApiError, Result};

pub use bots::BotsApi;
pub use dashboard::{Dashboard, DashboardStats};
pub use profile::ProfileApi;
pub use reservations::ReservationsApi;
pub use services::ServicesApi;

/// Entry point bundling the resource clients over one gateway.
#[derive(Clone)]
pub struct PanelApi {
    gateway: Gateway,
}

impl PanelApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn bots(&self) -> BotsApi {
        BotsApi::new(self.gateway.clone())
    }

    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.gateway.clone())
    }

    pub fn reservations(&self) -> ReservationsApi {
        ReservationsApi::new(self.gateway.clone())
    }

    pub fn profile(&self) -> ProfileApi {
        ProfileApi::new(self.gateway.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.clone())
    }
}

pub(crate) async fn get_json<T: DeserializeOwned>(gateway: &Gateway, endpoint: &str) -> Result<T> {
    let response = gateway.send(endpoint, RequestOptions::get()).await?;
    Ok(ensure_success(response).await?.json().await?)
}

pub(crate) async fn send_json<B, T>(
    gateway: &Gateway,
    endpoint: &str,
    options: RequestOptions,
    payload: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = gateway.send(endpoint, options.json(payload)?).await?;
    Ok(ensure_success(response).await?.json().await?)
}

/// Turn a non-2xx response into [`ApiError::Application`], keeping the backend's
/// `detail` (or `error`) message when it sent one.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("detail")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    tracing::debug!("Backend returned {}: {}", status, detail);
    Err(ApiError::Application { status, detail })
}
