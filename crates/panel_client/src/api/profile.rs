use super::get_json;
use super::models::{DashboardConfig, Profile};
use crate::auth::Gateway;
use crate::error::Result;

/// The current user and the dashboard they are entitled to.
#[derive(Clone)]
pub struct ProfileApi {
    gateway: Gateway,
}

impl ProfileApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Current user, served from the gateway's cache once fetched. The cache is
    /// dropped whenever the session ends.
    pub async fn me(&self) -> Result<Profile> {
        if let Some(profile) = self.gateway.cached_profile() {
            return Ok(profile);
        }
        self.reload().await
    }

    /// Fetch the current user from the backend, bypassing the cache.
    pub async fn reload(&self) -> Result<Profile> {
        let profile: Profile = get_json(&self.gateway, &self.gateway.config().profile_path).await?;
        self.gateway.cache_profile(profile.clone());
        Ok(profile)
    }

    pub async fn dashboard_config(&self) -> Result<DashboardConfig> {
        get_json(&self.gateway, &self.gateway.config().dashboard_config_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::DashboardKind;
    use crate::auth::{MemorySessionStore, Session};
    use crate::config::ClientConfig;
    use mockito::{Server, ServerGuard};
    use std::sync::Arc;

    const PROFILE: &str = r#"{"user":{"id":2,"username":"ana"},"cliente":{"nombre_emprendimiento":"Peluquería Ana"}}"#;

    async fn setup(session: Session) -> (ServerGuard, ProfileApi, Gateway) {
        let server = Server::new_async().await;
        let config = ClientConfig::new(&format!("{}/api/", server.url())).unwrap();
        let gateway = Gateway::new(config, Arc::new(MemorySessionStore::with_session(session)));
        (server, ProfileApi::new(gateway.clone()), gateway)
    }

    #[tokio::test]
    async fn test_me_is_cached() {
        let (mut server, profile, _gateway) = setup(Session::new("A1", "R1")).await;

        let mock = server
            .mock("GET", "/api/me/")
            .with_status(200)
            .with_body(PROFILE)
            .expect(1)
            .create_async()
            .await;

        assert_eq!(profile.me().await.unwrap().display_name(), "Peluquería Ana");
        assert_eq!(profile.me().await.unwrap().user.username, "ana");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_session_drops_cached_profile() {
        let (mut server, profile, gateway) = setup(Session::new("A1", "R1")).await;

        let _me = server
            .mock("GET", "/api/me/")
            .with_status(200)
            .with_body(PROFILE)
            .create_async()
            .await;
        profile.me().await.unwrap();
        assert!(gateway.cached_profile().is_some());

        let _bots = server
            .mock("GET", "/api/bots/")
            .with_status(401)
            .create_async()
            .await;
        let _refresh = server
            .mock("POST", "/api/token/refresh/")
            .with_status(401)
            .create_async()
            .await;

        let err = crate::api::BotsApi::new(gateway.clone()).list().await.unwrap_err();
        assert!(err.is_session_expired());
        assert!(gateway.cached_profile().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_config() {
        let (mut server, profile, _gateway) = setup(Session::new("A1", "R1")).await;

        let mock = server
            .mock("GET", "/api/dashboard/config/")
            .with_status(200)
            .with_body(r#"{"dashboard_type":"admin_dashboard","user_info":{"is_superuser":true}}"#)
            .expect(1)
            .create_async()
            .await;

        let config = profile.dashboard_config().await.unwrap();
        assert_eq!(config.dashboard_type, DashboardKind::Admin);
        assert!(config.user_info.is_superuser);

        mock.assert_async().await;
    }
}
