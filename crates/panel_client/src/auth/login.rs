use reqwest::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::gateway::{Gateway, RequestOptions, SessionEvent};
use super::session_store::Session;
use crate::api::models::DashboardConfig;
use crate::error::AuthError;

const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenPairResponse {
    access: Option<String>,
    refresh: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct DashboardLoginResponse {
    access: Option<String>,
    refresh: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    config: Option<DashboardConfig>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Login and logout on top of a [`Gateway`].
#[derive(Clone)]
pub struct Authenticator {
    gateway: Gateway,
}

impl Authenticator {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway.store().get().access_token.is_some()
    }

    /// Obtain a token pair with username and password and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let response = self
            .post_credentials(&self.gateway.config().login_path, username, password)
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: TokenPairResponse = response.json().await?;
        match (body.access, body.refresh) {
            (Some(access), Some(refresh)) => {
                self.start_session(Session::new(access, refresh))?;
                debug!("Logged in as {}", username);
                Ok(())
            }
            _ => Err(AuthError::Rejected {
                detail: body.detail.unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string()),
            }),
        }
    }

    /// Log in through the dashboard endpoint, which also reports which dashboard
    /// the user is allowed to see.
    pub async fn dashboard_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DashboardConfig, AuthError> {
        let response = self
            .post_credentials(&self.gateway.config().dashboard_login_path, username, password)
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: DashboardLoginResponse = response.json().await?;
        match (body.access, body.refresh, body.config) {
            (Some(access), Some(refresh), Some(config)) => {
                self.start_session(Session::new(access, refresh))?;
                debug!(
                    "Logged in as {} ({})",
                    username,
                    config.dashboard_type.as_str()
                );
                Ok(config)
            }
            _ => Err(AuthError::Rejected {
                detail: body.error.unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string()),
            }),
        }
    }

    /// End the session.
    ///
    /// The backend is told first when there is a token to tell it with; its answer
    /// does not matter. Local tokens and cached user data are always wiped.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            let endpoint = self.gateway.config().dashboard_logout_path.clone();
            match self.gateway.send(&endpoint, RequestOptions::post()).await {
                Ok(response) => debug!("Server logout returned {}", response.status()),
                Err(e) => warn!("Server logout failed: {}", e),
            }
        }

        self.gateway.end_session(SessionEvent::LoggedOut);
        debug!("Session ended by user");
    }

    async fn post_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<Response, AuthError> {
        let url = self
            .gateway
            .config()
            .resolve(path)
            .map_err(|e| AuthError::Rejected {
                detail: format!("Invalid login endpoint: {}", e),
            })?;

        let response = self
            .gateway
            .http()
            .post(url)
            .json(&Credentials { username, password })
            .send()
            .await?;
        Ok(response)
    }

    fn start_session(&self, session: Session) -> Result<(), AuthError> {
        self.gateway.store().set(session)?;
        self.gateway.clear_profile();
        self.gateway.publish(SessionEvent::LoggedIn);
        Ok(())
    }
}

async fn rejection(response: Response) -> AuthError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let detail = body
        .detail
        .or(body.error)
        .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
    debug!("Login rejected with {}: {}", status, detail);
    AuthError::Rejected { detail }
}
