//! Authenticated request gateway.
//!
//! Every call to the backend that needs credentials goes through [`Gateway::send`]:
//! the current access token is attached as a bearer token, a 401 triggers one
//! token refresh and one retry, and a failed refresh ends the session.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use super::session_store::SessionStore;
use crate::api::models::Profile;
use crate::config::ClientConfig;
use crate::error::{GatewayError, RefreshError};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle notifications published by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new token pair was stored after a login.
    LoggedIn,
    /// The access token was replaced by a refresh.
    Refreshed,
    /// The user ended the session.
    LoggedOut,
    /// A refresh failed and the session was wiped; the user must log in again.
    Expired,
}

/// Method, extra headers and pre-serialized body of one request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(self.body(serde_json::to_string(payload)?))
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present only when the backend rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

struct GatewayInner {
    config: ClientConfig,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    profile: RwLock<Option<Profile>>,
    events: broadcast::Sender<SessionEvent>,
}

/// The sole authenticated entry point to the backend. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        Self::with_http_client(config, store, reqwest::Client::new())
    }

    pub fn with_http_client(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        http: reqwest::Client,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(GatewayInner {
                config,
                http,
                store,
                profile: RwLock::new(None),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Receive session lifecycle events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub fn cached_profile(&self) -> Option<Profile> {
        self.inner.profile.read().clone()
    }

    pub(crate) fn cache_profile(&self, profile: Profile) {
        *self.inner.profile.write() = Some(profile);
    }

    /// Forget the cached user; it belongs to whichever session fetched it.
    pub(crate) fn clear_profile(&self) {
        *self.inner.profile.write() = None;
    }

    /// Send a request with the current credentials.
    ///
    /// Any status other than 401 is returned untouched. On 401 the access token is
    /// refreshed once and the request re-issued once; that second response is
    /// returned whatever its status. When the refresh fails the session is wiped,
    /// [`SessionEvent::Expired`] is published and [`GatewayError::SessionExpired`]
    /// is returned.
    pub async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response, GatewayError> {
        let url = self
            .inner
            .config
            .resolve(endpoint)
            .map_err(|source| GatewayError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let access_token = self.inner.store.get().access_token;
        let response = self.dispatch(&url, &options, access_token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("{} {} returned 401, refreshing access token", options.method, url.path());

        match self.refresh().await {
            Ok(new_token) => {
                let retry = self.dispatch(&url, &options, Some(&new_token)).await?;
                if retry.status() == StatusCode::UNAUTHORIZED {
                    warn!(
                        "{} {} still unauthorized after token refresh",
                        options.method,
                        url.path()
                    );
                }
                Ok(retry)
            }
            Err(e) => {
                warn!("Token refresh failed, ending session: {}", e);
                self.end_session(SessionEvent::Expired);
                Err(GatewayError::SessionExpired)
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The new token is persisted before it is returned. Failure leaves the stored
    /// session as it was; clearing it is up to the caller.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .inner
            .store
            .get()
            .refresh_token
            .ok_or(RefreshError::MissingRefreshToken)?;

        let url = self.inner.config.resolve(&self.inner.config.refresh_path)?;

        let response = self
            .inner
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: &refresh_token,
            })
            .send()
            .await
            .map_err(RefreshError::Transport)?;

        if !response.status().is_success() {
            return Err(RefreshError::Rejected(response.status()));
        }

        let body: RefreshResponse = response.json().await.map_err(RefreshError::Decode)?;

        match body.refresh {
            Some(rotated) => {
                let mut session = self.inner.store.get();
                session.access_token = Some(body.access.clone());
                session.refresh_token = Some(rotated);
                self.inner.store.set(session)?;
            }
            None => self.inner.store.set_access_token(&body.access)?,
        }

        debug!("Access token refreshed");
        self.publish(SessionEvent::Refreshed);
        Ok(body.access)
    }

    /// Wipe stored tokens and cached user data, then announce `event`.
    pub(crate) fn end_session(&self, event: SessionEvent) {
        if let Err(e) = self.inner.store.clear() {
            warn!("Failed to clear stored session: {}", e);
        }
        self.clear_profile();
        self.publish(event);
    }

    async fn dispatch(
        &self,
        url: &Url,
        options: &RequestOptions,
        access_token: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let headers = build_headers(&options.headers, access_token)?;

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        debug!("{} {} -> {}", options.method, url.path(), response.status());
        Ok(response)
    }
}

/// JSON content type, then caller headers, then the bearer token when one exists.
fn build_headers(extra: &HeaderMap, access_token: Option<&str>) -> Result<HeaderMap, GatewayError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }

    if let Some(token) = access_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
