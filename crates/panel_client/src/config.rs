use std::path::PathBuf;

use url::Url;

use crate::error::StoreError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

const BASE_URL_ENV: &str = "PANEL_API_URL";
const SESSION_FILE_ENV: &str = "PANEL_SESSION_FILE";

/// Backend location and the fixed endpoint paths the client talks to.
///
/// Endpoint paths are relative to `base_url`, which always ends with `/` so that
/// joining keeps the API mount (`http://host/api/` + `bots/`).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub login_path: String,
    pub refresh_path: String,
    pub dashboard_login_path: String,
    pub dashboard_logout_path: String,
    pub dashboard_config_path: String,
    pub profile_path: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            base_url: Url::parse(&base)?,
            login_path: "token/".to_string(),
            refresh_path: "token/refresh/".to_string(),
            dashboard_login_path: "dashboard/login/".to_string(),
            dashboard_logout_path: "dashboard/logout/".to_string(),
            dashboard_config_path: "dashboard/config/".to_string(),
            profile_path: "me/".to_string(),
        })
    }

    /// Reads `PANEL_API_URL`, falling back to the local development backend.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let base = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base)
    }

    /// Resolve an endpoint against the base URL.
    ///
    /// Absolute `http(s)://` URLs are used as-is. Relative paths may be given
    /// either bare (`bots/`) or already rooted at the API mount (`/api/bots/`).
    pub fn resolve(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Url::parse(endpoint);
        }

        let mount = self.base_url.path();
        let relative = endpoint
            .strip_prefix(mount)
            .unwrap_or(endpoint)
            .trim_start_matches('/');

        self.base_url.join(relative)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base URL is valid")
    }
}

/// Location of the persisted session: `PANEL_SESSION_FILE`, or
/// `~/.panel_admin/session.json`.
pub fn session_file_path() -> Result<PathBuf, StoreError> {
    if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(home.join(".panel_admin").join("session.json"))
}
