use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// The client's single token pair.
///
/// Serialized under the fixed key names `accessToken` and `refreshToken`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Durable holder of the [`Session`].
///
/// Injected into the gateway so that nothing reads tokens from ambient state.
/// Every operation is atomic on its own; there is no locking across operations,
/// so concurrent writers are last-write-wins.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Session;

    fn set(&self, session: Session) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    /// Replace only the access token, keeping the stored refresh token.
    fn set_access_token(&self, access_token: &str) -> Result<(), StoreError> {
        let mut session = self.get();
        session.access_token = Some(access_token.to_string());
        self.set(session)
    }
}

/// In-process session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<RwLock<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Session {
        self.session.read().clone()
    }

    fn set(&self, session: Session) -> Result<(), StoreError> {
        *self.session.write() = session;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.write() = Session::default();
        Ok(())
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), StoreError> {
        self.session.write().access_token = Some(access_token.to_string());
        Ok(())
    }
}

/// Session store backed by a JSON file, surviving restarts.
///
/// The file is read once on open and rewritten on every change. A missing file
/// is an empty session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    session: Arc<RwLock<Session>>,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let session = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                Session::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            Session::default()
        };

        tracing::debug!("Session store opened at {}", path.display());

        Ok(Self {
            path,
            session: Arc::new(RwLock::new(session)),
        })
    }

    /// Open the store at the configured default location.
    pub fn default_location() -> Result<Self, StoreError> {
        Self::open(crate::config::session_file_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &Session) -> Result<(), StoreError> {
        if session.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Session {
        self.session.read().clone()
    }

    fn set(&self, session: Session) -> Result<(), StoreError> {
        let mut current = self.session.write();
        self.persist(&session)?;
        *current = session;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut current = self.session.write();
        self.persist(&Session::default())?;
        *current = Session::default();
        Ok(())
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), StoreError> {
        let mut current = self.session.write();
        let mut updated = current.clone();
        updated.access_token = Some(access_token.to_string());
        self.persist(&updated)?;
        *current = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_and_clear() {
        let store = MemorySessionStore::new();
        assert!(store.get().is_empty());

        store.set(Session::new("A1", "R1")).unwrap();
        assert_eq!(store.get().access_token.as_deref(), Some("A1"));
        assert_eq!(store.get().refresh_token.as_deref(), Some("R1"));

        store.clear().unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_set_access_token_keeps_refresh_token() {
        let store = MemorySessionStore::with_session(Session::new("A1", "R1"));
        store.set_access_token("A2").unwrap();

        let session = store.get();
        assert_eq!(session.access_token.as_deref(), Some("A2"));
        assert_eq!(session.refresh_token.as_deref(), Some("R1"));
    }

    #[test]
    fn test_session_uses_fixed_key_names() {
        let json = serde_json::to_value(Session::new("A1", "R1")).unwrap();
        assert_eq!(json["accessToken"], "A1");
        assert_eq!(json["refreshToken"], "R1");
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path().join("session.json")).unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set(Session::new("A1", "R1")).unwrap();
        store.set_access_token("A2").unwrap();

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get(), Session::new("A2", "R1"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "A2");
        assert_eq!(raw["refreshToken"], "R1");
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::open(&path).unwrap();
        store.set(Session::new("A1", "R1")).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(FileSessionStore::open(&path).unwrap().get().is_empty());
    }
}
