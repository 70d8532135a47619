//! Persistent storage for the session's bearer token.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::claims::{Claims, decode_claims};
use crate::error::{SessionError, SessionResult};

/// On-disk document holding the token under its fixed key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Shared handle over the single stored token value.
///
/// Cloning is cheap; all clones observe the same token. The value is
/// mutated only by login, logout, and the auth-failure handler, and read
/// by every outbound request.
#[derive(Clone)]
pub struct SessionStore {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// A store with no persistence; the token lives for the process only.
    pub fn in_memory() -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// Open a store persisted at `path`, loading any token a previous
    /// process left behind. A missing file means unauthenticated; a file
    /// that exists but cannot be read is an error, not an empty session.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        let token = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let stored: StoredToken = serde_json::from_str(&contents)
                    .map_err(SessionError::CorruptTokenFile)?;
                debug!("loaded persisted session token");
                Some(stored.access_token)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(SessionError::Storage(err)),
        };

        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(path),
        })
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// Whether a token is present. Presence says nothing about validity.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// Store a new token, replacing any previous one.
    pub fn set(&self, token: impl Into<String>) -> SessionResult<()> {
        let token = token.into();
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let document = StoredToken {
                access_token: token.clone(),
            };
            let contents = serde_json::to_string_pretty(&document)
                .map_err(SessionError::CorruptTokenFile)?;
            std::fs::write(path, contents)?;
        }
        *self.token.write().expect("token lock poisoned") = Some(token);
        Ok(())
    }

    /// Drop the stored token and delete the token file.
    pub fn clear(&self) -> SessionResult<()> {
        *self.token.write().expect("token lock poisoned") = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("removed persisted session token"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(SessionError::Storage(err)),
            }
        }
        Ok(())
    }

    /// Decode the current user's identity from the stored token without a
    /// network round trip.
    ///
    /// Fails with [`SessionError::NoToken`] when unauthenticated and with
    /// a decode error for a malformed token. A corrupt token is NOT
    /// cleared here; whether to discard it is the caller's decision.
    pub fn current_user(&self) -> SessionResult<Claims> {
        let token = self.token().ok_or(SessionError::NoToken)?;
        let claims = decode_claims(&token)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    #[test]
    fn in_memory_store_starts_unauthenticated() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(matches!(
            store.current_user(),
            Err(SessionError::NoToken)
        ));
    }

    #[test]
    fn set_and_clear_round_trip() {
        let store = SessionStore::in_memory();
        store.set("tok").unwrap();
        assert_eq!(store.token().as_deref(), Some("tok"));
        store.clear().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn clones_share_the_same_token() {
        let store = SessionStore::in_memory();
        let clone = store.clone();
        store.set("tok").unwrap();
        assert_eq!(clone.token().as_deref(), Some("tok"));
    }

    #[test]
    fn persisted_token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let store = SessionStore::open(&path).unwrap();
        assert!(!store.is_authenticated());
        store.set("persisted").unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("persisted"));

        reopened.clear().unwrap();
        let after_clear = SessionStore::open(&path).unwrap();
        assert!(!after_clear.is_authenticated());
    }

    #[test]
    fn corrupt_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SessionStore::open(&path),
            Err(SessionError::CorruptTokenFile(_))
        ));
    }

    #[test]
    fn current_user_decodes_stored_claims() {
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&serde_json::json!({"sub": "ada@example.com"})).unwrap());
        let store = SessionStore::in_memory();
        store.set(format!("h.{payload}.s")).unwrap();
        assert_eq!(store.current_user().unwrap().sub, "ada@example.com");
    }

    #[test]
    fn current_user_leaves_corrupt_token_in_place() {
        let store = SessionStore::in_memory();
        store.set("garbage").unwrap();
        assert!(matches!(
            store.current_user(),
            Err(SessionError::Decode(_))
        ));
        // The malformed token is still there for the caller to inspect.
        assert_eq!(store.token().as_deref(), Some("garbage"));
    }
}
