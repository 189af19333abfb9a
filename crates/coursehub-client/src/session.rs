//! Explicit session context.
//!
//! The bearer token and user identity live in one place with a single
//! read/write/clear interface, persisted under `~/.coursehub/session.yaml`
//! (keys `token` and `user`). Auth-dependent code subscribes to a watch
//! channel instead of polling ambient storage.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use crate::error::{ClientError, ClientResult};
use crate::models::UserIdentity;

/// The persisted session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: UserIdentity,
}

/// Process-wide session context. Cheap to clone; all clones share state and
/// the auth-change channel.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionData>>>,
    events: Arc<watch::Sender<Option<UserIdentity>>>,
    path: PathBuf,
}

impl Session {
    /// Load the session from its default location, starting logged-out if no
    /// file exists yet.
    pub fn load() -> ClientResult<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load the session from an explicit file path.
    pub fn load_from(path: PathBuf) -> ClientResult<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<SessionData>(&content) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "unreadable session file, starting logged out");
                    None
                }
            }
        } else {
            None
        };

        let (events, _) = watch::channel(data.as_ref().map(|d| d.user.clone()));
        Ok(Self {
            inner: Arc::new(RwLock::new(data)),
            events: Arc::new(events),
            path,
        })
    }

    fn default_path() -> ClientResult<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".coursehub").join("session.yaml"))
    }

    /// Current session payload, if logged in.
    pub async fn current(&self) -> Option<SessionData> {
        self.inner.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|d| d.token.clone())
    }

    pub async fn user(&self) -> Option<UserIdentity> {
        self.inner.read().await.as_ref().map(|d| d.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Store a fresh token/identity pair, persist it, and notify subscribers.
    pub async fn login(&self, token: String, user: UserIdentity) -> ClientResult<()> {
        let data = SessionData {
            token,
            user: user.clone(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(&data)?)?;

        *self.inner.write().await = Some(data);
        self.events.send_replace(Some(user.clone()));

        tracing::debug!(user = %user.username, "session established");
        Ok(())
    }

    /// Drop the session, remove the file, and notify subscribers.
    pub async fn clear(&self) -> ClientResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        *self.inner.write().await = None;
        self.events.send_replace(None);

        tracing::debug!("session cleared");
        Ok(())
    }

    /// Subscribe to auth changes. The receiver yields the current identity
    /// immediately and on every login/logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.events.subscribe()
    }
}
