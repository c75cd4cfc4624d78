//! Persisted client state: the signed-in session and the theme flag.
//!
//! Everything lives in one small JSON file. A stored token is trusted as-is
//! at startup; the first 401 from the server clears it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hackhub_types::models::User;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    theme: Theme,
}

pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<Persisted>,
}

impl SessionStore {
    /// Load the store from `path`. A missing file is an empty store; an
    /// unreadable one is logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                Persisted::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Persisted::default(),
            Err(e) => {
                return Err(ClientError::Session(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(Persisted::default()),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().session.as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().session.is_some()
    }

    pub fn set_session(&self, session: Session) -> ClientResult<()> {
        let mut state = self.write();
        state.session = Some(session);
        self.persist(&state)
    }

    /// Replace the cached user, keeping the token.
    pub fn update_user(&self, user: User) -> ClientResult<()> {
        let mut state = self.write();
        match state.session.as_mut() {
            Some(session) => session.user = user,
            None => return Ok(()),
        }
        self.persist(&state)
    }

    pub fn clear_session(&self) -> ClientResult<()> {
        let mut state = self.write();
        if state.session.take().is_none() {
            return Ok(());
        }
        debug!("Session cleared");
        self.persist(&state)
    }

    pub fn theme(&self) -> Theme {
        self.read().theme
    }

    pub fn toggle_theme(&self) -> ClientResult<Theme> {
        let mut state = self.write();
        state.theme = state.theme.toggled();
        self.persist(&state)?;
        Ok(state.theme)
    }

    fn persist(&self, state: &Persisted) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write = || -> std::io::Result<()> {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, serde_json::to_vec_pretty(state)?)
        };
        write().map_err(|e| ClientError::Session(format!("cannot write {}: {}", path.display(), e)))
    }

    fn read(&self) -> RwLockReadGuard<'_, Persisted> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Persisted> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
