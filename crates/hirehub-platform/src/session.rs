//! File-backed client session storage.
//!
//! Holds the bearer token, user id and role issued at login. Every read goes
//! back to disk so a logout from another process is observed immediately.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use hirehub_common::credentials::{ROLE_KEY, TOKEN_KEY, USER_ID_KEY};
use hirehub_common::{ClientStorage, CredentialProvider, PlatformError, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A logged-in session as persisted on disk.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .finish()
    }
}

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location.
    pub fn open_default() -> Result<Self, PlatformError> {
        Ok(Self::new(crate::paths::session_file()?))
    }

    /// Read the current session, if any.
    ///
    /// A missing file is `Ok(None)`; an unreadable or corrupt file is an error.
    pub fn load(&self) -> Result<Option<Session>, PlatformError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PlatformError::StorageError(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PlatformError::StorageError(format!("corrupt session file: {e}")))
    }

    pub fn save(&self, session: &Session) -> Result<(), PlatformError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PlatformError::StorageError(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| PlatformError::StorageError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            PlatformError::StorageError(format!("failed to write {}: {e}", self.path.display()))
        })?;
        restrict_permissions(&self.path);
        debug!(path = %self.path.display(), role = %session.role, "session saved");
        Ok(())
    }

    /// Remove the stored session. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), PlatformError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlatformError::StorageError(e.to_string())),
        }
    }
}

impl ClientStorage for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let session = match self.load() {
            Ok(session) => session?,
            Err(e) => {
                warn!(error = %e, "session store unreadable");
                return None;
            }
        };
        match key {
            TOKEN_KEY => Some(session.token),
            USER_ID_KEY => Some(session.user_id),
            ROLE_KEY => Some(session.role.as_str().to_string()),
            _ => None,
        }
    }
}

impl CredentialProvider for FileSessionStore {
    fn current_token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        warn!(error = %e, "failed to restrict session file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
