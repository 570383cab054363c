//! Persistent bearer-token storage.
//!
//! The token lives under the fixed key `"token"` in a small JSON file
//! (`~/.inkpost/session.json` by default) and is mirrored in memory so every
//! request can read it without touching disk.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InkpostError, Result};

// ============================================================================
// Session Store
// ============================================================================

/// Bearer-token store shared by the API client and the CLI.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    token: RwLock<Option<String>>,
}

/// On-disk layout of the session file.
#[derive(Debug, Serialize, Deserialize, Default)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl SessionStore {
    /// Open the session file at `~/.inkpost/session.json`.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path())
    }

    /// Open (or lazily create) a session file at a custom path.
    ///
    /// A missing or empty file means "no session". A file that does not parse
    /// is logged and treated the same way; it is overwritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let token = Self::load_file(&path)?.token;
        Ok(Self {
            path: Some(path),
            token: RwLock::new(token),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            token: RwLock::new(None),
        }
    }

    pub fn default_path() -> PathBuf {
        crate::config::Config::dir().join("session.json")
    }

    /// Current bearer token, if a session exists.
    pub fn token(&self) -> Option<String> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Persist a new bearer token, replacing any existing one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InkpostError::InvalidRequest(
                "session token must not be empty".to_string(),
            ));
        }
        let mut guard = self.write();
        self.save_file(&SessionFile {
            token: Some(token.to_string()),
        })?;
        *guard = Some(token.to_string());
        debug!("Session token stored");
        Ok(())
    }

    /// Forget the token. Returns `true` if one was present.
    pub fn clear(&self) -> Result<bool> {
        let mut guard = self.write();
        let had_token = guard.take().is_some();
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(InkpostError::Config(format!(
                        "Failed to remove session file at {:?}: {}",
                        path, e
                    )))
                }
            }
        }
        Ok(had_token)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn load_file(path: &Path) -> Result<SessionFile> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionFile::default())
            }
            Err(e) => {
                return Err(InkpostError::Config(format!(
                    "Failed to read session file at {:?}: {}",
                    path, e
                )))
            }
        };

        if data.trim().is_empty() {
            return Ok(SessionFile::default());
        }

        match serde_json::from_str(&data) {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Session file is corrupt, ignoring it");
                Ok(SessionFile::default())
            }
        }
    }

    fn save_file(&self, file: &SessionFile) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                InkpostError::Config(format!(
                    "Failed to create session directory {:?}: {}",
                    parent, e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(file)?;
        std::fs::write(path, json).map_err(|e| {
            InkpostError::Config(format!(
                "Failed to write session file at {:?}: {}",
                path, e
            ))
        })?;

        // Restrict permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.token.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(|p| p.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================
