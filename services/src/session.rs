//! Signed-in identity, persisted across runs as a small JSON file.
//!
//! A missing or unreadable file is never fatal: `load` degrades to "nobody is
//! signed in" and the caller prompts for credentials again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use common::config;
use store::models::Identity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    pub token: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: Identity, token: Option<String>) -> Self {
        if identity.roles.is_empty() {
            warn!(user_id = identity.id, "signed in with no roles; access will be creator-only");
        }
        Self {
            identity,
            token,
            started_at: Utc::now(),
        }
    }
}

/// Where the session JSON lives on disk.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn from_config() -> Self {
        Self::new(config::session_file())
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session. Absence is the normal signed-out state;
    /// anything unreadable or unparsable is logged and treated the same way.
    pub fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read session file");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "session file is corrupt, ignoring it");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        let body = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, body)
    }

    /// Signs out. Clearing an already absent file is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
