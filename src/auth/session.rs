use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::Identity;

/// Session file name in the storage directory
const SESSION_FILE: &str = "session.json";

/// Persisted-session schema version. Entries with any other version are
/// treated as absent so legacy or corrupt blobs fail closed to Anonymous.
const SESSION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    token: String,
    identity: Identity,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    identity: Identity,
}

/// Two-state session store: Anonymous or Authenticated.
///
/// The only transition into Authenticated is `login`; the transitions out
/// are an explicit `logout` or the 401-triggered logout performed by the
/// fetcher/executor. Both clear durable storage and memory together.
pub struct SessionStore {
    storage_dir: PathBuf,
    state: Option<ActiveSession>,
}

impl SessionStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            storage_dir,
            state: None,
        }
    }

    /// Load a persisted session from disk. Returns true when a session was
    /// restored. Missing files, unreadable JSON, and schema mismatches all
    /// leave the store Anonymous.
    pub fn load(&mut self) -> bool {
        let path = self.session_path();
        if !path.exists() {
            return false;
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to read session file");
                return false;
            }
        };
        let persisted: PersistedSession = match serde_json::from_str(&contents) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable session file");
                return false;
            }
        };
        if persisted.version != SESSION_SCHEMA_VERSION {
            warn!(
                version = persisted.version,
                "Ignoring session file with unknown schema version"
            );
            return false;
        }
        debug!(username = %persisted.identity.username, "Session restored from disk");
        self.state = Some(ActiveSession {
            token: persisted.token,
            identity: persisted.identity,
        });
        true
    }

    /// Persist the credential and identity and hold them in memory.
    /// Idempotent: a repeated login simply overwrites. A failed disk write
    /// is logged but does not undo the in-memory login.
    pub fn login(&mut self, token: String, identity: Identity) {
        info!(username = %identity.username, "Session opened");
        self.state = Some(ActiveSession { token, identity });
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// Clear durable storage and in-memory state unconditionally.
    /// Safe to call when already Anonymous.
    pub fn logout(&mut self) {
        if self.state.take().is_some() {
            info!("Session closed");
        }
        let path = self.session_path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove session file");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_some()
    }

    /// False, not an error, when Anonymous or the role set lacks the
    /// administrator role.
    pub fn is_admin(&self) -> bool {
        self.state
            .as_ref()
            .map(|s| s.identity.is_admin())
            .unwrap_or(false)
    }

    /// The bearer token, when Authenticated.
    pub fn token(&self) -> Option<String> {
        self.state.as_ref().map(|s| s.token.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.as_ref().map(|s| s.identity.clone())
    }

    fn persist(&self) -> anyhow::Result<()> {
        let Some(ref active) = self.state else {
            return Ok(());
        };
        let persisted = PersistedSession {
            version: SESSION_SCHEMA_VERSION,
            token: active.token.clone(),
            identity: active.identity.clone(),
            saved_at: Utc::now(),
        };
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&persisted)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.storage_dir.join(SESSION_FILE)
    }
}

/// Shared handle to the session store, injected into the fetcher and the
/// executor. Guards are taken per call and never held across await points.
#[derive(Clone)]
pub struct SessionHandle(Arc<Mutex<SessionStore>>);

impl SessionHandle {
    pub fn new(store: SessionStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.lock().is_admin()
    }

    pub fn login(&self, token: String, identity: Identity) {
        self.lock().login(token, identity);
    }

    pub fn logout(&self) {
        self.lock().logout();
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
