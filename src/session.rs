//! Session lifecycle: who is signed in, and the external persistence slot.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::warn;

use crate::api::{ApiError, Session, StudyApi};

/// External persistence slot for the session record.
///
/// The store itself does not own persistence policy; it just writes the slot
/// on sign-in, reads it on restore, and clears it on sign-out.
pub trait SessionSlot: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn store(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed slot under the platform data directory.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default slot location: `<data_dir>/studydeck/session.json`.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .join("studydeck");
        Ok(Self::new(dir.join("session.json")))
    }
}

impl SessionSlot for FileSlot {
    fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding unreadable session slot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn store(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session slot: {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to clear session slot: {}", self.path.display())),
        }
    }
}

/// Holds the authenticated identity; everything else in the crate is scoped
/// to the session it exposes.
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn StudyApi>,
    slot: Arc<dyn SessionSlot>,
    current: Arc<Mutex<Option<Session>>>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn StudyApi>, slot: Arc<dyn SessionSlot>) -> Self {
        Self {
            api,
            slot,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Session> {
        self.current.lock().expect("session lock poisoned").clone()
    }

    /// Sign in against the backend. A failure leaves both the in-memory
    /// session and the persisted slot untouched.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let session = self.api.login(username, password).await?;

        if let Err(e) = self.slot.store(&session) {
            // The session is still valid for this run; only restore is affected.
            warn!("Failed to persist session: {e}");
        }
        *self.current.lock().expect("session lock poisoned") = Some(session.clone());
        Ok(session)
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.api.register(username, password).await
    }

    /// Read any externally persisted session at startup.
    pub fn restore(&self) -> Option<Session> {
        let session = self.slot.load()?;
        *self.current.lock().expect("session lock poisoned") = Some(session.clone());
        Some(session)
    }

    /// Clear the in-memory session and the persisted slot.
    pub fn sign_out(&self) {
        *self.current.lock().expect("session lock poisoned") = None;
        if let Err(e) = self.slot.clear() {
            warn!("Failed to clear session slot: {e}");
        }
    }
}
