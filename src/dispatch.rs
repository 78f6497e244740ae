//! Background generation requests and their progress reporting.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::api::{ArtifactKind, StudyApi};
use crate::artifacts::ArtifactCache;
use crate::constants::{DEFAULT_CARD_COUNT, DEFAULT_QUESTION_COUNT, MAX_CARD_COUNT};

/// Options for a generation request. Each kind reads its own count; both
/// default to 10.
#[derive(Clone, Copy, Debug)]
pub struct GenerationParams {
    pub card_count: u32,
    pub question_count: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            card_count: DEFAULT_CARD_COUNT,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }
}

/// Lifecycle of one in-flight generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Done,
    Failed(String),
}

/// Handle to one generation request, returned immediately in `Running` state.
#[derive(Clone, Debug)]
pub struct PendingAction {
    pub kind: ArtifactKind,
    pub document_id: i64,
    status: Arc<Mutex<ActionStatus>>,
}

impl PendingAction {
    fn new(kind: ArtifactKind, document_id: i64) -> Self {
        Self {
            kind,
            document_id,
            status: Arc::new(Mutex::new(ActionStatus::Running)),
        }
    }

    pub fn status(&self) -> ActionStatus {
        self.status.lock().expect("action lock poisoned").clone()
    }

    fn set_status(&self, status: ActionStatus) {
        *self.status.lock().expect("action lock poisoned") = status;
    }
}

/// Rejections raised before a request is ever sent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("A {kind} generation is already running for document {document_id}")]
    Busy { kind: ArtifactKind, document_id: i64 },

    #[error("Invalid generation parameters: {0}")]
    InvalidParams(String),

    #[error("No active session")]
    NotSignedIn,

    #[error("No document selected")]
    NoDocumentSelected,
}

/// Completion notifications for the embedding UI to drain.
#[derive(Clone, Debug)]
pub enum Event {
    GenerationStarted { kind: ArtifactKind, document_id: i64 },
    /// The document's artifact lists have already been invalidated when this
    /// arrives; read the fresh snapshot from the cache.
    GenerationCompleted { kind: ArtifactKind, document_id: i64 },
    GenerationFailed { kind: ArtifactKind, document_id: i64, message: String },
}

/// Drives asynchronous generation without blocking callers.
///
/// At most one request per `(kind, document)` runs at a time; a duplicate is
/// rejected with [`DispatchError::Busy`] rather than queued. Each request is a
/// single attempt with no automatic retry.
#[derive(Clone)]
pub struct ActionDispatcher {
    api: Arc<dyn StudyApi>,
    cache: ArtifactCache,
    running: Arc<Mutex<HashSet<(ArtifactKind, i64)>>>,
    events: mpsc::UnboundedSender<Event>,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn StudyApi>, cache: ArtifactCache) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                cache,
                running: Arc::new(Mutex::new(HashSet::new())),
                events: tx,
            },
            rx,
        )
    }

    fn requested_count(kind: ArtifactKind, params: &GenerationParams) -> Result<u32, DispatchError> {
        match kind {
            ArtifactKind::FlashcardSet => {
                if params.card_count == 0 || params.card_count > MAX_CARD_COUNT {
                    return Err(DispatchError::InvalidParams(format!(
                        "card_count must be between 1 and {MAX_CARD_COUNT}, got {}",
                        params.card_count
                    )));
                }
                Ok(params.card_count)
            }
            ArtifactKind::Quiz => {
                if params.question_count == 0 {
                    return Err(DispatchError::InvalidParams(format!(
                        "question_count must be positive, got {}",
                        params.question_count
                    )));
                }
                Ok(params.question_count)
            }
        }
    }

    /// Whether a request for this `(kind, document)` pair is running.
    pub fn is_running(&self, kind: ArtifactKind, document_id: i64) -> bool {
        self.running
            .lock()
            .expect("dispatch lock poisoned")
            .contains(&(kind, document_id))
    }

    /// Start a generation request, returning its handle immediately.
    pub fn generate(
        &self,
        kind: ArtifactKind,
        document_id: i64,
        user_id: i64,
        params: &GenerationParams,
    ) -> Result<PendingAction, DispatchError> {
        let count = Self::requested_count(kind, params)?;

        {
            let mut running = self.running.lock().expect("dispatch lock poisoned");
            if !running.insert((kind, document_id)) {
                return Err(DispatchError::Busy { kind, document_id });
            }
        }

        let action = PendingAction::new(kind, document_id);
        let handle = action.clone();
        let api = Arc::clone(&self.api);
        let cache = self.cache.clone();
        let running = Arc::clone(&self.running);
        let events = self.events.clone();

        info!("Starting {kind} generation for document {document_id} ({count} items)");
        let _ = events.send(Event::GenerationStarted { kind, document_id });

        tokio::spawn(async move {
            let result = match kind {
                ArtifactKind::FlashcardSet => api.create_flashcards(user_id, document_id, count).await,
                ArtifactKind::Quiz => api.create_quiz(user_id, document_id, count).await,
            };

            match result {
                Ok(()) => {
                    // The new artifact only becomes visible through a
                    // server-confirmed re-fetch.
                    if let Err(e) = cache.invalidate(document_id, user_id).await {
                        warn!("Generation succeeded but list refresh failed for document {document_id}: {e}");
                    }
                    handle.set_status(ActionStatus::Done);
                    let _ = events.send(Event::GenerationCompleted { kind, document_id });
                }
                Err(e) => {
                    let message = e.to_string();
                    error!("{kind} generation failed for document {document_id}: {message}");
                    handle.set_status(ActionStatus::Failed(message.clone()));
                    let _ = events.send(Event::GenerationFailed {
                        kind,
                        document_id,
                        message,
                    });
                }
            }

            running.lock().expect("dispatch lock poisoned").remove(&(kind, document_id));
        });

        Ok(action)
    }
}
