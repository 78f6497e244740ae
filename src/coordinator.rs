//! The shared store that keeps the three panels consistent.
//!
//! One `StudyCoordinator` is created at startup and handed (by clone, it is
//! cheap) to every view. It owns the session, the document registry, the
//! artifact cache, the selection cursor, and the generation dispatcher, and
//! wires the cross-component signals between them: removing the selected
//! document clears the cursor and its cached lists, removing the open
//! artifact closes the viewer, a finished generation invalidates the owning
//! document's lists.

use std::sync::Arc;

use log::warn;
use tokio::sync::mpsc;

use crate::api::{ApiError, ArtifactDetail, ArtifactKind, Document, Session, StudyApi};
use crate::artifacts::{ArtifactCache, ArtifactLists};
use crate::config::Config;
use crate::dispatch::{ActionDispatcher, DispatchError, Event, GenerationParams, PendingAction};
use crate::documents::DocumentRegistry;
use crate::logger::Logger;
use crate::selection::{OpenArtifact, SelectionController};
use crate::session::{SessionSlot, SessionStore};

#[derive(Clone)]
pub struct StudyCoordinator {
    session: SessionStore,
    documents: DocumentRegistry,
    artifacts: ArtifactCache,
    selection: SelectionController,
    dispatcher: ActionDispatcher,
    defaults: GenerationParams,
    logger: Logger,
}

impl StudyCoordinator {
    /// Build the coordinator and return the event receiver the embedding UI
    /// drains for generation progress.
    pub fn new(
        api: Arc<dyn StudyApi>,
        slot: Arc<dyn SessionSlot>,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let session = SessionStore::new(Arc::clone(&api), slot);
        let documents = DocumentRegistry::new(Arc::clone(&api));
        let artifacts = ArtifactCache::new(Arc::clone(&api));
        let selection = SelectionController::new();
        let (dispatcher, events) = ActionDispatcher::new(api, artifacts.clone());

        let coordinator = Self {
            session,
            documents,
            artifacts,
            selection,
            dispatcher,
            defaults: GenerationParams {
                card_count: config.generation.card_count,
                question_count: config.generation.question_count,
            },
            logger: Logger::new(),
        };
        (coordinator, events)
    }

    // Read accessors for the consuming views.

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    pub fn artifacts(&self) -> &ArtifactCache {
        &self.artifacts
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn require_user(&self) -> Result<i64, ApiError> {
        self.session
            .current()
            .map(|s| s.user_id)
            .ok_or_else(|| ApiError::Auth("No active session".to_string()))
    }

    // Session lifecycle.

    /// Sign in and load the document list. A document-list failure does not
    /// undo the sign-in; the registry just stays empty until the next refresh.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let session = self.session.sign_in(username, password).await?;
        self.logger.log(format!("Signed in as {}", session.username));

        if let Err(e) = self.documents.refresh(session.user_id).await {
            warn!("Signed in but document list failed to load: {e}");
        }
        Ok(session)
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.session.sign_up(username, password).await
    }

    /// Restore a persisted session at startup, loading documents when one
    /// exists.
    pub async fn restore(&self) -> Option<Session> {
        let session = self.session.restore()?;
        self.logger.log(format!("Restored session for {}", session.username));

        if let Err(e) = self.documents.refresh(session.user_id).await {
            warn!("Restored session but document list failed to load: {e}");
        }
        Some(session)
    }

    /// Sign out and drop all session-scoped state.
    pub fn sign_out(&self) {
        self.session.sign_out();
        self.selection.clear();
        self.artifacts.clear();
        self.documents.clear();
        self.logger.log("Signed out".to_string());
    }

    // Selection and artifact browsing.

    /// Select a document and fetch its artifact lists. Returns `Ok(None)`
    /// when the selection moved again before the fetch resolved; the stale
    /// result is discarded without touching the cache.
    pub async fn select_document(&self, document: Document) -> Result<Option<ArtifactLists>, ApiError> {
        let user_id = self.require_user()?;
        let document_id = document.id;
        let epoch = self.selection.select(document);

        match self.artifacts.fetch(document_id, user_id).await {
            Ok(lists) => {
                if self.selection.is_current(epoch) {
                    self.artifacts.store(document_id, lists.clone());
                    Ok(Some(lists))
                } else {
                    Ok(None)
                }
            }
            Err(e) => {
                // A stale failure is as irrelevant as a stale success.
                if self.selection.is_current(epoch) {
                    Err(e)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Explicit deselect.
    pub fn clear_selection(&self) {
        self.selection.clear();
    }

    /// Open an artifact viewer, fetching its content fresh. A failed fetch
    /// leaves the cursor in plain document selection; a fetch that resolves
    /// after the selection moved is discarded and reported as `Ok(None)`.
    pub async fn open_artifact(&self, kind: ArtifactKind, id: i64) -> Result<Option<ArtifactDetail>, ApiError> {
        let user_id = self.require_user()?;
        if self.selection.selected_id().is_none() {
            return Err(ApiError::InvalidData("No document selected".to_string()));
        }

        let epoch = self.selection.current_epoch();
        let detail = self.artifacts.open(kind, id, user_id).await?;

        if !self.selection.is_current(epoch) {
            return Ok(None);
        }
        self.selection.open(OpenArtifact {
            kind,
            id,
            detail: detail.clone(),
        });
        Ok(Some(detail))
    }

    /// Close the viewer, returning to the document's listing panel.
    pub fn close_artifact(&self) {
        self.selection.close();
    }

    // Document mutations.

    /// Upload a PDF; on success the registry is re-fetched and the new
    /// document becomes the selection. The artifact panel load is best-effort
    /// (the selection is already consistent either way).
    pub async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> Result<Document, ApiError> {
        let user_id = self.require_user()?;
        let document = self.documents.upload(filename, bytes, user_id).await?;
        self.logger.log(format!("Uploaded {}", document.filename));

        if let Err(e) = self.select_document(document.clone()).await {
            warn!("Uploaded document {} but artifact load failed: {e}", document.id);
        }
        Ok(document)
    }

    /// Delete a document. If it was selected, the cursor drops to no
    /// selection and its cached artifact lists are discarded.
    pub async fn remove_document(&self, document_id: i64) -> Result<(), ApiError> {
        let user_id = self.require_user()?;
        self.documents.remove(document_id, user_id).await?;
        self.logger.log(format!("Removed document {document_id}"));

        if self.selection.selected_id() == Some(document_id) {
            self.selection.clear();
        }
        self.artifacts.discard(document_id);
        Ok(())
    }

    // Artifact mutations.

    /// Delete an artifact of the selected document. On success the owning
    /// document's lists are re-fetched, and if the removed artifact was open
    /// its viewer is closed first.
    pub async fn remove_artifact(&self, kind: ArtifactKind, id: i64) -> Result<ArtifactLists, ApiError> {
        let user_id = self.require_user()?;
        let document_id = self
            .selection
            .selected_id()
            .ok_or_else(|| ApiError::InvalidData("No document selected".to_string()))?;

        self.artifacts.remove(kind, id, user_id).await?;
        self.logger.log(format!("Removed {kind} {id}"));

        if self.selection.open_ref() == Some((kind, id)) {
            self.selection.close();
        }
        self.artifacts.invalidate(document_id, user_id).await
    }

    // Generation.

    /// Start a generation request for the selected document with the
    /// configured default counts.
    pub fn generate(&self, kind: ArtifactKind) -> Result<PendingAction, DispatchError> {
        self.generate_with(kind, &self.defaults)
    }

    /// Start a generation request with explicit parameters.
    pub fn generate_with(&self, kind: ArtifactKind, params: &GenerationParams) -> Result<PendingAction, DispatchError> {
        let user_id = match self.session.current() {
            Some(session) => session.user_id,
            None => return Err(DispatchError::NotSignedIn),
        };
        let document_id = match self.selection.selected_id() {
            Some(id) => id,
            None => return Err(DispatchError::NoDocumentSelected),
        };

        self.dispatcher.generate(kind, document_id, user_id, params)
    }
}
