//! The selection cursor: which document, which open artifact viewer.

use std::sync::{Arc, Mutex};

use crate::api::{ArtifactDetail, ArtifactKind, Document};

/// The currently open artifact viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenArtifact {
    pub kind: ArtifactKind,
    pub id: i64,
    pub detail: ArtifactDetail,
}

/// Observable state of the cursor, for consumers and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionState {
    NoSelection,
    DocumentSelected,
    ArtifactOpen,
}

#[derive(Default)]
struct SelectionCursor {
    selected: Option<Document>,
    open: Option<OpenArtifact>,
    /// Bumped on every selection change; in-flight fetches compare against it
    /// on resolution and discard themselves when it moved.
    epoch: u64,
}

/// Sole writer of the selection cursor.
///
/// Invariants: an artifact is open only while a document is selected, at most
/// one viewer is open at a time, and changing the selected document always
/// clears the open artifact first.
#[derive(Clone)]
pub struct SelectionController {
    cursor: Arc<Mutex<SelectionCursor>>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            cursor: Arc::new(Mutex::new(SelectionCursor::default())),
        }
    }

    /// Select a document, force-closing any open viewer. Returns the new
    /// epoch, to be handed to [`SelectionController::is_current`] when the
    /// fetch it triggered resolves.
    pub fn select(&self, document: Document) -> u64 {
        let mut cursor = self.cursor.lock().expect("selection lock poisoned");
        cursor.open = None;
        cursor.selected = Some(document);
        cursor.epoch += 1;
        cursor.epoch
    }

    /// Drop the selection entirely (explicit deselect or document removal).
    pub fn clear(&self) -> u64 {
        let mut cursor = self.cursor.lock().expect("selection lock poisoned");
        cursor.open = None;
        cursor.selected = None;
        cursor.epoch += 1;
        cursor.epoch
    }

    /// Whether a fetch issued at `epoch` still targets the current cursor.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.cursor.lock().expect("selection lock poisoned").epoch == epoch
    }

    /// The epoch of the cursor as it stands, for fetches that do not move it.
    pub fn current_epoch(&self) -> u64 {
        self.cursor.lock().expect("selection lock poisoned").epoch
    }

    pub fn selected_document(&self) -> Option<Document> {
        self.cursor.lock().expect("selection lock poisoned").selected.clone()
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.cursor
            .lock()
            .expect("selection lock poisoned")
            .selected
            .as_ref()
            .map(|d| d.id)
    }

    /// Record a successfully opened viewer. Refused while no document is
    /// selected; the open that raced a clear loses.
    pub fn open(&self, artifact: OpenArtifact) -> bool {
        let mut cursor = self.cursor.lock().expect("selection lock poisoned");
        if cursor.selected.is_none() {
            return false;
        }
        cursor.open = Some(artifact);
        true
    }

    /// Close the viewer, returning to plain document selection.
    pub fn close(&self) {
        self.cursor.lock().expect("selection lock poisoned").open = None;
    }

    pub fn open_artifact(&self) -> Option<OpenArtifact> {
        self.cursor.lock().expect("selection lock poisoned").open.clone()
    }

    /// Just the `(kind, id)` of the open viewer, for identity checks.
    pub fn open_ref(&self) -> Option<(ArtifactKind, i64)> {
        self.cursor
            .lock()
            .expect("selection lock poisoned")
            .open
            .as_ref()
            .map(|a| (a.kind, a.id))
    }

    pub fn state(&self) -> SelectionState {
        let cursor = self.cursor.lock().expect("selection lock poisoned");
        match (&cursor.selected, &cursor.open) {
            (None, _) => SelectionState::NoSelection,
            (Some(_), None) => SelectionState::DocumentSelected,
            (Some(_), Some(_)) => SelectionState::ArtifactOpen,
        }
    }
}
