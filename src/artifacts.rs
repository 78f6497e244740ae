//! Per-document cache of generated artifact summaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::info;

use crate::api::{ApiError, ArtifactDetail, ArtifactKind, ArtifactSummary, StudyApi};

/// The two listing panels for one document, in backend order (most recent
/// first; never re-sorted client-side).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactLists {
    pub flashcard_sets: Vec<ArtifactSummary>,
    pub quizzes: Vec<ArtifactSummary>,
}

impl ArtifactLists {
    pub fn is_empty(&self) -> bool {
        self.flashcard_sets.is_empty() && self.quizzes.is_empty()
    }
}

/// Owns artifact summary collections keyed by document id.
///
/// Collections are only replaced after a successful server fetch; there is no
/// optimistic patching and no time-based expiry. Artifact detail is never
/// cached: every open fetches fresh.
#[derive(Clone)]
pub struct ArtifactCache {
    api: Arc<dyn StudyApi>,
    lists: Arc<Mutex<HashMap<i64, ArtifactLists>>>,
}

impl ArtifactCache {
    pub fn new(api: Arc<dyn StudyApi>) -> Self {
        Self {
            api,
            lists: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Snapshot of the cached lists for a document, if any fetch has landed.
    pub fn lists_for(&self, document_id: i64) -> Option<ArtifactLists> {
        self.lists.lock().expect("artifact lock poisoned").get(&document_id).cloned()
    }

    /// Fetch both listings without touching the cache. The caller decides
    /// whether the result is still wanted (stale-response suppression) and
    /// stores it with [`ArtifactCache::store`].
    pub async fn fetch(&self, document_id: i64, user_id: i64) -> Result<ArtifactLists, ApiError> {
        let flashcard_sets = self.api.flashcard_sets(user_id, document_id).await?;
        let quizzes = self.api.quizzes(user_id, document_id).await?;
        Ok(ArtifactLists { flashcard_sets, quizzes })
    }

    /// Replace the cached lists for a document.
    pub fn store(&self, document_id: i64, lists: ArtifactLists) {
        self.lists.lock().expect("artifact lock poisoned").insert(document_id, lists);
    }

    /// Re-fetch a document's listings and return the fresh snapshot.
    pub async fn invalidate(&self, document_id: i64, user_id: i64) -> Result<ArtifactLists, ApiError> {
        let lists = self.fetch(document_id, user_id).await?;
        self.store(document_id, lists.clone());
        info!(
            "Refreshed artifacts for document {document_id}: {} flashcard sets, {} quizzes",
            lists.flashcard_sets.len(),
            lists.quizzes.len()
        );
        Ok(lists)
    }

    /// Fetch the full content of one artifact. Always fresh, never reused.
    pub async fn open(&self, kind: ArtifactKind, id: i64, user_id: i64) -> Result<ArtifactDetail, ApiError> {
        match kind {
            ArtifactKind::FlashcardSet => {
                let detail = self.api.flashcard_set(id, user_id).await?;
                Ok(ArtifactDetail::FlashcardSet(detail))
            }
            ArtifactKind::Quiz => {
                let questions = self.api.quiz(id, user_id).await?;
                Ok(ArtifactDetail::Quiz(questions))
            }
        }
    }

    /// Delete one artifact server-side. Re-fetching the owning document's
    /// listings and closing the viewer are the coordinator's concern.
    pub async fn remove(&self, kind: ArtifactKind, id: i64, user_id: i64) -> Result<(), ApiError> {
        match kind {
            ArtifactKind::FlashcardSet => self.api.delete_flashcard_set(id, user_id).await?,
            ArtifactKind::Quiz => self.api.delete_quiz(id, user_id).await?,
        }
        info!("Deleted {kind} {id}");
        Ok(())
    }

    /// Drop the cached collections for one removed document.
    pub fn discard(&self, document_id: i64) {
        self.lists.lock().expect("artifact lock poisoned").remove(&document_id);
    }

    /// Drop everything (sign-out).
    pub fn clear(&self) {
        self.lists.lock().expect("artifact lock poisoned").clear();
    }
}
