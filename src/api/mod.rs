//! REST API boundary for the study assistant backend.
//!
//! This module defines the typed wire contract, the error taxonomy, and the
//! [`StudyApi`] trait that the rest of the crate is written against. The
//! concrete HTTP transport lives in [`http`]; tests substitute an in-memory
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod http;

pub use http::HttpApi;

/// Common error types for API operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Authenticated user identity, as returned by `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: i64,
    pub username: String,
}

/// An uploaded source document owned by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response body of `POST /upload/pdf`.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadReceipt {
    pub document_id: i64,
    pub filename: String,
}

/// The two kinds of generated study artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    FlashcardSet,
    Quiz,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::FlashcardSet => write!(f, "flashcard set"),
            ArtifactKind::Quiz => write!(f, "quiz"),
        }
    }
}

/// Lightweight listing record for one artifact, without full content.
///
/// Both `/flashcard/list` and `/quiz/list` return this object shape; list
/// order is the backend's (most recent first) and is preserved as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One question/answer pair in a flashcard set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub question: String,
    pub answer: String,
}

/// Full content of one flashcard set, from `GET /flashcard/{set_id}`.
///
/// The backend omits `title` in the detail response; callers fall back to the
/// summary title when it is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSetDetail {
    #[serde(default)]
    pub title: Option<String>,
    pub cards: Vec<Card>,
}

/// One multiple-choice question in a quiz, from `GET /quiz/{quiz_id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
}

/// Full content of one opened artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactDetail {
    FlashcardSet(FlashcardSetDetail),
    Quiz(Vec<QuizQuestion>),
}

impl ArtifactDetail {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactDetail::FlashcardSet(_) => ArtifactKind::FlashcardSet,
            ArtifactDetail::Quiz(_) => ArtifactKind::Quiz,
        }
    }
}

/// API trait the state machinery is written against.
///
/// Implemented by [`HttpApi`] for the real backend and by in-memory fakes in
/// tests. Every method is a single attempt; retry policy belongs to callers
/// (and the callers in this crate never retry).
#[async_trait]
pub trait StudyApi: Send + Sync {
    // Auth
    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError>;
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError>;

    // Documents
    async fn documents(&self, user_id: i64) -> Result<Vec<Document>, ApiError>;
    async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>, user_id: i64) -> Result<UploadReceipt, ApiError>;
    async fn delete_document(&self, document_id: i64, user_id: i64) -> Result<(), ApiError>;

    // Flashcard sets
    async fn create_flashcards(&self, user_id: i64, document_id: i64, num_cards: u32) -> Result<(), ApiError>;
    async fn flashcard_sets(&self, user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError>;
    async fn flashcard_set(&self, set_id: i64, user_id: i64) -> Result<FlashcardSetDetail, ApiError>;
    async fn delete_flashcard_set(&self, set_id: i64, user_id: i64) -> Result<(), ApiError>;

    // Quizzes
    async fn create_quiz(&self, user_id: i64, document_id: i64, num_questions: u32) -> Result<(), ApiError>;
    async fn quizzes(&self, user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError>;
    async fn quiz(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizQuestion>, ApiError>;
    async fn delete_quiz(&self, quiz_id: i64, user_id: i64) -> Result<(), ApiError>;
}
