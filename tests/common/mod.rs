//! In-memory `StudyApi` implementation shared by the integration tests.
//!
//! Behaves like the real backend for the happy paths and exposes gates
//! (zero-permit semaphores) so a test can hold a fetch in flight and race
//! another operation against it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use studydeck::api::{
    ApiError, ArtifactSummary, Card, Document, FlashcardSetDetail, QuizQuestion, Session, StudyApi, UploadReceipt,
};

pub const USER_ID: i64 = 1;
pub const USERNAME: &str = "ana";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
struct FakeState {
    next_id: i64,
    documents: Vec<Document>,
    flashcard_sets: HashMap<i64, Vec<ArtifactSummary>>,
    quizzes: HashMap<i64, Vec<ArtifactSummary>>,
    flashcard_details: HashMap<i64, FlashcardSetDetail>,
    quiz_details: HashMap<i64, Vec<QuizQuestion>>,
    fail_lists_for: Option<i64>,
    fail_generation: bool,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
    list_gates: Mutex<HashMap<i64, Arc<Semaphore>>>,
    create_gates: Mutex<HashMap<i64, Arc<Semaphore>>>,
    list_calls: AtomicUsize,
    gate_arrivals: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState { next_id: 1, ..FakeState::default() }),
            list_gates: Mutex::new(HashMap::new()),
            create_gates: Mutex::new(HashMap::new()),
            list_calls: AtomicUsize::new(0),
            gate_arrivals: AtomicUsize::new(0),
        })
    }

    fn alloc_id(state: &mut FakeState) -> i64 {
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    /// Seed a document and return its id.
    pub fn seed_document(&self, filename: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = Self::alloc_id(&mut state);
        state.documents.push(Document {
            id,
            filename: filename.to_string(),
            created_at: Some("2026-08-26 10:00:00".to_string()),
        });
        id
    }

    /// Seed a flashcard set for a document and return its id.
    pub fn seed_flashcard_set(&self, document_id: i64, title: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = Self::alloc_id(&mut state);
        state.flashcard_sets.entry(document_id).or_default().insert(
            0,
            ArtifactSummary {
                id,
                title: title.to_string(),
                created_at: Some("2026-08-26 10:05:00".to_string()),
            },
        );
        state.flashcard_details.insert(
            id,
            FlashcardSetDetail {
                title: None,
                cards: vec![Card {
                    question: "What is a monad?".to_string(),
                    answer: "A monoid in the category of endofunctors".to_string(),
                }],
            },
        );
        id
    }

    /// Seed a quiz for a document and return its id.
    pub fn seed_quiz(&self, document_id: i64, title: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = Self::alloc_id(&mut state);
        state.quizzes.entry(document_id).or_default().insert(
            0,
            ArtifactSummary {
                id,
                title: title.to_string(),
                created_at: Some("2026-08-26 10:06:00".to_string()),
            },
        );
        state.quiz_details.insert(
            id,
            vec![QuizQuestion {
                question: "2 + 2?".to_string(),
                options: [("a".to_string(), "3".to_string()), ("b".to_string(), "4".to_string())]
                    .into_iter()
                    .collect(),
                correct_answer: "b".to_string(),
            }],
        );
        id
    }

    /// Hold all artifact-list fetches for a document until released.
    pub fn hold_lists(&self, document_id: i64) {
        self.list_gates
            .lock()
            .unwrap()
            .insert(document_id, Arc::new(Semaphore::new(0)));
    }

    pub fn release_lists(&self, document_id: i64) {
        if let Some(gate) = self.list_gates.lock().unwrap().remove(&document_id) {
            gate.add_permits(1024);
        }
    }

    /// Hold generation requests for a document until released.
    pub fn hold_create(&self, document_id: i64) {
        self.create_gates
            .lock()
            .unwrap()
            .insert(document_id, Arc::new(Semaphore::new(0)));
    }

    pub fn release_create(&self, document_id: i64) {
        if let Some(gate) = self.create_gates.lock().unwrap().remove(&document_id) {
            gate.add_permits(1024);
        }
    }

    /// Make list fetches for a document fail with a network error.
    pub fn fail_lists_for(&self, document_id: i64) {
        self.state.lock().unwrap().fail_lists_for = Some(document_id);
    }

    pub fn heal_lists(&self) {
        self.state.lock().unwrap().fail_lists_for = None;
    }

    /// Make generation requests fail.
    pub fn fail_generation(&self, fail: bool) {
        self.state.lock().unwrap().fail_generation = fail;
    }

    /// How many artifact-list endpoints have been hit.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Wait until a held fetch has actually reached its gate.
    pub async fn gate_arrived(&self) {
        while self.gate_arrivals.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    async fn wait_list_gate(&self, document_id: i64) {
        let gate = self.list_gates.lock().unwrap().get(&document_id).cloned();
        if let Some(gate) = gate {
            self.gate_arrivals.fetch_add(1, Ordering::SeqCst);
            let _permit = gate.acquire().await;
        }
    }

    async fn wait_create_gate(&self, document_id: i64) {
        let gate = self.create_gates.lock().unwrap().get(&document_id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
    }

    fn check_list_failure(&self, document_id: i64) -> Result<(), ApiError> {
        if self.state.lock().unwrap().fail_lists_for == Some(document_id) {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StudyApi for FakeApi {
    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        if username == USERNAME && password == PASSWORD {
            Ok(Session {
                user_id: USER_ID,
                username: USERNAME.to_string(),
            })
        } else {
            Err(ApiError::Auth("Wrong username or password".to_string()))
        }
    }

    async fn register(&self, username: &str, _password: &str) -> Result<(), ApiError> {
        if username == USERNAME {
            Err(ApiError::Auth("Username already exists".to_string()))
        } else {
            Ok(())
        }
    }

    async fn documents(&self, _user_id: i64) -> Result<Vec<Document>, ApiError> {
        Ok(self.state.lock().unwrap().documents.clone())
    }

    async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>, _user_id: i64) -> Result<UploadReceipt, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Upload("PDF has no content".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let id = Self::alloc_id(&mut state);
        state.documents.push(Document {
            id,
            filename: filename.to_string(),
            created_at: Some("2026-08-26 11:00:00".to_string()),
        });
        Ok(UploadReceipt {
            document_id: id,
            filename: filename.to_string(),
        })
    }

    async fn delete_document(&self, document_id: i64, _user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let before = state.documents.len();
        state.documents.retain(|d| d.id != document_id);
        if state.documents.len() == before {
            return Err(ApiError::NotFound(format!("Document {document_id} not found")));
        }
        state.flashcard_sets.remove(&document_id);
        state.quizzes.remove(&document_id);
        Ok(())
    }

    async fn create_flashcards(&self, _user_id: i64, document_id: i64, num_cards: u32) -> Result<(), ApiError> {
        self.wait_create_gate(document_id).await;
        if self.state.lock().unwrap().fail_generation {
            return Err(ApiError::Network("Generation backend unavailable".to_string()));
        }
        self.seed_flashcard_set(document_id, &format!("Flashcard - Document {document_id} ({num_cards} cards)"));
        Ok(())
    }

    async fn flashcard_sets(&self, _user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError> {
        self.wait_list_gate(document_id).await;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_list_failure(document_id)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .flashcard_sets
            .get(&document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn flashcard_set(&self, set_id: i64, _user_id: i64) -> Result<FlashcardSetDetail, ApiError> {
        self.state
            .lock()
            .unwrap()
            .flashcard_details
            .get(&set_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Flashcard set not found".to_string()))
    }

    async fn delete_flashcard_set(&self, set_id: i64, _user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.flashcard_details.remove(&set_id).is_none() {
            return Err(ApiError::NotFound("Flashcard set not found".to_string()));
        }
        for sets in state.flashcard_sets.values_mut() {
            sets.retain(|s| s.id != set_id);
        }
        Ok(())
    }

    async fn create_quiz(&self, _user_id: i64, document_id: i64, num_questions: u32) -> Result<(), ApiError> {
        self.wait_create_gate(document_id).await;
        if self.state.lock().unwrap().fail_generation {
            return Err(ApiError::Network("Generation backend unavailable".to_string()));
        }
        self.seed_quiz(document_id, &format!("Quiz - Document {document_id} ({num_questions} questions)"));
        Ok(())
    }

    async fn quizzes(&self, _user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError> {
        self.wait_list_gate(document_id).await;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_list_failure(document_id)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .quizzes
            .get(&document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn quiz(&self, quiz_id: i64, _user_id: i64) -> Result<Vec<QuizQuestion>, ApiError> {
        self.state
            .lock()
            .unwrap()
            .quiz_details
            .get(&quiz_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
    }

    async fn delete_quiz(&self, quiz_id: i64, _user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.quiz_details.remove(&quiz_id).is_none() {
            return Err(ApiError::NotFound("Quiz not found".to_string()));
        }
        for quizzes in state.quizzes.values_mut() {
            quizzes.retain(|q| q.id != quiz_id);
        }
        Ok(())
    }
}

/// In-memory session slot for tests.
#[derive(Default)]
pub struct MemorySlot {
    stored: Mutex<Option<Session>>,
}

impl studydeck::session::SessionSlot for MemorySlot {
    fn load(&self) -> Option<Session> {
        self.stored.lock().unwrap().clone()
    }

    fn store(&self, session: &Session) -> anyhow::Result<()> {
        *self.stored.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

/// Coordinator wired to a fresh fake backend, signed in as the test user.
pub async fn signed_in_coordinator() -> (
    Arc<FakeApi>,
    studydeck::StudyCoordinator,
    tokio::sync::mpsc::UnboundedReceiver<studydeck::Event>,
) {
    let api = FakeApi::new();
    let config = studydeck::config::Config::default();
    let (coordinator, events) =
        studydeck::StudyCoordinator::new(api.clone(), Arc::new(MemorySlot::default()), &config);
    coordinator
        .sign_in(USERNAME, PASSWORD)
        .await
        .expect("test sign-in failed");
    (api, coordinator, events)
}
