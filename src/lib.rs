//! Studydeck - client-side state coordinator for a study assistant
//!
//! This library keeps the three panels of a study assistant client (document
//! list, action panel, artifact panel) consistent with one selected document
//! and its generated artifacts, against a REST backend and without a shared
//! server-pushed event stream.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`api`] - Typed REST contract, error taxonomy, and the HTTP client
//! * [`config`] - Application configuration management
//! * [`coordinator`] - The shared store injected into every view
//! * [`documents`] - Registry of the user's uploaded documents
//! * [`artifacts`] - Per-document cache of generated artifact summaries
//! * [`selection`] - The document/artifact selection cursor
//! * [`dispatch`] - Background generation requests and progress events
//! * [`session`] - Authenticated identity and its persistence slot

/// REST API contract and transport
pub mod api;

/// Per-document artifact summary cache and detail fetches
pub mod artifacts;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// The shared coordinator injected into consuming views
pub mod coordinator;

/// Background generation dispatch and completion events
pub mod dispatch;

/// Registry of uploaded documents
pub mod documents;

/// In-memory activity log for debug panels
pub mod logger;

/// Selection cursor state machine
pub mod selection;

/// Session lifecycle and persistence slot
pub mod session;

// Re-export the types most embedders need at the crate root.
pub use api::{ApiError, ArtifactDetail, ArtifactKind, ArtifactSummary, Document, HttpApi, Session, StudyApi};
pub use artifacts::{ArtifactCache, ArtifactLists};
pub use coordinator::StudyCoordinator;
pub use dispatch::{ActionDispatcher, ActionStatus, DispatchError, Event, GenerationParams, PendingAction};
pub use documents::DocumentRegistry;
pub use selection::{SelectionController, SelectionState};
pub use session::{FileSlot, SessionSlot, SessionStore};
