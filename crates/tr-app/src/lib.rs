//! Shared application service layer for tiltring.
//!
//! This crate provides a unified interface for both CLI and GUI frontends:
//! opening and saving model documents, launching the external simulation
//! binary with progress tailing, and the external-editor sync bridge.

pub mod document;
pub mod editor_sync;
pub mod error;
pub mod progress;
pub mod run_service;

// Re-export key types for convenience
pub use document::{DEFAULT_DISPLAYED, DefDocument};
pub use editor_sync::{EditorSync, SyncEvent, SyncEventKind};
pub use error::{AppError, AppResult};
pub use progress::{ProgressUpdate, parse_progress_line};
pub use run_service::{RunMessage, SimRun, start_run};
