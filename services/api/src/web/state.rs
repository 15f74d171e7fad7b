//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use interview_core::ports::{ChatService, InterviewBackend, SessionStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Which concrete adapters sit behind the trait objects is decided
/// in the binary, never inferred per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The interview engine.
    pub backend: Arc<dyn InterviewBackend>,
    /// Raw store access for the admin surface.
    pub store: Arc<dyn SessionStore>,
    /// Absent when no provider key is configured; the chat proxy then
    /// reports 500 instead of calling anything.
    pub chat: Option<Arc<dyn ChatService>>,
}
