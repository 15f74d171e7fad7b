//! crates/interview_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or HTTP backends.

use async_trait::async_trait;

use crate::domain::{
    AnswerReceipt, AnswerSubmission, AutosaveSnapshot, ChatMessage, Glyph, InterviewResult,
    Question, QuestionKind, Session, SessionStatus, TurnContext,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Session token has expired")]
    Expired,
    #[error("Session is already completed")]
    AlreadyCompleted,
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for interview sessions, keyed by token. The only shared mutable
/// resource in the system; everything else is request/response.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: Session) -> PortResult<()>;
    async fn load(&self, token: &str) -> PortResult<Session>;
    async fn save(&self, session: &Session) -> PortResult<()>;
    async fn delete(&self, token: &str) -> PortResult<()>;
    async fn list(&self) -> PortResult<Vec<Session>>;
}

/// The full client-facing contract of the interview backend. Implemented
/// in-process by the engine and remotely by an HTTP adapter; which one a
/// caller gets is decided once at startup, never inferred per call.
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Opens a new session and returns its token.
    async fn create_session(&self) -> PortResult<String>;

    async fn session_status(&self, token: &str) -> PortResult<SessionStatus>;

    /// Fetches the next question. `Ok(None)` means "no more questions" and is
    /// also the mapped outcome for an exhausted or broken question source.
    async fn next_question(&self, token: &str, turn: &TurnContext) -> PortResult<Option<Question>>;

    async fn submit_answer(
        &self,
        token: &str,
        answer: &AnswerSubmission,
    ) -> PortResult<AnswerReceipt>;

    async fn complete_session(&self, token: &str) -> PortResult<()>;

    async fn fetch_result(&self, token: &str) -> PortResult<InterviewResult>;

    async fn generate_glyph(&self, token: &str) -> PortResult<Glyph>;

    async fn fetch_summary(&self, token: &str) -> PortResult<String>;

    /// Discards the session server-side. Best-effort; callers may ignore errors.
    async fn discard_session(&self, token: &str) -> PortResult<()>;
}

/// LLM-backed generation of one additional interview question, used only when
/// the static pool runs out before the configured bound is reached.
#[async_trait]
pub trait QuestionGenerationService: Send + Sync {
    async fn generate_question(
        &self,
        kind: QuestionKind,
        asked_count: usize,
    ) -> PortResult<Question>;
}

/// One-shot chat-completion relay used by the chat proxy endpoint.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> PortResult<ChatMessage>;
}

/// Best-effort persistence of the answer being typed, superseded by a
/// server-confirmed submission.
#[async_trait]
pub trait AutosaveStore: Send + Sync {
    async fn save(&self, snapshot: &AutosaveSnapshot) -> PortResult<()>;
    async fn load(&self) -> PortResult<Option<AutosaveSnapshot>>;
    async fn clear(&self) -> PortResult<()>;
}
