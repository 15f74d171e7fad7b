//! services/api/src/web/protocol.rs
//!
//! Defines the REST wire payloads shared by the server handlers and the HTTP
//! client adapter. Every endpoint has one explicit schema; nothing is guessed
//! from field presence at runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

//=========================================================================================
// Session lifecycle
//=========================================================================================

/// Response to `POST /session`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CreateSessionResponse {
    pub token: String,
}

/// Response to `GET /session/{token}`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SessionStatusResponse {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub asked_questions: usize,
    pub current_performance: u8,
}

//=========================================================================================
// Question / answer exchange
//=========================================================================================

/// Body of `POST /aeon/question/{token}`: the caller's view of its own
/// progress, mirrored to the server for logging and diagnostics.
#[derive(Serialize, Deserialize, Debug, Default, ToSchema)]
pub struct NextQuestionRequest {
    #[serde(default)]
    pub current_question_index: usize,
    #[serde(default)]
    pub asked_questions: Vec<String>,
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// A question on the wire.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct QuestionPayload {
    pub id: String,
    pub text: String,
    /// "technical" or "soft".
    pub kind: String,
}

/// Response to `POST /aeon/question/{token}`. `question` is absent exactly
/// when the interview bound has been reached.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct NextQuestionResponse {
    pub question: Option<QuestionPayload>,
    pub total_questions: usize,
    pub remaining_questions: usize,
    pub completed: bool,
}

/// Body of `POST /session/{token}/answer`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub answer: String,
    #[serde(default)]
    pub time_spent: Option<u32>,
}

/// Response to `POST /session/{token}/answer`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitAnswerResponse {
    pub success: bool,
    pub answers_saved: usize,
    pub total_questions: usize,
    pub remaining_questions: usize,
    pub time_spent: u32,
}

//=========================================================================================
// Completion artifacts
//=========================================================================================

/// Response to `POST /session/{token}/complete`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CompleteSessionResponse {
    pub status: String,
}

/// Response to `GET /result/{token}`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ResultResponse {
    pub session_id: String,
    pub total_time: u64,
    pub questions_answered: usize,
    pub completion_rate: f32,
    pub average_time_per_question: u64,
    pub performance_score: u8,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Response to `POST /aeon/glyph/{token}`: the single, versioned glyph shape.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct GlyphResponse {
    pub svg: String,
    pub profile: String,
}

/// Response to `POST /aeon/summary/{token}`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

//=========================================================================================
// Chat proxy
//=========================================================================================

/// Body of `POST /api/chat`. `messages` is deliberately loose here so the
/// handler can reject malformed payloads with a 400 instead of a serde error.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ChatRequest {
    /// Missing defaults to `null`, which the handler rejects with a 400.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub messages: serde_json::Value,
    #[serde(default)]
    pub model: Option<String>,
}

/// One chat message on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ChatMessagePayload {
    pub role: String,
    pub content: String,
}

/// Response to `GET /api/health`.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub openai_configured: bool,
}

//=========================================================================================
// Errors
//=========================================================================================

/// The uniform error body for every non-2xx response.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
