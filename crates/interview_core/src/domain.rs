//! crates/interview_core/src/domain.rs
//!
//! Defines the pure, core data structures for the interview service.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// How long an in-progress answer snapshot stays valid before it is discarded.
pub const AUTOSAVE_TTL_HOURS: i64 = 24;

/// Represents one candidate's run through the interview, keyed by an opaque
/// server-issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Questions issued so far, in issue order.
    pub asked: Vec<AskedQuestion>,
    /// One record per answered question id. Re-submitting overwrites.
    pub answers: HashMap<String, AnswerRecord>,
}

/// A question that has been issued within a session, with its issue time so
/// the server can measure time spent independently of the client.
#[derive(Debug, Clone)]
pub struct AskedQuestion {
    pub question_id: String,
    pub issued_at: DateTime<Utc>,
}

/// One recorded candidate response.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub text: String,
    pub time_spent_seconds: u32,
    pub submitted_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, now: DateTime<Utc>) -> Self {
        Self {
            token,
            created_at: now,
            last_activity: now,
            completed: false,
            completed_at: None,
            asked: Vec::new(),
            answers: HashMap::new(),
        }
    }

    pub fn has_asked(&self, question_id: &str) -> bool {
        self.asked.iter().any(|q| q.question_id == question_id)
    }

    pub fn issued_at(&self, question_id: &str) -> Option<DateTime<Utc>> {
        self.asked
            .iter()
            .find(|q| q.question_id == question_id)
            .map(|q| q.issued_at)
    }

    pub fn questions_answered(&self) -> usize {
        self.answers.len()
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now > self.created_at + ttl
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}

/// A single prompt shown to the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub kind: QuestionKind,
    /// Terms the scoring pass looks for in the answer.
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Technical,
    Soft,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Technical => "technical",
            QuestionKind::Soft => "soft",
        }
    }
}

/// An answer as submitted by the candidate for one question.
#[derive(Debug, Clone)]
pub struct AnswerSubmission {
    pub question_id: String,
    pub text: String,
    /// Client-measured wall-clock seconds. The server-measured value takes
    /// precedence when the issue timestamp is known.
    pub time_spent_seconds: Option<u32>,
}

/// Acknowledgement returned after an answer is recorded.
#[derive(Debug, Clone)]
pub struct AnswerReceipt {
    pub answers_saved: usize,
    pub total_questions: usize,
    pub remaining_questions: usize,
    pub time_spent_seconds: u32,
}

/// The question-index / asked-questions view of the caller's local session
/// state, sent along with each question request.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub question_index: usize,
    pub asked_questions: Vec<String>,
    pub answers: HashMap<String, String>,
}

/// A snapshot of the live session as reported by the backend.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub asked_questions: usize,
    pub current_performance: u8,
}

/// The terminal numeric result of a completed interview.
#[derive(Debug, Clone)]
pub struct InterviewResult {
    pub session_id: String,
    pub total_time_seconds: u64,
    pub questions_answered: usize,
    pub completion_rate: f32,
    pub average_time_per_question: u64,
    pub performance_score: u8,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// The decorative terminal artifact: an SVG string plus a short profile text.
/// This is the single versioned wire shape for glyphs.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub svg: String,
    pub profile: String,
}

/// Heuristic classification of a finished answer set, used whenever the
/// backend-computed analysis is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Limited,
    Fair,
    Excellent,
}

impl QualityTier {
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Limited => "Limited",
            QualityTier::Fair => "Fair",
            QualityTier::Excellent => "Excellent",
        }
    }
}

/// A relayed chat message, as accepted and returned by the chat proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// A best-effort snapshot of the answer currently being typed.
#[derive(Debug, Clone)]
pub struct AutosaveSnapshot {
    pub token: String,
    pub question_id: String,
    pub draft: String,
    pub saved_at: DateTime<Utc>,
}

impl AutosaveSnapshot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.saved_at + Duration::hours(AUTOSAVE_TTL_HOURS)
    }
}
