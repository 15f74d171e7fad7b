//! services/api/src/adapters/backend_http.rs
//!
//! An `InterviewBackend` implementation that talks to a remote interview API
//! over HTTP. This is the adapter the runner uses when pointed at a deployed
//! service; the wire shapes are the same `protocol` structs the server emits.

use crate::web::protocol::{
    CreateSessionResponse, ErrorResponse, GlyphResponse, NextQuestionRequest,
    NextQuestionResponse, ResultResponse, SessionStatusResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, SummaryResponse,
};
use async_trait::async_trait;
use interview_core::domain::{
    AnswerReceipt, AnswerSubmission, Glyph, InterviewResult, Question, QuestionKind, SessionStatus,
    TurnContext,
};
use interview_core::ports::{InterviewBackend, PortError, PortResult};
use reqwest::StatusCode;
use std::time::Duration;

/// Conventional client timeout; on expiry the caller degrades rather than
/// retrying.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpInterviewBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInterviewBackend {
    /// Creates a client for the interview API at `base_url`.
    pub fn new(base_url: &str) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps a non-success response onto the port error taxonomy, using the
    /// uniform error body when one is present.
    async fn error_from(response: reqwest::Response) -> PortError {
        let status = response.status();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("HTTP {status}"));
        match status {
            StatusCode::NOT_FOUND => PortError::NotFound(message),
            StatusCode::FORBIDDEN => PortError::Expired,
            StatusCode::UNAUTHORIZED => PortError::Unauthorized,
            StatusCode::BAD_REQUEST => PortError::Invalid(message),
            _ => PortError::Unexpected(message),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> PortResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("malformed response body: {e}")))
    }

    fn send_error(e: reqwest::Error) -> PortError {
        PortError::Network(e.to_string())
    }
}

#[async_trait]
impl InterviewBackend for HttpInterviewBackend {
    async fn create_session(&self) -> PortResult<String> {
        let response = self
            .client
            .post(self.url("/session"))
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: CreateSessionResponse = Self::parse(response).await?;
        Ok(body.token)
    }

    async fn session_status(&self, token: &str) -> PortResult<SessionStatus> {
        let response = self
            .client
            .get(self.url(&format!("/session/{token}")))
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: SessionStatusResponse = Self::parse(response).await?;
        Ok(SessionStatus {
            token: body.token,
            created_at: body.created_at,
            completed: body.completed,
            questions_answered: body.questions_answered,
            total_questions: body.total_questions,
            asked_questions: body.asked_questions,
            current_performance: body.current_performance,
        })
    }

    async fn next_question(&self, token: &str, turn: &TurnContext) -> PortResult<Option<Question>> {
        let request = NextQuestionRequest {
            current_question_index: turn.question_index,
            asked_questions: turn.asked_questions.clone(),
            answers: turn.answers.clone(),
        };
        let response = self
            .client
            .post(self.url(&format!("/aeon/question/{token}")))
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: NextQuestionResponse = Self::parse(response).await?;
        Ok(body.question.map(|q| Question {
            id: q.id,
            text: q.text,
            kind: if q.kind == "technical" {
                QuestionKind::Technical
            } else {
                QuestionKind::Soft
            },
            keywords: Vec::new(),
        }))
    }

    async fn submit_answer(
        &self,
        token: &str,
        answer: &AnswerSubmission,
    ) -> PortResult<AnswerReceipt> {
        let request = SubmitAnswerRequest {
            question_id: answer.question_id.clone(),
            answer: answer.text.clone(),
            time_spent: answer.time_spent_seconds,
        };
        let response = self
            .client
            .post(self.url(&format!("/session/{token}/answer")))
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: SubmitAnswerResponse = Self::parse(response).await?;
        Ok(AnswerReceipt {
            answers_saved: body.answers_saved,
            total_questions: body.total_questions,
            remaining_questions: body.remaining_questions,
            time_spent_seconds: body.time_spent,
        })
    }

    async fn complete_session(&self, token: &str) -> PortResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/session/{token}/complete")))
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn fetch_result(&self, token: &str) -> PortResult<InterviewResult> {
        let response = self
            .client
            .get(self.url(&format!("/result/{token}")))
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: ResultResponse = Self::parse(response).await?;
        Ok(InterviewResult {
            session_id: body.session_id,
            total_time_seconds: body.total_time,
            questions_answered: body.questions_answered,
            completion_rate: body.completion_rate,
            average_time_per_question: body.average_time_per_question,
            performance_score: body.performance_score,
            created_at: body.created_at,
            completed_at: body.completed_at,
        })
    }

    async fn generate_glyph(&self, token: &str) -> PortResult<Glyph> {
        let response = self
            .client
            .post(self.url(&format!("/aeon/glyph/{token}")))
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: GlyphResponse = Self::parse(response).await?;
        Ok(Glyph {
            svg: body.svg,
            profile: body.profile,
        })
    }

    async fn fetch_summary(&self, token: &str) -> PortResult<String> {
        let response = self
            .client
            .post(self.url(&format!("/aeon/summary/{token}")))
            .send()
            .await
            .map_err(Self::send_error)?;
        let body: SummaryResponse = Self::parse(response).await?;
        Ok(body.summary)
    }

    async fn discard_session(&self, token: &str) -> PortResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/session/{token}")))
            .send()
            .await
            .map_err(Self::send_error)?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}
