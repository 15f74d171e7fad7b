//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the interview REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    CompleteSessionResponse, CreateSessionResponse, ErrorResponse, GlyphResponse,
    NextQuestionRequest, NextQuestionResponse, QuestionPayload, ResultResponse,
    SessionStatusResponse, SubmitAnswerRequest, SubmitAnswerResponse, SummaryResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use interview_core::domain::{AnswerSubmission, TurnContext};
use interview_core::ports::PortError;
use std::sync::Arc;
use tracing::error;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        session_status_handler,
        next_question_handler,
        submit_answer_handler,
        complete_session_handler,
        result_handler,
        glyph_handler,
        summary_handler,
        discard_session_handler,
        crate::web::chat::chat_handler,
        crate::web::chat::health_handler,
    ),
    components(schemas(
        CreateSessionResponse,
        SessionStatusResponse,
        NextQuestionRequest,
        NextQuestionResponse,
        QuestionPayload,
        SubmitAnswerRequest,
        SubmitAnswerResponse,
        CompleteSessionResponse,
        ResultResponse,
        GlyphResponse,
        SummaryResponse,
        ErrorResponse,
        crate::web::protocol::ChatRequest,
        crate::web::protocol::ChatMessagePayload,
        crate::web::protocol::HealthResponse,
    )),
    tags(
        (name = "Interview API", description = "API endpoints for the timed interview flow.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port error onto the HTTP status and uniform error body.
pub fn error_response(e: PortError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
        PortError::Expired => (StatusCode::FORBIDDEN, "session token has expired".to_string()),
        PortError::AlreadyCompleted => {
            (StatusCode::FORBIDDEN, "session is already completed".to_string())
        }
        PortError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
        PortError::Network(_) | PortError::Unexpected(_) => {
            error!("interview backend error: {e:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: message,
            details: None,
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Open a new interview session.
#[utoipa::path(
    post,
    path = "/session",
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let token = state.backend.create_session().await.map_err(error_response)?;
    Ok(Json(CreateSessionResponse { token }))
}

/// Report the live state of a session.
#[utoipa::path(
    get,
    path = "/session/{token}",
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
        (status = 403, description = "Token expired", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn session_status_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let status = state
        .backend
        .session_status(&token)
        .await
        .map_err(error_response)?;
    Ok(Json(SessionStatusResponse {
        token: status.token,
        created_at: status.created_at,
        completed: status.completed,
        questions_answered: status.questions_answered,
        total_questions: status.total_questions,
        asked_questions: status.asked_questions,
        current_performance: status.current_performance,
    }))
}

/// Issue the next question, or report that the interview bound is reached.
#[utoipa::path(
    post,
    path = "/aeon/question/{token}",
    request_body = NextQuestionRequest,
    responses(
        (status = 200, description = "Next question or completion marker", body = NextQuestionResponse),
        (status = 403, description = "Token expired or session completed", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn next_question_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(request): Json<NextQuestionRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let turn = TurnContext {
        question_index: request.current_question_index,
        asked_questions: request.asked_questions,
        answers: request.answers,
    };
    let question = state
        .backend
        .next_question(&token, &turn)
        .await
        .map_err(error_response)?;
    let status = state
        .backend
        .session_status(&token)
        .await
        .map_err(error_response)?;

    Ok(Json(NextQuestionResponse {
        completed: question.is_none(),
        question: question.map(|q| QuestionPayload {
            id: q.id,
            text: q.text,
            kind: q.kind.as_str().to_string(),
        }),
        total_questions: status.total_questions,
        remaining_questions: status.total_questions.saturating_sub(status.asked_questions),
    }))
}

/// Record an answer for a previously issued question.
#[utoipa::path(
    post,
    path = "/session/{token}/answer",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Invalid answer", body = ErrorResponse),
        (status = 403, description = "Token expired or session completed", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn submit_answer_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let submission = AnswerSubmission {
        question_id: request.question_id,
        text: request.answer,
        time_spent_seconds: request.time_spent,
    };
    let receipt = state
        .backend
        .submit_answer(&token, &submission)
        .await
        .map_err(error_response)?;
    Ok(Json(SubmitAnswerResponse {
        success: true,
        answers_saved: receipt.answers_saved,
        total_questions: receipt.total_questions,
        remaining_questions: receipt.remaining_questions,
        time_spent: receipt.time_spent_seconds,
    }))
}

/// Mark a session as completed.
#[utoipa::path(
    post,
    path = "/session/{token}/complete",
    responses(
        (status = 200, description = "Session completed", body = CompleteSessionResponse),
        (status = 403, description = "Token expired", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn complete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state
        .backend
        .complete_session(&token)
        .await
        .map_err(error_response)?;
    Ok(Json(CompleteSessionResponse {
        status: "completed".to_string(),
    }))
}

/// Fetch the numeric result for a session.
#[utoipa::path(
    get,
    path = "/result/{token}",
    responses(
        (status = 200, description = "Interview result", body = ResultResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn result_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let result = state
        .backend
        .fetch_result(&token)
        .await
        .map_err(error_response)?;
    Ok(Json(ResultResponse {
        session_id: result.session_id,
        total_time: result.total_time_seconds,
        questions_answered: result.questions_answered,
        completion_rate: result.completion_rate,
        average_time_per_question: result.average_time_per_question,
        performance_score: result.performance_score,
        created_at: result.created_at,
        completed_at: result.completed_at,
    }))
}

/// Generate the glyph artifact for a session.
#[utoipa::path(
    post,
    path = "/aeon/glyph/{token}",
    responses(
        (status = 200, description = "Glyph artifact", body = GlyphResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn glyph_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let glyph = state
        .backend
        .generate_glyph(&token)
        .await
        .map_err(error_response)?;
    Ok(Json(GlyphResponse {
        svg: glyph.svg,
        profile: glyph.profile,
    }))
}

/// Compose the analysis summary for a session.
#[utoipa::path(
    post,
    path = "/aeon/summary/{token}",
    responses(
        (status = 200, description = "Interview summary", body = SummaryResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let summary = state
        .backend
        .fetch_summary(&token)
        .await
        .map_err(error_response)?;
    Ok(Json(SummaryResponse { summary }))
}

/// Discard a session.
#[utoipa::path(
    delete,
    path = "/session/{token}",
    responses(
        (status = 204, description = "Session discarded"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(("token" = String, Path, description = "Session token"))
)]
pub async fn discard_session_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state
        .backend
        .discard_session(&token)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
