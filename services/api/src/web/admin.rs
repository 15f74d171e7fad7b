//! services/api/src/web/admin.rs
//!
//! The JSON admin surface: session listing, aggregate stats, deletion and a
//! CSV export. All routes sit behind the admin-token middleware.

use crate::web::protocol::ErrorResponse;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct AdminSessionSummary {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub completed: bool,
    pub questions_asked: usize,
    pub questions_answered: usize,
}

#[derive(Serialize, ToSchema)]
pub struct AdminStats {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub active_sessions: usize,
    pub total_answers: usize,
}

fn store_error(e: interview_core::ports::PortError) -> (StatusCode, Json<ErrorResponse>) {
    error!("admin store access failed: {e:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            details: None,
        }),
    )
}

/// GET /admin/sessions - list all known sessions.
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.store.list().await.map_err(store_error)?;
    let summaries: Vec<AdminSessionSummary> = sessions
        .iter()
        .map(|s| AdminSessionSummary {
            token: s.token.clone(),
            created_at: s.created_at,
            last_activity: s.last_activity,
            completed: s.completed,
            questions_asked: s.asked.len(),
            questions_answered: s.questions_answered(),
        })
        .collect();
    Ok(Json(summaries))
}

/// GET /admin/stats - aggregate counters over all sessions.
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.store.list().await.map_err(store_error)?;
    let completed = sessions.iter().filter(|s| s.completed).count();
    let stats = AdminStats {
        total_sessions: sessions.len(),
        completed_sessions: completed,
        active_sessions: sessions.len() - completed,
        total_answers: sessions.iter().map(|s| s.questions_answered()).sum(),
    };
    Ok(Json(stats))
}

/// DELETE /admin/session/{token} - drop one session.
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state.store.delete(&token).await.map_err(store_error)?;
    info!(token = %token, "session deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/export/sessions - CSV export of the session table.
pub async fn export_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.store.list().await.map_err(store_error)?;
    let mut csv = String::from("token,created_at,completed,questions_asked,questions_answered\n");
    for s in &sessions {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            s.token,
            s.created_at.to_rfc3339(),
            s.completed,
            s.asked.len(),
            s.questions_answered(),
        ));
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=sessions.csv",
            ),
        ],
        csv,
    ))
}
