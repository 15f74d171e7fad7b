//! services/api/src/web/chat.rs
//!
//! The stateless chat proxy: forwards a message array to the LLM provider and
//! returns the assistant's reply, plus the health endpoint. Input validation
//! and error translation happen here; no conversation state is kept.

use crate::web::protocol::{ChatMessagePayload, ChatRequest, ErrorResponse, HealthResponse};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use interview_core::domain::{ChatMessage, ChatRole};
use std::sync::Arc;
use tracing::error;

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Parses the loose wire payload into typed chat messages, or explains why it
/// is malformed.
fn parse_messages(raw: &serde_json::Value) -> Result<Vec<ChatMessage>, &'static str> {
    let items = raw.as_array().ok_or("Invalid messages payload")?;
    if items.is_empty() {
        return Err("messages must not be empty");
    }
    let mut messages = Vec::with_capacity(items.len());
    for item in items {
        let role = item
            .get("role")
            .and_then(|r| r.as_str())
            .and_then(ChatRole::parse)
            .ok_or("message role must be system, user or assistant")?;
        let content = item
            .get("content")
            .and_then(|c| c.as_str())
            .ok_or("message content must be a string")?;
        messages.push(ChatMessage {
            role,
            content: content.to_string(),
        });
    }
    Ok(messages)
}

/// POST /api/chat - relay one chat completion request to the provider.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatMessagePayload),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Provider key missing or provider failure", body = ErrorResponse)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    // Validation comes first: a malformed body must never reach the provider.
    let messages = match parse_messages(&request.messages) {
        Ok(messages) => messages,
        Err(reason) => return bad_request(reason),
    };

    let Some(chat) = &state.chat else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "OpenAI API key not configured".to_string(),
                details: None,
            }),
        )
            .into_response();
    };

    match chat.complete_chat(&messages, request.model.as_deref()).await {
        Ok(reply) => Json(ChatMessagePayload {
            role: reply.role.as_str().to_string(),
            content: reply.content,
        })
        .into_response(),
        Err(e) => {
            error!("chat proxy provider call failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "OpenAI request failed".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/health - liveness plus provider configuration state.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        openai_configured: state.chat.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemorySessionStore;
    use crate::config::Config;
    use crate::engine::{EngineConfig, InterviewEngine};
    use crate::questions::question_pool;
    use async_trait::async_trait;
    use interview_core::ports::{ChatService, PortError, PortResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A provider stub that records whether it was ever called.
    struct CountingChat {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatService for CountingChat {
        async fn complete_chat(
            &self,
            _messages: &[ChatMessage],
            _model: Option<&str>,
        ) -> PortResult<ChatMessage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatMessage {
                role: ChatRole::Assistant,
                content: "hello from the stub".to_string(),
            })
        }
    }

    /// A provider stub that always fails.
    struct FailingChat;

    #[async_trait]
    impl ChatService for FailingChat {
        async fn complete_chat(
            &self,
            _messages: &[ChatMessage],
            _model: Option<&str>,
        ) -> PortResult<ChatMessage> {
            Err(PortError::Network("provider unreachable".to_string()))
        }
    }

    fn test_state(chat: Option<Arc<dyn ChatService>>) -> Arc<AppState> {
        let store = Arc::new(MemorySessionStore::new());
        let engine = Arc::new(InterviewEngine::new(
            store.clone(),
            None,
            question_pool(),
            EngineConfig::default(),
        ));
        Arc::new(AppState {
            config: Arc::new(Config::from_env().expect("test config")),
            backend: engine,
            store,
            chat,
        })
    }

    fn valid_body() -> ChatRequest {
        ChatRequest {
            messages: json!([{"role": "user", "content": "hi"}]),
            model: None,
        }
    }

    #[tokio::test]
    async fn non_array_messages_is_rejected_before_the_provider() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let state = test_state(Some(chat.clone()));
        let request = ChatRequest {
            messages: json!("not-an-array"),
            model: None,
        };

        let response = chat_handler(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_messages_is_rejected() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let state = test_state(Some(chat.clone()));
        let request = ChatRequest {
            messages: serde_json::Value::Null,
            model: None,
        };

        let response = chat_handler(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let state = test_state(None);
        let request = ChatRequest {
            messages: json!([{"role": "operator", "content": "hi"}]),
            model: None,
        };
        let response = chat_handler(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_provider_key_reports_500() {
        let state = test_state(None);
        let response = chat_handler(State(state), Json(valid_body())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn provider_failure_translates_to_500_with_details() {
        let state = test_state(Some(Arc::new(FailingChat)));
        let response = chat_handler(State(state), Json(valid_body())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn valid_request_returns_the_assistant_reply() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let state = test_state(Some(chat.clone()));
        let response = chat_handler(State(state), Json(valid_body())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn health_reports_provider_configuration() {
        let state = test_state(None);
        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health.status, "ok");
        assert!(!health.openai_configured);
    }
}
