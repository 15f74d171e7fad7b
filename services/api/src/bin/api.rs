//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MemorySessionStore, OpenAiChatAdapter, OpenAiQuestionAdapter, PgSessionStore},
    config::Config,
    engine::{EngineConfig, InterviewEngine},
    error::ApiError,
    questions::question_pool,
    web::{
        admin::{
            delete_session_handler, export_sessions_handler, list_sessions_handler, stats_handler,
        },
        chat_handler, complete_session_handler, create_session_handler, discard_session_handler,
        glyph_handler, health_handler, next_question_handler, require_admin, rest::ApiDoc,
        result_handler, session_status_handler, state::AppState, submit_answer_handler,
        summary_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use chrono::Duration as ChronoDuration;
use interview_core::ports::{ChatService, QuestionGenerationService, SessionStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Session Store ---
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let pg_store = PgSessionStore::new(db_pool);
            info!("Running database migrations...");
            pg_store
                .run_migrations()
                .await
                .map_err(|e| ApiError::Internal(format!("migration failed: {e}")))?;
            info!("Database migrations complete.");
            Arc::new(pg_store)
        }
        None => {
            warn!("DATABASE_URL not set; sessions are kept in memory only");
            Arc::new(MemorySessionStore::new())
        }
    };

    // --- 3. Initialize LLM Adapters (optional) ---
    let (chat, question_gen): (
        Option<Arc<dyn ChatService>>,
        Option<Arc<dyn QuestionGenerationService>>,
    ) = match &config.openai_api_key {
        Some(key) => {
            let openai_config = OpenAIConfig::new().with_api_key(key);
            let openai_client = Client::with_config(openai_config);
            let chat = OpenAiChatAdapter::new(openai_client.clone(), config.chat_model.clone());
            let questions =
                OpenAiQuestionAdapter::new(openai_client, config.question_model.clone());
            (Some(Arc::new(chat)), Some(Arc::new(questions)))
        }
        None => {
            warn!("OPENAI_API_KEY not set; chat proxy and question generation are disabled");
            (None, None)
        }
    };

    // --- 4. Build the Engine and the Shared AppState ---
    let session_ttl = ChronoDuration::from_std(config.session_ttl)
        .map_err(|e| ApiError::Internal(format!("invalid SESSION_TTL_SECS: {e}")))?;
    let engine = Arc::new(InterviewEngine::new(
        store.clone(),
        question_gen,
        question_pool(),
        EngineConfig {
            total_questions: config.total_questions,
            session_ttl,
        },
    ));
    let app_state = Arc::new(AppState {
        config: config.clone(),
        backend: engine,
        store,
        chat,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Interview flow and chat proxy (no auth required)
    let public_routes = Router::new()
        .route("/session", post(create_session_handler))
        .route(
            "/session/{token}",
            get(session_status_handler).delete(discard_session_handler),
        )
        .route("/session/{token}/answer", post(submit_answer_handler))
        .route("/session/{token}/complete", post(complete_session_handler))
        .route("/aeon/question/{token}", post(next_question_handler))
        .route("/aeon/glyph/{token}", post(glyph_handler))
        .route("/aeon/summary/{token}", post(summary_handler))
        .route("/result/{token}", get(result_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler));

    // Admin surface (bearer token required)
    let admin_routes = Router::new()
        .route("/admin/sessions", get(list_sessions_handler))
        .route("/admin/stats", get(stats_handler))
        .route("/admin/session/{token}", delete(delete_session_handler))
        .route("/admin/export/sessions", get(export_sessions_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
