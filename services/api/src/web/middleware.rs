//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for the admin surface.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Middleware that checks the admin bearer token.
///
/// When no `ADMIN_TOKEN` is configured the admin surface stays closed: every
/// request is rejected rather than silently left open.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        warn!("admin request rejected: no admin token configured");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if presented != expected {
        warn!("admin request rejected: bad token");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}
