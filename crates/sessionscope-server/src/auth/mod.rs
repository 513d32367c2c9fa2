use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use sessionscope_core::config::AuthMode;

use crate::{error::AppError, state::AppState};

/// Require a valid `Authorization: Bearer <token>` header when the server
/// runs in token auth mode. In `none` mode every request passes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = match &state.config.auth_mode {
        AuthMode::None => return Ok(next.run(request).await),
        AuthMode::Token(token) => token,
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized),
    }
}
