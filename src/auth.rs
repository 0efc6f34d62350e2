//! Session authentication middleware.
//!
//! Resolves `Authorization: Bearer <token>` against the session registry and
//! attaches the resulting identity to the request. Token issuance lives in
//! the credential layer in front of this service.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::perm::Role;
use crate::state::AppState;

/// Identity attached to authenticated requests.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

/// Paths that skip session resolution: monitoring, docs, and the public gate
/// endpoints (those verify humans, not sessions).
fn is_public(path: &str, method: &Method) -> bool {
    if *method == Method::OPTIONS {
        return true;
    }
    matches!(
        path,
        "/health"
            | "/metrics"
            | "/api/openapi.json"
            | "/api/auth/register"
            | "/api/newsletter/subscribe"
    )
}

/// Middleware that requires a live session on non-public routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(req.uri().path(), req.method()) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let user_id = token
        .and_then(|t| state.sessions().resolve(t, state.session_ttl()))
        .ok_or(ApiError::Unauthorized)?;

    // Session may outlive the account in principle; treat that as no session
    let user = state
        .store()
        .user_by_id(&user_id)
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id.clone(),
        role: user.role,
    });
    Ok(next.run(req).await)
}
