//! HTTP API routes for the RankAndPlay server.

mod auth;
mod newsletter;
mod posts;
mod ratings;
mod system;
pub mod types;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// OpenAPI
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RankAndPlay Server API",
        description = "Public mutation endpoints of the RankAndPlay community platform.\n\nState-changing requests pass an ordered gate: rate limit, schema validation, bot verification, then the uniqueness-checked write. Post and rating endpoints additionally require a bearer session.",
        version = "0.3.0",
        license(name = "Apache-2.0"),
    ),
    paths(
        auth::register,
        newsletter::subscribe,
        posts::create_post,
        ratings::submit_rating,
        system::health,
    ),
    components(
        schemas(
            types::RegisterForm, types::SubscribeForm, types::CreatePostForm,
            types::PostResponse, types::RatingForm, types::RatingResponse,
            types::HealthResponse, ErrorBody,
        )
    ),
    tags(
        (name = "Accounts", description = "Registration for new community members"),
        (name = "Newsletter", description = "Newsletter subscription"),
        (name = "Posts", description = "Blog and review posts"),
        (name = "Ratings", description = "Per-game rating cards"),
        (name = "System", description = "System and health endpoints"),
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Builds the main application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public gate endpoints
        .route("/api/auth/register", post(auth::register))
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
        // Authenticated mutations
        .route("/api/posts", post(posts::create_post))
        .route("/api/ratings", post(ratings::submit_rating))
        // System
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics_endpoint))
        .route("/api/openapi.json", get(system::openapi))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::auth_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(&state))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = state.cors_origins();

    // No origins configured → no CORS headers (deny cross-origin by default).
    // Use --cors-origins "*" for permissive or specify exact origins.
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let x_request_id = axum::http::header::HeaderName::from_static("x-request-id");
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            x_request_id.clone(),
        ])
        .expose_headers([x_request_id]);

    if origins.len() == 1 && origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard origin — all cross-origin requests allowed");
        base.allow_origin(tower_http::cors::Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .map(|o| o.parse().expect("invalid CORS origin"))
            .collect();
        base.allow_origin(parsed)
    }
}
