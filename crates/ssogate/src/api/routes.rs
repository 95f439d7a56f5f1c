//! Route definitions.

use axum::{Router, routing::get};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::protect;

use super::error::not_found;
use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Protected routes (require a session)
    let protected_routes = protect(
        Router::new().route("/user", get(handlers::user_page)),
        state.codec.clone(),
    )
    .with_state(state.clone());

    let public_routes = Router::new()
        .route("/", get(handlers::landing))
        .route("/health", get(handlers::health))
        .route("/auth/{action}/{provider}", get(handlers::auth_action))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(trace_layer)
}
