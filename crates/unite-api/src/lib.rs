pub mod agents;
pub mod auth;
pub mod conversations;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod users;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;
use crate::middleware::require_auth;

pub async fn health() -> &'static str {
    "ok"
}

/// Full HTTP surface. Everything except login and health needs a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    // `{agent}` is a slug on GET and messages, an id on PUT/DELETE.
    let protected_routes = Router::new()
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route("/agents/sectors", get(agents::list_sectors))
        .route(
            "/agents/{agent}",
            get(agents::get_agent).put(agents::update_agent).delete(agents::delete_agent),
        )
        .route("/agents/{agent}/messages", post(messages::send_message))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/{id}", get(conversations::get_conversation))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
