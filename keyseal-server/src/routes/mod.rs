//! API route handlers

pub mod health;
pub mod keys;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the API router.
///
/// `prefix` must be empty or start with a slash and not end with one (see
/// [`crate::ServerConfig::normalized_prefix`]).
pub fn create_router(state: AppState, prefix: &str) -> Router {
    let key_routes = Router::new()
        .route(
            "/geds/{keyname}",
            post(keys::create_key).head(keys::key_exists),
        )
        .route("/geds/{keyname}/encrypt", post(keys::encrypt))
        .route("/geds/{keyname}/decrypt", post(keys::decrypt));

    let router = Router::new().route("/health", get(health::health_check));
    let router = if prefix.is_empty() {
        router.merge(key_routes)
    } else {
        router.nest(prefix, key_routes)
    };

    router.with_state(state)
}
