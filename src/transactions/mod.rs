mod dto;
mod extractors;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

use crate::{auth::extractors::require_auth, state::AppState};
use axum::{middleware, Router};

/// Transaction and summary routes, gated by bearer auth unless the
/// deployment runs with `AUTH_REQUIRED=false`.
pub fn router(state: &AppState) -> Router<AppState> {
    let routes = handlers::routes();
    if state.config.auth_required {
        routes.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
    } else {
        routes
    }
}
