mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod summary;

use crate::state::AppState;
use axum::Router;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes(state))
        .merge(handlers::write_routes(state))
}
