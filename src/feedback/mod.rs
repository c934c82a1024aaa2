use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod mirror;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::feedback_routes()
}
