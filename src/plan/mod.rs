pub mod dto;
pub mod fallback;
pub mod generation;
pub mod handlers;
pub mod hydrate;
pub mod normalize;
pub mod prompt;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::plan_routes()
}
