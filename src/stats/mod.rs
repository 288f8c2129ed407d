mod dto;
pub mod handlers;
mod month;
mod repo;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::stats_routes())
}
