//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assignments", post(handlers::create_assignment))
        .route("/api/assignments/search", get(handlers::search_assignments))
        .route("/api/pool", get(handlers::pool_stats))
        .route("/api/health", get(handlers::health_check))
}
