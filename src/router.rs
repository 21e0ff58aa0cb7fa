//! HTTP ルーター

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを作る
pub fn create(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::banner))
        .route("/api/health", get(handlers::health))
        .route("/metadata", post(handlers::write_item))
        .route("/api/metadata/{id}", post(handlers::write_raw))
        .route("/metadata/{file}", get(handlers::metadata_file))
        .route("/images/{file}", get(handlers::image_file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
