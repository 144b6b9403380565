pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::story::handlers;

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    // Illustrations are written under data_dir/illustrations and served as /data/illustrations/*.
    let data_files = ServeDir::new(&state.config.data_dir);

    Router::new()
        .route("/healthz", get(health::health_handler))
        .route("/generate", post(handlers::handle_generate))
        .nest_service("/static", static_files)
        .nest_service("/data", data_files)
        .with_state(state)
}
