// Router assembly

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/video-info", post(handlers::video_info))
        .route("/video-metadata", post(handlers::video_metadata))
        .route("/download", post(handlers::download))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
}
