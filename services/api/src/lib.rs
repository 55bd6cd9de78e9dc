//! Media ingestion and retrieval service for the gallery
//!
//! Accepts authenticated uploads, persists them through the configured
//! storage backend, catalogs them and keeps per-user bookmarks.

pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod settings;
pub mod state;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use media::StorageConfig;
use serde_json::json;
use tower_http::{
    cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

pub use settings::Settings;
pub use state::AppState;

/// Assemble the full HTTP application
///
/// Local uploads are served from their public path only when the local
/// backend is active; remote references are absolute URLs.
pub fn app(state: AppState, settings: &Settings, storage_config: &StorageConfig) -> Router {
    let mut router = routes::create_router(state.clone())
        .merge(auth::routes::create_router(state.auth_state()));

    if let StorageConfig::Local(local) = storage_config {
        router = router.nest_service(&local.public_path, ServeDir::new(&local.upload_dir));
    }

    router
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout()))
        .layer(middleware::map_response(timeout_as_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// The timeout layer answers with an empty 408; give it the usual error body
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
            .into_response();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};

    #[tokio::test]
    async fn timeouts_carry_a_json_error() {
        let bare = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = timeout_as_json(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Request timed out");
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let response = timeout_as_json(Response::new(Body::from("ok"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }
}
