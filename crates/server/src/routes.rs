use std::{path::Path, sync::Arc};

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::issues::IssueRepository;

use crate::openapi;

pub mod issues;

/// Shared handler state; the repository is injected, never a global.
#[derive(Clone)]
pub struct AppState {
    pub issues: Arc<dyn IssueRepository>,
}

impl AppState {
    pub fn new(issues: Arc<dyn IssueRepository>) -> Self {
        Self { issues }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the application router: health, issue CRUD, OpenAPI document and
/// an optional static frontend served as fallback.
pub fn build_router(state: AppState, cors: CorsLayer, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/issues", get(issues::list_issues).post(issues::create_issue))
        .route(
            "/issues/:id",
            get(issues::get_issue).put(issues::update_issue).delete(issues::delete_issue),
        )
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    let app = match static_dir {
        Some(dir) => {
            let static_files = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            api.fallback_service(static_files)
        }
        None => api,
    };

    app.with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
