use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use muse_core::{Clip, Engine, MuseError, NewClip};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

/// Map engine errors to HTTP responses. Validation mirrors FastAPI's 422,
/// missing clips its 404 detail body.
struct ApiError(MuseError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            MuseError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "detail": "Clip not found" })),
            )
                .into_response(),
            MuseError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "detail": msg })),
            )
                .into_response(),
            err => {
                tracing::error!(%err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<MuseError> for ApiError {
    fn from(err: MuseError) -> Self {
        ApiError(err)
    }
}

/// Build the router over a sled database directory.
pub fn build_app(db_path: &str) -> Result<Router> {
    let engine = Engine::open(db_path)?;
    Ok(build_app_with(Arc::new(engine)))
}

pub fn build_app_with(engine: Arc<Engine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        .route("/clips", post(create_clip).get(list_clips))
        .route("/clips/:id", delete(delete_clip).put(update_clip))
        .route("/search", get(search_clips))
        .with_state(AppState { engine })
        .layer(cors)
}

async fn create_clip(
    State(state): State<AppState>,
    Json(payload): Json<NewClip>,
) -> Result<Json<Clip>, ApiError> {
    let clip = state.engine.create(payload)?;
    Ok(Json(clip))
}

async fn list_clips(State(state): State<AppState>) -> Result<Json<Vec<Clip>>, ApiError> {
    Ok(Json(state.engine.list()?))
}

async fn search_clips(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Clip>>, ApiError> {
    Ok(Json(state.engine.search(&params.q, params.limit)?))
}

async fn update_clip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<NewClip>,
) -> Result<Json<Clip>, ApiError> {
    Ok(Json(state.engine.update(id, payload)?))
}

async fn delete_clip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.engine.delete(id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
