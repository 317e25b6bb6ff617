//! Post HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::rest_api::{require_id, CreatedResponse, Record, RestResult};
use crate::social::posts;

use super::guard::{authenticate, request_form};
use super::state::AppState;

/// Create post routes
pub fn post_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/new", post(create_post_handler))
        .route("/:id", get(get_post_handler))
        .with_state(state)
}

async fn ping_handler() -> &'static str {
    "pong"
}

async fn get_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(posts::get_post(&state.store, id).await?))
}

async fn create_post_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<(StatusCode, Json<CreatedResponse>)> {
    let user_id = authenticate(&state, &headers).await?;
    let form = request_form(body)?;
    let id = posts::create_post(&state.store, user_id, form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}
