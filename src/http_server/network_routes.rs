//! Network HTTP Routes
//!
//! Every endpoint here requires an API key.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::rest_api::{require_id, CreatedResponse, Record, RestResult};
use crate::social::networks;

use super::guard::{api_key_layer, request_form};
use super::state::AppState;

// ==================
// Network Routes
// ==================

/// Create network routes
pub fn network_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/networks", get(find_networks_handler))
        .route("/new", post(create_network_handler))
        .route("/:id", get(get_network_handler))
        .route("/:id/posts", get(network_posts_handler))
        .route("/:id/events", get(network_events_handler))
        .route("/:id/users", get(network_users_handler))
        .route("/:id/post_count", get(post_count_handler))
        .route("/:id/user_count", get(user_count_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_layer))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn ping_handler() -> &'static str {
    "pong"
}

async fn find_networks_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    Ok(Json(networks::find_networks(&state.store, &params).await?))
}

async fn create_network_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<(StatusCode, Json<CreatedResponse>)> {
    let form = request_form(body)?;
    let id = networks::create_network(&state.store, &form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

async fn get_network_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(networks::get_network(&state.store, id).await?))
}

async fn network_posts_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(networks::network_posts(&state.store, id, &params).await?))
}

async fn network_events_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(networks::network_events(&state.store, id, &params).await?))
}

async fn network_users_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(networks::network_users(&state.store, id, &params).await?))
}

async fn post_count_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(networks::post_count(&state.store, id).await?))
}

async fn user_count_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(networks::user_count(&state.store, id).await?))
}
