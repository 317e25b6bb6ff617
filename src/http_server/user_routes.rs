//! User HTTP Routes
//!
//! Reads are public. Anything acting on behalf of a user requires basic auth
//! and always acts on the authenticated caller.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;

use crate::rest_api::{
    require_id, CreatedResponse, MessageResponse, Record, RestResult, StatusResponse,
};
use crate::social::events::ROLE_PARAM;
use crate::social::{users, EventRole};

use super::guard::{authenticate, request_form};
use super::state::AppState;

// ==================
// User Routes
// ==================

/// Create user routes
pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/users", get(find_users_handler).post(create_user_handler))
        .route("/update_user", put(update_user_handler))
        .route("/:id", get(get_user_handler))
        .route("/:id/networks", get(user_networks_handler))
        .route("/:id/posts", get(user_posts_handler))
        .route("/:id/events", get(user_events_handler))
        .route("/joinEvent/:event_id", post(join_event_handler))
        .route("/leaveEvent/:event_id", delete(leave_event_handler))
        .route("/joinNetwork/:network_id", post(join_network_handler))
        .route("/leaveNetwork/:network_id", delete(leave_network_handler))
        .with_state(state)
}

// ==================
// Read Handlers
// ==================

async fn ping_handler() -> &'static str {
    "pong"
}

async fn find_users_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    Ok(Json(users::find_users(&state.store, &params).await?))
}

async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(users::get_user(&state.store, id).await?))
}

async fn user_networks_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(users::user_networks(&state.store, id, &params).await?))
}

async fn user_posts_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(users::user_posts(&state.store, id, &params).await?))
}

async fn user_events_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    let role = EventRole::parse(params.get(ROLE_PARAM).map(String::as_str))?;
    Ok(Json(users::user_events(&state.store, id, role, &params).await?))
}

// ==================
// Account Handlers
// ==================

async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<(StatusCode, Json<CreatedResponse>)> {
    let form = request_form(body)?;
    let id = users::create_user(&state.store, form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Json<StatusResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let form = request_form(body)?;
    users::update_user(&state.store, user_id, form).await?;
    Ok(Json(StatusResponse::ok()))
}

// ==================
// Registration Handlers
// ==================

async fn join_event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<StatusResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let event_id = require_id(&event_id)?;
    let role = EventRole::parse(params.get(ROLE_PARAM).map(String::as_str))?;
    users::join_event(&state.store, user_id, event_id, role).await?;
    Ok(Json(StatusResponse::ok()))
}

async fn leave_event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> RestResult<Json<StatusResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let event_id = require_id(&event_id)?;
    users::leave_event(&state.store, user_id, event_id).await?;
    Ok(Json(StatusResponse::ok()))
}

async fn join_network_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
) -> RestResult<Json<StatusResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let network_id = require_id(&network_id)?;
    users::join_network(&state.store, user_id, network_id).await?;
    Ok(Json(StatusResponse::ok()))
}

async fn leave_network_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
) -> RestResult<Json<MessageResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let network_id = require_id(&network_id)?;
    Ok(Json(users::leave_network(&state.store, user_id, network_id).await?))
}
