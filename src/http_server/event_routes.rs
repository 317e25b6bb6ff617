//! Event HTTP Routes

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::Value;

use crate::rest_api::{
    require_id, CreatedResponse, DeleteResponse, Record, RestError, RestResult,
    StatusResponse,
};
use crate::social::events;

use super::guard::{authenticate, request_form};
use super::state::AppState;

// ==================
// Event Routes
// ==================

/// Create event routes
pub fn event_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/new", post(create_event_handler).put(update_event_handler))
        .route("/delete", delete(delete_event_handler))
        .route(
            "/currentUserEventsByNetwork/:network_id",
            get(user_events_for_network_handler),
        )
        .route("/:id", get(get_event_handler))
        .route("/:id/reg", get(registrations_handler))
        .route("/:id/reg_count", get(registration_count_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn ping_handler() -> &'static str {
    "pong"
}

async fn get_event_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(events::get_event(&state.store, id).await?))
}

async fn registrations_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let id = require_id(&id)?;
    Ok(Json(events::event_registrations(&state.store, id, &params).await?))
}

async fn registration_count_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> RestResult<Json<Record>> {
    let id = require_id(&id)?;
    Ok(Json(events::registration_count(&state.store, id).await?))
}

async fn create_event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<(StatusCode, Json<CreatedResponse>)> {
    let host_id = authenticate(&state, &headers).await?;
    let form = request_form(body)?;
    let id = events::create_event(&state.store, host_id, form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse::new(id))))
}

async fn update_event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Json<StatusResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let form = request_form(body)?;
    events::update_event(&state.store, user_id, form).await?;
    Ok(Json(StatusResponse::ok()))
}

async fn user_events_for_network_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<Vec<Record>>> {
    let user_id = authenticate(&state, &headers).await?;
    let network_id = require_id(&network_id)?;
    Ok(Json(
        events::user_events_for_network(&state.store, user_id, network_id, &params).await?,
    ))
}

async fn delete_event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> RestResult<Json<DeleteResponse>> {
    let user_id = authenticate(&state, &headers).await?;
    let id = params
        .get("id")
        .ok_or_else(|| RestError::MissingParam("id".to_string()))?;
    let id = require_id(id)?;

    events::delete_event(&state.store, user_id, id).await?;
    Ok(Json(DeleteResponse::success(id)))
}
