//! Request guards: API keys, basic auth and outcome counting

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::Value;

use crate::auth::{AuthError, BasicCredentials, API_KEY_HEADER, API_KEY_PARAM};
use crate::rest_api::{RequestForm, RestError, RestResult};
use crate::social::users;

use super::state::AppState;

/// Check the API key from the `key` query parameter or the `apikey` header
pub fn require_api_key(
    state: &AppState,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> RestResult<()> {
    let presented = params
        .get(API_KEY_PARAM)
        .map(String::as_str)
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()));

    state.api_keys.verify(presented).map_err(RestError::from)
}

/// Middleware rejecting requests without a valid API key
pub async fn api_key_layer(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, RestError> {
    require_api_key(&state, &headers, &params)?;
    Ok(next.run(request).await)
}

/// Body of a mutating request. Unparseable JSON or a wrong content type is
/// reported as `InvalidBody` in the usual error envelope.
pub fn request_form(body: Result<Json<Value>, JsonRejection>) -> RestResult<RequestForm> {
    let Json(body) = body.map_err(|rejection| RestError::InvalidBody(rejection.body_text()))?;
    RequestForm::from_body(body)
}

/// Resolve the `Authorization: Basic` header to the caller's user id
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> RestResult<i64> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthenticationRequired)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let credentials = BasicCredentials::parse(header)?;
    users::authenticate(&state.store, &credentials).await
}

/// Middleware counting rejected (4xx) and failed (5xx) responses
pub async fn record_outcome(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        state.metrics.increment_requests_failed();
    } else if status.is_client_error() {
        state.metrics.increment_requests_rejected();
    }

    response
}
