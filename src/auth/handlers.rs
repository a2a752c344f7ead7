use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::dto::{CredentialsRequest, ErrorResponse, TokenResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Unwraps the JSON body and enforces the required fields.
fn credentials(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, Response> {
    let Json(body) = payload.map_err(|e| {
        warn!(error = %e, "invalid request body");
        bad_request("Invalid request body")
    })?;
    if !body.is_complete() {
        return Err(bad_request("Email and password are required"));
    }
    Ok(body)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, Response> {
    let body = credentials(payload)?;
    let token = state
        .auth
        .register(&body.email, &body.password)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, Response> {
    let body = credentials(payload)?;
    let token = state
        .auth
        .login(&body.email, &body.password)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(TokenResponse { token }))
}
