use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::dto::ErrorResponse;

/// Failures reported by a credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential not found")]
    NotFound,
    #[error("credential with this email already exists")]
    Conflict,
    #[error("credential store unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
}

/// Failures reported by a token issuer.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("token issuer timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Outcome classes surfaced to callers of the auth service.
///
/// Internal failures carry no detail; the cause is logged where it happens.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user with email already exists")]
    AlreadyExists,
    #[error("internal server error")]
    Internal,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::AlreadyExists => StatusCode::BAD_REQUEST,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
