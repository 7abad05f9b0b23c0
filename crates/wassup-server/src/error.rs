//! Error types and axum `IntoResponse` implementation for the session routes.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Store(e) => {
        tracing::warn!(error = %e, "login failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          format!("Error logging in. Please try again. (Error: {e})"),
        )
          .into_response()
      }
    }
  }
}
