//! Dispatch error type and its mapping onto the error envelope text.

use thiserror::Error;

/// Prefix carried by every internal failure message.
pub const INTERNAL_ERROR_PREFIX: &str = "Error caught processing input: ";

/// Why a request produced an error envelope instead of a reply.
#[derive(Debug, Error)]
pub enum DispatchError {
  /// Malformed or incomplete envelope, unknown command, or missing payload
  /// field. The message is sent to the client as-is.
  #[error("{0}")]
  Protocol(String),

  /// The body was not a JSON object, or a field had the wrong type.
  #[error("{0}")]
  Malformed(String),

  #[error("{0}")]
  Json(#[from] serde_json::Error),

  #[error("{0}")]
  Core(#[from] wassup_core::Error),

  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
  pub fn protocol(message: impl Into<String>) -> Self { Self::Protocol(message.into()) }

  pub fn is_internal(&self) -> bool { !matches!(self, Self::Protocol(_)) }

  /// Text for the envelope's `error` field.
  pub fn envelope_message(&self) -> String {
    if self.is_internal() {
      format!("{INTERNAL_ERROR_PREFIX}{self}")
    } else {
      self.to_string()
    }
  }
}

pub type Result<T, E = DispatchError> = std::result::Result<T, E>;
