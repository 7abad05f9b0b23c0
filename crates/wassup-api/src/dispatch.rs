//! Envelope validation and command dispatch.
//!
//! [`Dispatcher::dispatch`] is the single entry point for `POST /post`. Any
//! failure inside it becomes an error envelope echoing whatever message id
//! and command had been parsed by then.

use std::{str::FromStr, sync::Arc};

use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};
use wassup_core::{
  UserId,
  protocol::{Command, Response},
  store::SupStore,
};

use crate::{
  error::{DispatchError, Result},
  handlers::{self, Context},
};

/// Message id reported when the request carried none.
pub const MISSING_MESSAGE_ID: &str = "missing message ID";

/// Command reported when the request carried none.
pub const MISSING_COMMAND: &str = "command missing";

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  Reply(Response),
  /// No identity in the session or the body; send the client to log in.
  LoginRequired,
}

/// The message id and command parsed so far.
#[derive(Debug)]
struct Echo {
  message_id: Value,
  command:    String,
}

impl Default for Echo {
  fn default() -> Self {
    Self {
      message_id: Value::String(String::new()),
      command:    String::new(),
    }
  }
}

/// Routes request envelopes to command handlers over a shared store.
///
/// Every handler's load-modify-save cycle runs under one process-wide lock,
/// so two requests in this process never interleave their writes.
pub struct Dispatcher<S> {
  store: Arc<S>,
  lock:  Mutex<()>,
}

impl<S: SupStore> Dispatcher<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, lock: Mutex::new(()) }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Hold the store lock for a load-modify-save cycle performed outside the
  /// dispatcher (e.g. session registration).
  pub async fn exclusive(&self) -> MutexGuard<'_, ()> { self.lock.lock().await }

  /// Handle one raw request body.
  ///
  /// `session_user` is the identity supplied by the session layer; when it is
  /// absent the body's own `user_id` field is used instead.
  pub async fn dispatch(&self, body: &[u8], session_user: Option<UserId>) -> Outcome {
    let mut echo = Echo::default();
    match self.try_dispatch(body, session_user, &mut echo).await {
      Ok(outcome) => outcome,
      Err(err) => {
        if err.is_internal() {
          tracing::warn!(command = %echo.command, error = %err, "request failed");
        } else {
          tracing::debug!(command = %echo.command, error = %err, "rejected request");
        }
        Outcome::Reply(Response::error(
          echo.message_id,
          echo.command,
          err.envelope_message(),
        ))
      }
    }
  }

  async fn try_dispatch(
    &self,
    body: &[u8],
    session_user: Option<UserId>,
    echo: &mut Echo,
  ) -> Result<Outcome> {
    let envelope: Value = serde_json::from_slice(body)?;
    tracing::debug!(%envelope, "received envelope");
    let fields = envelope
      .as_object()
      .ok_or_else(|| DispatchError::Malformed("request is not a JSON object".into()))?;

    let Some(message_id) = fields.get("message_id") else {
      echo.message_id = Value::String(MISSING_MESSAGE_ID.into());
      if let Some(command) = fields.get("command") {
        echo.command = text(command);
      }
      return Err(DispatchError::protocol("Missing message ID field in JSON object"));
    };
    echo.message_id = message_id.clone();

    let Some(command) = fields.get("command") else {
      echo.command = MISSING_COMMAND.into();
      return Err(DispatchError::protocol("Missing command field in JSON object"));
    };
    let command = command
      .as_str()
      .ok_or_else(|| DispatchError::Malformed("command is not a string".into()))?
      .to_lowercase();
    echo.command = command.clone();

    let Some(protocol_version) = fields.get("protocol_version") else {
      return Err(DispatchError::protocol("Missing protocol version in JSON object"));
    };
    let Some(command_data) = fields.get("command_data") else {
      return Err(DispatchError::protocol("Missing command_data field in JSON object"));
    };

    let Some(user_id) = resolve_user(session_user, fields)? else {
      return Ok(Outcome::LoginRequired);
    };

    let command = Command::from_str(&command)
      .map_err(|_| DispatchError::protocol(format!("Unknown command: {command}")))?;

    let ctx = Context {
      protocol_version: protocol_version.clone(),
      user_id,
      message_id: message_id.clone(),
      command,
    };

    let reply_data = {
      let _guard = self.lock.lock().await;
      handlers::run(self.store.as_ref(), &ctx, command_data).await?
    };

    Ok(Outcome::Reply(Response::reply(ctx.message_id, command.as_str(), reply_data)))
  }
}

/// Session identity wins; the body's `user_id` serves non-interactive clients.
fn resolve_user(
  session_user: Option<UserId>,
  fields: &Map<String, Value>,
) -> Result<Option<UserId>> {
  if session_user.is_some() {
    return Ok(session_user);
  }
  match fields.get("user_id") {
    Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
    None => Ok(None),
  }
}

fn text(v: &Value) -> String {
  match v {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
