//! The JSON envelope exchanged on `POST /post`.
//!
//! A request names a [`Command`] and carries command-specific
//! `command_data`; every response, success or failure, has the same five
//! fields. Payload and reply shapes for each command live here so the server
//! and clients agree on them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::user::UserId;

/// Version the server stamps on every response, whatever the client sent.
pub const PROTOCOL_VERSION: &str = "1.3";

// ─── Envelope ────────────────────────────────────────────────────────────────

/// A request envelope as produced by a well-behaved client.
///
/// The server does not deserialise straight into this type: it checks fields
/// one by one so that the first missing field decides the error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
  pub protocol_version: String,
  pub message_id:       Value,
  pub command:          String,
  pub command_data:     Value,
  /// Acting user, honoured only when the session carries no identity.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id:          Option<UserId>,
}

/// The fixed response envelope.
///
/// `error` is empty on success; `reply_data` is an empty string on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  pub protocol_version: String,
  pub message_id:       Value,
  pub command:          String,
  pub error:            String,
  pub reply_data:       Value,
}

impl Response {
  pub fn reply(message_id: Value, command: impl Into<String>, reply_data: Value) -> Self {
    Self {
      protocol_version: PROTOCOL_VERSION.to_owned(),
      message_id,
      command: command.into(),
      error: String::new(),
      reply_data,
    }
  }

  pub fn error(
    message_id: Value,
    command: impl Into<String>,
    error: impl Into<String>,
  ) -> Self {
    Self {
      protocol_version: PROTOCOL_VERSION.to_owned(),
      message_id,
      command: command.into(),
      error: error.into(),
      reply_data: Value::String(String::new()),
    }
  }

  pub fn is_error(&self) -> bool { !self.error.is_empty() }
}

// ─── Commands ────────────────────────────────────────────────────────────────

/// The ten commands the dispatcher understands. Names on the wire are the
/// snake_case forms, matched case-insensitively.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Command {
  CreateUser,
  UserExists,
  AddFriend,
  AddFriendIfExists,
  RemoveFriend,
  GetFriends,
  SendSup,
  RemoveSup,
  ClearSups,
  GetSups,
}

impl Command {
  pub fn as_str(self) -> &'static str { self.into() }
}

impl std::fmt::Display for Command {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Command data ────────────────────────────────────────────────────────────

/// `create_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserData {
  pub user_id:   UserId,
  pub full_name: String,
}

/// `user_exists`, `add_friend`, `add_friend_if_exists`, `remove_friend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdData {
  pub user_id: UserId,
}

/// `send_sup`; `user_id` is the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendSupData {
  pub user_id: UserId,
  pub sup_id:  Value,
  pub date:    Value,
}

/// `remove_sup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSupData {
  pub sup_id: Value,
}

// ─── Replies ─────────────────────────────────────────────────────────────────

/// Reply to `user_exists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserExistsReply {
  pub user_id:   UserId,
  pub exists:    bool,
  /// Empty when the user does not exist.
  pub full_name: String,
}

/// Reply to `add_friend_if_exists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddFriendIfExistsReply {
  pub user_id:      UserId,
  pub exists:       bool,
  pub full_name:    String,
  pub friend_added: bool,
}

/// One element of the `get_friends` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendEntry {
  pub user_id:   UserId,
  pub full_name: String,
}

/// One element of the `get_sups` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupEntry {
  pub sender_id:        UserId,
  pub sup_id:           Value,
  pub sender_full_name: String,
  pub date:             Value,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use serde_json::json;
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn command_names_round_trip() {
    for command in Command::iter() {
      assert_eq!(Command::from_str(command.as_str()).unwrap(), command);
    }
    assert_eq!(Command::AddFriendIfExists.as_str(), "add_friend_if_exists");
    assert_eq!(Command::GetSups.to_string(), "get_sups");
  }

  #[test]
  fn command_names_are_case_insensitive() {
    assert_eq!(Command::from_str("SEND_SUP").unwrap(), Command::SendSup);
    assert_eq!(Command::from_str("Clear_Sups").unwrap(), Command::ClearSups);
    assert!(Command::from_str("poke").is_err());
  }

  #[test]
  fn error_response_has_empty_reply_data() {
    let resp = Response::error(json!("m1"), "foo", "boom");
    let v = serde_json::to_value(&resp).unwrap();
    assert_eq!(
      v,
      json!({
        "protocol_version": "1.3",
        "message_id": "m1",
        "command": "foo",
        "error": "boom",
        "reply_data": "",
      })
    );
    assert!(resp.is_error());
  }

  #[test]
  fn request_omits_absent_user_id() {
    let req = Request {
      protocol_version: PROTOCOL_VERSION.into(),
      message_id:       json!(7),
      command:          "get_sups".into(),
      command_data:     Value::Null,
      user_id:          None,
    };
    let v = serde_json::to_value(&req).unwrap();
    assert!(v.get("user_id").is_none());
    assert_eq!(v["command_data"], Value::Null);
  }
}
