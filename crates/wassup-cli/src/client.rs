//! Async HTTP client for the Wassup command endpoint.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, redirect::Policy};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;
use wassup_core::{
  UserId,
  protocol::{
    AddFriendIfExistsReply, Command, CreateUserData, FriendEntry, PROTOCOL_VERSION,
    RemoveSupData, Request, Response, SendSupData, SupEntry, UserExistsReply, UserIdData,
  },
};

/// Connection settings for the Wassup server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url: String,
  /// Acting user, sent in the envelope's `user_id` field.
  pub user_id:  UserId,
}

/// Async HTTP client for `POST /post`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WassupClient {
  client: Client,
  config: ClientConfig,
}

impl WassupClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      // A redirect means the server wants an interactive login.
      .redirect(Policy::none())
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String { format!("{}/post", self.config.base_url.trim_end_matches('/')) }

  /// Send one envelope and return its `reply_data`.
  pub async fn call(&self, command: Command, command_data: Value) -> Result<Value> {
    let request = Request {
      protocol_version: PROTOCOL_VERSION.to_owned(),
      message_id:       json!(Uuid::new_v4().to_string()),
      command:          command.as_str().to_owned(),
      command_data,
      user_id:          Some(self.config.user_id.clone()),
    };
    tracing::debug!(%command, message_id = %request.message_id, "sending");

    let resp = self
      .client
      .post(self.url())
      .json(&request)
      .send()
      .await
      .with_context(|| format!("POST /post ({command}) failed"))?;

    if resp.status().is_redirection() {
      bail!("server asked for a login; pass --user");
    }
    if !resp.status().is_success() {
      return Err(anyhow!("POST /post ({command}) → {}", resp.status()));
    }

    let envelope: Response = resp.json().await.context("deserialising response envelope")?;
    if envelope.message_id != request.message_id {
      bail!(
        "reply message id {} does not match request {}",
        envelope.message_id,
        request.message_id
      );
    }
    if envelope.is_error() {
      bail!("{command}: {}", envelope.error);
    }
    Ok(envelope.reply_data)
  }

  async fn call_as<T: DeserializeOwned>(&self, command: Command, data: Value) -> Result<T> {
    let reply = self.call(command, data).await?;
    serde_json::from_value(reply).with_context(|| format!("deserialising {command} reply"))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn create_user(&self, user_id: UserId, full_name: String) -> Result<String> {
    let data = serde_json::to_value(CreateUserData { user_id, full_name })?;
    self.call_as(Command::CreateUser, data).await
  }

  pub async fn user_exists(&self, user_id: UserId) -> Result<UserExistsReply> {
    let data = serde_json::to_value(UserIdData { user_id })?;
    self.call_as(Command::UserExists, data).await
  }

  // ── Friends ───────────────────────────────────────────────────────────────

  pub async fn add_friend(&self, user_id: UserId) -> Result<String> {
    let data = serde_json::to_value(UserIdData { user_id })?;
    self.call_as(Command::AddFriend, data).await
  }

  pub async fn add_friend_if_exists(&self, user_id: UserId) -> Result<AddFriendIfExistsReply> {
    let data = serde_json::to_value(UserIdData { user_id })?;
    self.call_as(Command::AddFriendIfExists, data).await
  }

  pub async fn remove_friend(&self, user_id: UserId) -> Result<String> {
    let data = serde_json::to_value(UserIdData { user_id })?;
    self.call_as(Command::RemoveFriend, data).await
  }

  pub async fn get_friends(&self) -> Result<Vec<FriendEntry>> {
    self.call_as(Command::GetFriends, Value::Null).await
  }

  // ── Sups ──────────────────────────────────────────────────────────────────

  pub async fn send_sup(&self, to: UserId, sup_id: Value, date: Value) -> Result<String> {
    let data = serde_json::to_value(SendSupData { user_id: to, sup_id, date })?;
    self.call_as(Command::SendSup, data).await
  }

  pub async fn remove_sup(&self, sup_id: Value) -> Result<String> {
    let data = serde_json::to_value(RemoveSupData { sup_id })?;
    self.call_as(Command::RemoveSup, data).await
  }

  pub async fn clear_sups(&self) -> Result<String> {
    self.call_as(Command::ClearSups, Value::Null).await
  }

  pub async fn get_sups(&self) -> Result<Vec<SupEntry>> {
    self.call_as(Command::GetSups, Value::Null).await
  }
}
