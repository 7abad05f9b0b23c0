//! Business logic for the ten protocol commands.
//!
//! | Command | Required `command_data` | Reply |
//! |---------|-------------------------|-------|
//! | `create_user` | `user_id`, `full_name` | `"Created user"` |
//! | `user_exists` | `user_id` | [`UserExistsReply`] |
//! | `add_friend_if_exists` | `user_id` | [`AddFriendIfExistsReply`] |
//! | `add_friend` | `user_id` | `"Added friend"` |
//! | `remove_friend` | `user_id` | `"Removed friend"` |
//! | `get_friends` | – | list of [`FriendEntry`] |
//! | `send_sup` | `user_id`, `sup_id`, `date` | `"Sent sup"` |
//! | `remove_sup` | `sup_id` | `"Removed sup"` |
//! | `clear_sups` | – | `"Cleared sups"` |
//! | `get_sups` | – | list of [`SupEntry`] |
//!
//! Every handler checks its payload first, then loads the store and applies
//! one domain operation. Mutating commands save the whole store back.

use serde::de::DeserializeOwned;
use serde_json::Value;
use wassup_core::{
  UserId,
  protocol::{
    AddFriendIfExistsReply, Command, CreateUserData, FriendEntry, RemoveSupData,
    SendSupData, SupEntry, UserExistsReply, UserIdData,
  },
  store::SupStore,
};

use crate::error::{DispatchError, Result};

/// Everything a handler learns about the request besides its payload.
#[derive(Debug, Clone)]
pub struct Context {
  pub protocol_version: Value,
  /// The authenticated caller.
  pub user_id:          UserId,
  pub message_id:       Value,
  pub command:          Command,
}

/// Run `ctx.command` against `store` and return its `reply_data`.
pub async fn run<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  match ctx.command {
    Command::CreateUser => create_user(store, ctx, data).await,
    Command::UserExists => user_exists(store, ctx, data).await,
    Command::AddFriendIfExists => add_friend_if_exists(store, ctx, data).await,
    Command::AddFriend => add_friend(store, ctx, data).await,
    Command::RemoveFriend => remove_friend(store, ctx, data).await,
    Command::GetFriends => get_friends(store, ctx).await,
    Command::SendSup => send_sup(store, ctx, data).await,
    Command::RemoveSup => remove_sup(store, ctx, data).await,
    Command::ClearSups => clear_sups(store, ctx).await,
    Command::GetSups => get_sups(store, ctx).await,
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Decode `data` into `T` once every field in `fields` is present.
///
/// A missing field is a protocol error carrying `missing`; a present field of
/// the wrong type is an internal error.
fn require<T: DeserializeOwned>(data: &Value, fields: &[&str], missing: &str) -> Result<T> {
  let present = data
    .as_object()
    .is_some_and(|obj| fields.iter().all(|f| obj.contains_key(*f)));
  if !present {
    return Err(DispatchError::protocol(missing));
  }
  Ok(serde_json::from_value(data.clone())?)
}

fn missing_user_id(command: Command) -> String {
  format!("Missing user_id in {command} request")
}

async fn load<S: SupStore>(store: &S) -> Result<wassup_core::Database> {
  store.load().await.map_err(|e| DispatchError::Store(Box::new(e)))
}

async fn save<S: SupStore>(store: &S, db: &wassup_core::Database) -> Result<()> {
  store.save(db).await.map_err(|e| DispatchError::Store(Box::new(e)))
}

fn confirmation(text: &str) -> Value { Value::String(text.to_owned()) }

// ─── Users ───────────────────────────────────────────────────────────────────

async fn create_user<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let CreateUserData { user_id, full_name } = require(
    data,
    &["user_id", "full_name"],
    &format!("Missing user_id and/or full_name in {} request", ctx.command),
  )?;

  let mut db = load(store).await?;
  if db.create_user(user_id.clone(), full_name) {
    tracing::info!(%user_id, "created user");
  }
  save(store, &db).await?;
  Ok(confirmation("Created user"))
}

async fn user_exists<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let UserIdData { user_id } = require(data, &["user_id"], &missing_user_id(ctx.command))?;

  let db = load(store).await?;
  let exists = db.user_exists(user_id.as_str());
  let full_name = db.full_name_or_empty(user_id.as_str()).to_owned();
  Ok(serde_json::to_value(UserExistsReply { user_id, exists, full_name })?)
}

// ─── Friends ─────────────────────────────────────────────────────────────────

async fn add_friend_if_exists<S: SupStore>(
  store: &S,
  ctx: &Context,
  data: &Value,
) -> Result<Value> {
  let UserIdData { user_id: friend_id } =
    require(data, &["user_id"], &missing_user_id(ctx.command))?;

  let mut db = load(store).await?;
  db.user(ctx.user_id.as_str())?;

  if !db.user_exists(friend_id.as_str()) {
    return Ok(serde_json::to_value(AddFriendIfExistsReply {
      user_id:      friend_id,
      exists:       false,
      full_name:    String::new(),
      friend_added: false,
    })?);
  }

  db.user_mut(ctx.user_id.as_str())?.add_friend(friend_id.clone());
  save(store, &db).await?;

  let full_name = db.user(friend_id.as_str())?.full_name().to_owned();
  Ok(serde_json::to_value(AddFriendIfExistsReply {
    user_id: friend_id,
    exists: true,
    full_name,
    friend_added: true,
  })?)
}

async fn add_friend<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let UserIdData { user_id: friend_id } =
    require(data, &["user_id"], &missing_user_id(ctx.command))?;

  let mut db = load(store).await?;
  db.user_mut(ctx.user_id.as_str())?.add_friend(friend_id);
  save(store, &db).await?;
  Ok(confirmation("Added friend"))
}

async fn remove_friend<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let UserIdData { user_id: friend_id } =
    require(data, &["user_id"], &missing_user_id(ctx.command))?;

  let mut db = load(store).await?;
  db.user_mut(ctx.user_id.as_str())?
    .remove_friend(friend_id.as_str());
  save(store, &db).await?;
  Ok(confirmation("Removed friend"))
}

async fn get_friends<S: SupStore>(store: &S, ctx: &Context) -> Result<Value> {
  let db = load(store).await?;
  let friends: Vec<FriendEntry> = db
    .user(ctx.user_id.as_str())?
    .friends()
    .iter()
    .map(|id| FriendEntry {
      user_id:   id.clone(),
      full_name: db.full_name_or_empty(id.as_str()).to_owned(),
    })
    .collect();
  Ok(serde_json::to_value(friends)?)
}

// ─── Sups ────────────────────────────────────────────────────────────────────

/// The recipient is looked up without an existence check, so sending to an
/// unknown id fails with an internal error rather than degrading.
async fn send_sup<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let SendSupData { user_id: recipient, sup_id, date } = require(
    data,
    &["user_id", "sup_id", "date"],
    &format!("Missing user_id, sup_id, and/or date in {} request", ctx.command),
  )?;

  let mut db = load(store).await?;
  db.user_mut(recipient.as_str())?
    .add_sup(ctx.user_id.clone(), sup_id, date);
  save(store, &db).await?;
  Ok(confirmation("Sent sup"))
}

async fn remove_sup<S: SupStore>(store: &S, ctx: &Context, data: &Value) -> Result<Value> {
  let RemoveSupData { sup_id } = require(
    data,
    &["sup_id"],
    &format!("Missing sup_id in {} request", ctx.command),
  )?;

  let mut db = load(store).await?;
  db.user_mut(ctx.user_id.as_str())?.remove_sup(&sup_id);
  save(store, &db).await?;
  Ok(confirmation("Removed sup"))
}

async fn clear_sups<S: SupStore>(store: &S, ctx: &Context) -> Result<Value> {
  let mut db = load(store).await?;
  db.user_mut(ctx.user_id.as_str())?.clear_sups();
  save(store, &db).await?;
  Ok(confirmation("Cleared sups"))
}

async fn get_sups<S: SupStore>(store: &S, ctx: &Context) -> Result<Value> {
  let db = load(store).await?;
  let sups: Vec<SupEntry> = db
    .user(ctx.user_id.as_str())?
    .sups()
    .iter()
    .map(|sup| SupEntry {
      sender_id:        sup.sender_id.clone(),
      sup_id:           sup.sup_id.clone(),
      sender_full_name: db.full_name_or_empty(sup.sender_id.as_str()).to_owned(),
      date:             sup.date.clone(),
    })
    .collect();
  Ok(serde_json::to_value(sups)?)
}
