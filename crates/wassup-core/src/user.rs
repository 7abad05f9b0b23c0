//! User records and the sups they receive.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a registered user, chosen by the user at login.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for UserId {
  fn borrow(&self) -> &str { &self.0 }
}

impl From<String> for UserId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for UserId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// A notification sitting in its recipient's inbox.
///
/// `sup_id` and `date` are chosen by the sending client and never interpreted
/// by the server, so they are kept as raw JSON values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sup {
  pub sender_id: UserId,
  pub sup_id:    Value,
  pub date:      Value,
}

/// A registered user.
///
/// The display name is fixed at creation. Friends and sups keep insertion
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  user_id:      UserId,
  full_name:    String,
  friends_list: Vec<UserId>,
  sups:         Vec<Sup>,
}

impl User {
  pub fn new(user_id: UserId, full_name: impl Into<String>) -> Self {
    Self {
      user_id,
      full_name: full_name.into(),
      friends_list: Vec::new(),
      sups: Vec::new(),
    }
  }

  pub fn user_id(&self) -> &UserId { &self.user_id }

  pub fn full_name(&self) -> &str { &self.full_name }

  pub fn friends(&self) -> &[UserId] { &self.friends_list }

  pub fn sups(&self) -> &[Sup] { &self.sups }

  /// Append `friend` unless it is already listed. Returns whether the list
  /// changed.
  pub fn add_friend(&mut self, friend: UserId) -> bool {
    if self.friends_list.contains(&friend) {
      return false;
    }
    self.friends_list.push(friend);
    true
  }

  /// Remove `friend` if listed; a missing entry is not an error.
  pub fn remove_friend(&mut self, friend: &str) -> bool {
    let before = self.friends_list.len();
    self.friends_list.retain(|f| f.as_str() != friend);
    self.friends_list.len() != before
  }

  /// Append a sup. No deduplication and no check that the sender exists.
  pub fn add_sup(&mut self, sender_id: UserId, sup_id: Value, date: Value) {
    self.sups.push(Sup { sender_id, sup_id, date });
  }

  /// Drop every sup whose id equals `sup_id`. Returns how many were removed.
  pub fn remove_sup(&mut self, sup_id: &Value) -> usize {
    let before = self.sups.len();
    self.sups.retain(|s| &s.sup_id != sup_id);
    before - self.sups.len()
  }

  pub fn clear_sups(&mut self) { self.sups.clear(); }
}
