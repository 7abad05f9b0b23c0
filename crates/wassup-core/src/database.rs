//! The root aggregate: every user, keyed by id.
//!
//! A [`Database`] is loaded whole, mutated in memory, and written back whole.
//! It carries no I/O of its own; see [`crate::store::SupStore`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  user::{User, UserId},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
  users: BTreeMap<UserId, User>,
}

impl Database {
  pub fn new() -> Self { Self::default() }

  /// Insert a user unless the id is already taken. The first registration
  /// wins; later calls never overwrite the name. Returns whether a user was
  /// created.
  pub fn create_user(&mut self, id: UserId, full_name: impl Into<String>) -> bool {
    if self.users.contains_key(&id) {
      return false;
    }
    let user = User::new(id.clone(), full_name);
    self.users.insert(id, user);
    true
  }

  pub fn user_exists(&self, id: &str) -> bool { self.users.contains_key(id) }

  pub fn user(&self, id: &str) -> Result<&User> {
    self.users.get(id).ok_or_else(|| Error::UserNotFound(id.into()))
  }

  pub fn user_mut(&mut self, id: &str) -> Result<&mut User> {
    self
      .users
      .get_mut(id)
      .ok_or_else(|| Error::UserNotFound(id.into()))
  }

  /// The user's display name, or an empty string for an id nobody holds.
  ///
  /// Friend lists and sups may point at ids that were never registered; those
  /// render with a blank name rather than failing.
  pub fn full_name_or_empty(&self, id: &str) -> &str {
    self.users.get(id).map(User::full_name).unwrap_or_default()
  }

  pub fn len(&self) -> usize { self.users.len() }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }

  // ── Encoding ────────────────────────────────────────────────────────────

  /// Decode a database from its persisted form.
  pub fn from_slice(bytes: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(bytes)?) }

  /// Encode the whole database for persisting.
  pub fn to_vec(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec_pretty(self)?) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn create_user_first_write_wins() {
    let mut db = Database::new();
    assert!(db.create_user("alice".into(), "Alice"));
    assert!(!db.create_user("alice".into(), "Mallory"));
    assert_eq!(db.user("alice").unwrap().full_name(), "Alice");
    assert_eq!(db.len(), 1);
  }

  #[test]
  fn missing_user_is_an_error() {
    let db = Database::new();
    let err = db.user("ghost").unwrap_err();
    assert!(matches!(err, Error::UserNotFound(ref id) if id.as_str() == "ghost"));
    assert_eq!(err.to_string(), "user_id not in DB: ghost");
  }

  #[test]
  fn full_name_of_unknown_id_is_empty() {
    let mut db = Database::new();
    db.create_user("alice".into(), "Alice");
    assert_eq!(db.full_name_or_empty("alice"), "Alice");
    assert_eq!(db.full_name_or_empty("ghost"), "");
  }

  #[test]
  fn encoding_preserves_friends_and_sups_in_order() {
    let mut db = Database::new();
    db.create_user("alice".into(), "Alice");
    db.create_user("bob".into(), "Bob");
    {
      let alice = db.user_mut("alice").unwrap();
      alice.add_friend("bob".into());
      alice.add_friend("ghost".into());
      alice.add_sup("bob".into(), json!(1), json!("Mon"));
      alice.add_sup("bob".into(), json!("two"), json!(1424000000));
    }

    let bytes = db.to_vec().unwrap();
    let decoded = Database::from_slice(&bytes).unwrap();
    assert_eq!(decoded, db);

    let alice = decoded.user("alice").unwrap();
    let friends: Vec<_> = alice.friends().iter().map(UserId::as_str).collect();
    assert_eq!(friends, ["bob", "ghost"]);
    assert_eq!(alice.sups()[1].sup_id, json!("two"));
  }

  #[test]
  fn corrupt_bytes_fail_to_decode() {
    assert!(matches!(
      Database::from_slice(b"not a database"),
      Err(Error::Serialization(_))
    ));
  }
}
