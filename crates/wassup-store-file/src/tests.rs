//! Tests for `FileStore` against files in a temporary directory.

use serde_json::json;
use tempfile::TempDir;
use wassup_core::{Database, UserId, store::SupStore};

use crate::{Error, FileStore};

fn store() -> (TempDir, FileStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = FileStore::new(dir.path().join("db.json"));
  (dir, store)
}

fn sample_db() -> Database {
  let mut db = Database::new();
  db.create_user("alice".into(), "Alice Liddell");
  db.create_user("bob".into(), "Bob");

  let alice = db.user_mut("alice").unwrap();
  alice.add_friend("bob".into());
  alice.add_friend("ghost".into());
  alice.add_sup("bob".into(), json!(5), json!("Sun Feb 01 2015"));
  alice.add_sup("bob".into(), json!(5), json!("Mon Feb 02 2015"));
  alice.add_sup("ghost".into(), json!("x"), json!(1422835200));
  db
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_loads_empty_and_is_not_created() {
  let (_dir, s) = store();
  let db = s.load().await.unwrap();
  assert!(db.is_empty());
  assert!(!s.path().exists());
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
  let (_dir, s) = store();
  std::fs::write(s.path(), b"\x80\x03}q\x00").unwrap();

  let err = s.load().await.unwrap_err();
  assert!(matches!(err, Error::Corrupt { .. }));
  assert!(err.to_string().starts_with("corrupt database in "));
}

#[tokio::test]
async fn unreadable_path_is_a_read_error() {
  let dir = tempfile::tempdir().unwrap();
  // A directory cannot be read as a file.
  let s = FileStore::new(dir.path());
  assert!(matches!(s.load().await, Err(Error::Read { .. })));
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_load_reproduces_database() {
  let (_dir, s) = store();
  let db = sample_db();
  s.save(&db).await.unwrap();

  let loaded = s.load().await.unwrap();
  assert_eq!(loaded, db);

  let alice = loaded.user("alice").unwrap();
  let friends: Vec<_> = alice.friends().iter().map(UserId::as_str).collect();
  assert_eq!(friends, ["bob", "ghost"]);
  let dates: Vec<_> = alice.sups().iter().map(|s| s.date.clone()).collect();
  assert_eq!(
    dates,
    [json!("Sun Feb 01 2015"), json!("Mon Feb 02 2015"), json!(1422835200)]
  );
}

#[tokio::test]
async fn save_overwrites_previous_contents() {
  let (_dir, s) = store();
  s.save(&sample_db()).await.unwrap();

  let mut smaller = Database::new();
  smaller.create_user("carol".into(), "Carol");
  s.save(&smaller).await.unwrap();

  let loaded = s.load().await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert!(loaded.user_exists("carol"));
  assert!(!loaded.user_exists("alice"));
}

#[tokio::test]
async fn save_into_missing_directory_is_a_write_error() {
  let dir = tempfile::tempdir().unwrap();
  let s = FileStore::new(dir.path().join("nope").join("db.json"));
  assert!(matches!(
    s.save(&Database::new()).await,
    Err(Error::Write { .. })
  ));
}
