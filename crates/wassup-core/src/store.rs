//! The `SupStore` trait and an in-memory implementation.
//!
//! The trait is implemented by storage backends (e.g. `wassup-store-file`).
//! The dispatcher in `wassup-api` depends on this abstraction, not on any
//! concrete backend.

use std::{
  future::Future,
  sync::{Mutex, MutexGuard, PoisonError},
};

use crate::database::Database;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Whole-database persistence.
///
/// There are no partial updates: a request loads the full [`Database`],
/// mutates it in memory, and saves it back. Implementations do not serialise
/// concurrent load/save cycles themselves; callers that need that hold their
/// own lock around the cycle.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SupStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the full database. A store that has never been written yields an
  /// empty database and writes nothing.
  fn load(&self) -> impl Future<Output = Result<Database, Self::Error>> + Send + '_;

  /// Replace the persisted database with `db`.
  fn save<'a>(
    &'a self,
    db: &'a Database,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A store that keeps the database in process memory. Used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  db:    Mutex<Option<Database>>,
  saves: Mutex<usize>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store that already holds `db`, as if it had been saved once.
  pub fn with_database(db: Database) -> Self {
    Self {
      db:    Mutex::new(Some(db)),
      saves: Mutex::new(0),
    }
  }

  /// Number of `save` calls so far.
  pub fn save_count(&self) -> usize { *lock(&self.saves) }

  /// The last saved database, if any.
  pub fn snapshot(&self) -> Option<Database> { lock(&self.db).clone() }
}

// No guard outlives a single statement, so a poisoned lock still holds
// consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SupStore for MemoryStore {
  type Error = std::convert::Infallible;

  async fn load(&self) -> Result<Database, Self::Error> {
    Ok(lock(&self.db).clone().unwrap_or_default())
  }

  async fn save(&self, db: &Database) -> Result<(), Self::Error> {
    *lock(&self.db) = Some(db.clone());
    *lock(&self.saves) += 1;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn fresh_store_loads_empty_without_saving() {
    let store = MemoryStore::new();
    let db = store.load().await.unwrap();
    assert!(db.is_empty());
    assert_eq!(store.save_count(), 0);
    assert!(store.snapshot().is_none());
  }

  #[tokio::test]
  async fn load_returns_last_save() {
    let store = MemoryStore::new();
    let mut db = store.load().await.unwrap();
    db.create_user("alice".into(), "Alice");
    store.save(&db).await.unwrap();

    let reloaded = store.load().await.unwrap();
    assert_eq!(reloaded, db);
    assert_eq!(store.save_count(), 1);
  }

  #[test]
  fn accessors_need_no_runtime() {
    let mut db = Database::new();
    db.create_user("alice".into(), "Alice");
    let store = MemoryStore::with_database(db.clone());
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.snapshot(), Some(db));
  }
}
